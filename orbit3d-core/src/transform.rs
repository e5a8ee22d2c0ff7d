/// 4x4 transformation matrices for projection, view and model transforms
///
/// Matrices are `nalgebra::Matrix4<f32>`, stored column-major. Composition
/// follows the usual convention: `multiply(a, b)` applies `b` first.
use nalgebra::{Matrix4, Point3, Vector3};

/// Column-major 4x4 transform.
pub type Mat4 = Matrix4<f32>;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// The multiplicative identity.
    pub fn identity() -> Mat4 {
        Matrix4::identity()
    }

    /// Symmetric perspective projection mapping view-space depth
    /// `[-near, -far]` to clip-space `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `fov_y` or `aspect` is not positive, or if `far == near`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        assert!(fov_y > 0.0, "perspective: fov_y must be positive, got {fov_y}");
        assert!(aspect > 0.0, "perspective: aspect must be positive, got {aspect}");
        assert!(far != near, "perspective: near and far planes coincide at {near}");

        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        #[rustfmt::skip]
        let m = Matrix4::new(
            f / aspect, 0.0, 0.0,               0.0,
            0.0,        f,   0.0,               0.0,
            0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,        0.0, -1.0,              0.0,
        );
        m
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// `up` must not be parallel to `eye - target`. Only an exactly
    /// degenerate basis is rejected; a nearly parallel `up` (camera pitched
    /// to the pole) yields whatever the normalisation produces.
    ///
    /// # Panics
    ///
    /// Panics if `eye == target` or `up` is exactly parallel to the view
    /// direction.
    pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Mat4 {
        let forward = unit(eye - target, "eye and target coincide");
        let right = unit(up.cross(&forward), "up is parallel to the view direction");
        let true_up = forward.cross(&right);
        let eye = eye.coords;

        #[rustfmt::skip]
        let m = Matrix4::new(
            right.x,   right.y,   right.z,   -right.dot(&eye),
            true_up.x, true_up.y, true_up.z, -true_up.dot(&eye),
            forward.x, forward.y, forward.z, -forward.dot(&eye),
            0.0,       0.0,       0.0,       1.0,
        );
        m
    }

    /// Rotation about the X axis.
    pub fn rotate_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();

        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   -s,  0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Rotation about the Y axis.
    pub fn rotate_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();

        #[rustfmt::skip]
        let m = Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
            -s,  0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Create a translation matrix
    pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 0.0, 0.0, x,
            0.0, 1.0, 0.0, y,
            0.0, 0.0, 1.0, z,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Compose two transforms: the result applies `b` first, then `a`.
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        a * b
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
        Self::multiply(projection, &Self::multiply(view, model))
    }

    /// The 16 components in column-major order, as uploaded to a graphics API.
    pub fn to_column_major(m: &Mat4) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(m.as_slice());
        out
    }
}

fn unit(v: Vector3<f32>, what: &str) -> Vector3<f32> {
    let len = v.norm();
    assert!(len > 0.0 && len.is_finite(), "look_at: {what}");
    v / len
}
