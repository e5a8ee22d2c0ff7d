/// Fixed list of meshes placed in the world.
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};

use crate::backend::{MeshHandle, RenderBackend};
use crate::config::SceneObject;
use crate::error::{BackendError, ViewerError};
use crate::geometry::{Geometry, Primitive};
use crate::transform::{Mat4, Transform};

/// Uploaded geometry at a fixed world position with a flat colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub handle: MeshHandle,
    pub position: Point3<f32>,
    pub color: Vector3<f32>,
    pub index_count: usize,
}

impl Mesh {
    pub fn model_matrix(&self) -> Mat4 {
        Transform::translate(self.position.x, self.position.y, self.position.z)
    }
}

/// Meshes in draw order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    /// Generate and upload every object's geometry.
    ///
    /// Any upload failure aborts setup; meshes uploaded before the failure
    /// are released again.
    pub fn build<B: RenderBackend>(backend: &mut B, objects: &[SceneObject]) -> Result<Self, ViewerError> {
        let mut scene = Self::default();
        for object in objects {
            match upload(backend, object) {
                Ok(mesh) => scene.meshes.push(mesh),
                Err(e) => {
                    scene.release(backend);
                    return Err(ViewerError::Setup {
                        resource: format!("{:?} mesh", object.primitive),
                        log: e.to_string(),
                    });
                }
            }
        }
        info!("scene ready with {} meshes", scene.meshes.len());
        Ok(scene)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Free every mesh's backend resources.
    pub fn release<B: RenderBackend>(&mut self, backend: &mut B) {
        for mesh in self.meshes.drain(..) {
            if let Err(e) = backend.release(mesh.handle) {
                warn!("releasing mesh {}: {e}", mesh.handle);
            }
        }
    }
}

fn upload<B: RenderBackend>(backend: &mut B, object: &SceneObject) -> Result<Mesh, BackendError> {
    let geometry = guarded_generate(object.primitive)?;
    let handle = backend.upload_geometry(&geometry)?;
    debug!(
        "uploaded {:?} as {handle}: {} vertices, {} triangles",
        object.primitive,
        geometry.vertex_count(),
        geometry.triangle_count()
    );
    Ok(Mesh {
        handle,
        position: Point3::from(object.position),
        color: Vector3::from(object.color),
        index_count: geometry.indices.len(),
    })
}

/// Config files can name a sphere with zero segments; report it as a setup
/// failure instead of tripping the generator's assertion.
fn guarded_generate(primitive: Primitive) -> Result<Geometry, BackendError> {
    if let Primitive::Sphere { segments, rings } = primitive {
        if segments == 0 || rings == 0 {
            return Err(BackendError::ResourceCreation {
                resource: "sphere geometry".to_owned(),
                log: format!("{segments} segments x {rings} rings"),
            });
        }
    }
    Ok(primitive.generate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    #[test]
    fn test_build_default_scene() {
        let mut backend = RecordingBackend::new();
        let scene = Scene::build(&mut backend, &SceneObject::default_scene()).unwrap();
        assert_eq!(scene.meshes().len(), 3);
        assert_eq!(scene.meshes()[0].index_count, 36);
        assert_eq!(scene.meshes()[1].index_count, 32 * 16 * 6);
        assert_eq!(scene.meshes()[2].position, Point3::new(2.5, 0.3, 0.0));
        assert_eq!(backend.live_meshes(), 3);
    }

    #[test]
    fn test_model_matrix_translates() {
        let mut backend = RecordingBackend::new();
        let scene = Scene::build(&mut backend, &SceneObject::default_scene()).unwrap();
        let p = scene.meshes()[0].model_matrix().transform_point(&Point3::origin());
        assert_eq!(p, Point3::new(-2.5, 0.5, 0.0));
    }

    #[test]
    fn test_failed_setup_releases_uploaded_meshes() {
        let mut backend = RecordingBackend::new();
        let mut objects = SceneObject::default_scene();
        objects[2].primitive = Primitive::Sphere { segments: 0, rings: 4 };
        let err = Scene::build(&mut backend, &objects).unwrap_err();
        match err {
            ViewerError::Setup { resource, log } => {
                assert!(resource.contains("Sphere"));
                assert!(log.contains("0 segments"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(backend.live_meshes(), 0);
    }

    #[test]
    fn test_release_empties_scene() {
        let mut backend = RecordingBackend::new();
        let mut scene = Scene::build(&mut backend, &SceneObject::default_scene()).unwrap();
        scene.release(&mut backend);
        assert!(scene.meshes().is_empty());
        assert_eq!(backend.live_meshes(), 0);
    }
}
