/// Procedural geometry primitives for 3D rendering
use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Violations of the [`Geometry`] invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("{normals} normals for {positions} positions")]
    NormalCountMismatch { positions: usize, normals: usize },
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        slot: usize,
        index: u16,
        vertex_count: usize,
    },
    #[error("{0} vertices cannot be addressed by 16-bit indices")]
    TooManyVertices(usize),
}

/// Indexed triangle geometry with per-vertex normals.
///
/// Normals correspond 1:1 with positions. Every index triple names one
/// counter-clockwise triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub indices: Vec<u16>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Check the structural invariants a backend relies on.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertex_count = self.positions.len();
        if vertex_count > usize::from(u16::MAX) + 1 {
            return Err(GeometryError::TooManyVertices(vertex_count));
        }
        if self.normals.len() != vertex_count {
            return Err(GeometryError::NormalCountMismatch {
                positions: vertex_count,
                normals: self.normals.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::IndexCountNotTriangles(self.indices.len()));
        }
        if let Some((slot, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &i)| usize::from(i) >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                slot,
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Axis-aligned cube spanning `[-1, 1]` on every axis.
    ///
    /// Faces do not share vertices so each one carries its own flat normal.
    pub fn cube() -> Self {
        // (outward normal, four corners counter-clockwise seen from outside)
        const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // Front
            ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
            // Back
            ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
            // Top
            ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
            // Bottom
            ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
            // Right
            ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
            // Left
            ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
        ];

        let mut geometry = Self::with_capacity(24, 36);
        for (normal, corners) in FACES {
            let base = geometry.positions.len() as u16;
            for [x, y, z] in corners {
                geometry.positions.push(Point3::new(x, y, z));
                geometry.normals.push(Vector3::from(normal));
            }
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        geometry
    }

    /// UV sphere of radius 1 with `rings + 1` latitude bands of
    /// `segments + 1` vertices each.
    ///
    /// The first and last bands collapse onto the poles, so their triangles
    /// have zero area.
    ///
    /// # Panics
    ///
    /// Panics if `segments` or `rings` is zero.
    pub fn sphere(segments: u16, rings: u16) -> Self {
        assert!(segments > 0 && rings > 0, "sphere needs at least one segment and one ring");

        let columns = usize::from(segments) + 1;
        let vertex_count = columns * (usize::from(rings) + 1);
        let mut geometry =
            Self::with_capacity(vertex_count, usize::from(segments) * usize::from(rings) * 6);

        for y in 0..=rings {
            let phi = f32::from(y) / f32::from(rings) * PI;
            for x in 0..=segments {
                let theta = f32::from(x) / f32::from(segments) * PI * 2.0;
                let n = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                geometry.positions.push(Point3::from(n));
                geometry.normals.push(n);
            }
        }

        // Indices are computed in usize; callers asking for more than 65536
        // vertices get a geometry that fails `validate`.
        for y in 0..usize::from(rings) {
            for x in 0..usize::from(segments) {
                let a = y * columns + x;
                let b = a + columns;
                for i in [a, b, a + 1, b, b + 1, a + 1] {
                    geometry.indices.push(i as u16);
                }
            }
        }
        geometry
    }

    /// Flat 6x6 quad in the XZ plane facing +Y.
    pub fn plane() -> Self {
        let mut geometry = Self::with_capacity(4, 6);
        for [x, z] in [[-3.0, -3.0], [3.0, -3.0], [3.0, 3.0], [-3.0, 3.0]] {
            geometry.positions.push(Point3::new(x, 0.0, z));
            geometry.normals.push(Vector3::y());
        }
        geometry.indices.extend_from_slice(&[0, 2, 1, 0, 3, 2]);
        geometry
    }

    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }
}

/// Primitive shapes a scene can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Cube,
    Sphere { segments: u16, rings: u16 },
    Plane,
}

impl Primitive {
    /// Sphere with the default tessellation.
    pub const SPHERE: Self = Self::Sphere {
        segments: 32,
        rings: 16,
    };

    pub fn generate(self) -> Geometry {
        match self {
            Self::Cube => Geometry::cube(),
            Self::Sphere { segments, rings } => Geometry::sphere(segments, rings),
            Self::Plane => Geometry::plane(),
        }
    }
}
