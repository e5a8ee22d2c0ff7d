/// Contract between the render loop and a rendering backend.
///
/// The core never touches a graphics API directly. It uploads geometry once,
/// then per frame clears, pushes shared uniforms, and issues one
/// uniforms-plus-draw pair per mesh.
use nalgebra::{Point3, Vector3};

use crate::error::BackendError;
use crate::geometry::Geometry;
use crate::resources::ResourceTable;
use crate::transform::Mat4;

pub use crate::resources::MeshHandle;

/// Shader state shared by every draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub light_position: Point3<f32>,
    pub camera_position: Point3<f32>,
    /// Seconds since the viewer started.
    pub time: f32,
}

/// Shader state for a single draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub model: Mat4,
    pub color: Vector3<f32>,
}

pub trait RenderBackend {
    /// Allocate backend-resident buffers for `geometry`.
    ///
    /// Fails if the geometry breaks its invariants.
    fn upload_geometry(&mut self, geometry: &Geometry) -> Result<MeshHandle, BackendError>;

    /// Free the buffers behind `handle`.
    fn release(&mut self, handle: MeshHandle) -> Result<(), BackendError>;

    /// Clear colour and depth targets.
    fn clear(&mut self, color: [f32; 3]);

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms);

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms);

    /// Indexed draw of `handle` with the current uniforms.
    fn draw(&mut self, handle: MeshHandle) -> Result<(), BackendError>;

    fn resize_viewport(&mut self, width: u32, height: u32);
}

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Upload { handle: MeshHandle, index_count: usize },
    Release(MeshHandle),
    Clear([f32; 3]),
    FrameUniforms(FrameUniforms),
    DrawUniforms(DrawUniforms),
    Draw(MeshHandle),
    Resize { width: u32, height: u32 },
}

/// Headless backend that validates and stores geometry and records every
/// call, for driving a viewer without a display.
#[derive(Default)]
pub struct RecordingBackend {
    meshes: ResourceTable<Geometry>,
    calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn geometry(&self, handle: MeshHandle) -> Option<&Geometry> {
        self.meshes.get(handle)
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }
}

impl RenderBackend for RecordingBackend {
    fn upload_geometry(&mut self, geometry: &Geometry) -> Result<MeshHandle, BackendError> {
        geometry.validate()?;
        let index_count = geometry.indices.len();
        let handle = self.meshes.insert(geometry.clone());
        self.calls.push(BackendCall::Upload { handle, index_count });
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) -> Result<(), BackendError> {
        self.meshes
            .remove(handle)
            .ok_or(BackendError::StaleHandle(handle))?;
        self.calls.push(BackendCall::Release(handle));
        Ok(())
    }

    fn clear(&mut self, color: [f32; 3]) {
        self.calls.push(BackendCall::Clear(color));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.calls.push(BackendCall::FrameUniforms(*uniforms));
    }

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.calls.push(BackendCall::DrawUniforms(*uniforms));
    }

    fn draw(&mut self, handle: MeshHandle) -> Result<(), BackendError> {
        if self.meshes.get(handle).is_none() {
            return Err(BackendError::StaleHandle(handle));
        }
        self.calls.push(BackendCall::Draw(handle));
        Ok(())
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(BackendCall::Resize { width, height });
    }
}
