/// orbit3d core library - matrix algebra, procedural geometry, orbit camera
/// and the render loop
///
/// This library holds everything the viewer does that does not depend on a
/// particular graphics API. Hosts provide a `RenderBackend` and feed
/// `InputEvent`s to a `Viewer`.

pub mod backend;
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod projection;
pub mod resources;
pub mod scene;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use backend::{DrawUniforms, FrameUniforms, MeshHandle, RecordingBackend, RenderBackend};
pub use camera::{CameraState, DragState, OrbitCamera};
pub use config::{SceneObject, ViewerConfig};
pub use error::{BackendError, ViewerError};
pub use geometry::{Geometry, GeometryError, Primitive};
pub use input::InputEvent;
pub use projection::Viewport;
pub use transform::{Mat4, Transform};
pub use viewer::{FrameStats, Viewer};
