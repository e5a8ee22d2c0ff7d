/// Crate-level error types.
use thiserror::Error;

use crate::backend::MeshHandle;
use crate::geometry::GeometryError;

/// Failures reported by a [`RenderBackend`](crate::backend::RenderBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("geometry rejected: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("mesh handle {0} does not name a live resource")]
    StaleHandle(MeshHandle),
    #[error("failed to create {resource}: {log}")]
    ResourceCreation { resource: String, log: String },
}

/// Errors produced by the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A backend resource could not be created during scene setup.
    #[error("setup failed creating {resource}: {log}")]
    Setup { resource: String, log: String },
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),
}
