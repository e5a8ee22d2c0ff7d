/// Viewer context and the per-frame render loop.
use log::{debug, trace};
use nalgebra::Point3;

use crate::backend::{DrawUniforms, FrameUniforms, RenderBackend};
use crate::camera::OrbitCamera;
use crate::config::{LightingConfig, ViewerConfig};
use crate::error::ViewerError;
use crate::input::InputEvent;
use crate::projection::{projection_matrix, Viewport};
use crate::scene::Scene;

/// What a frame submitted to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles: usize,
}

/// Everything one viewer instance owns: camera, meshes and viewport.
///
/// Input handling and rendering both go through `&mut`/`&` on this value, so
/// an event can never be handled in the middle of a frame.
pub struct Viewer {
    camera: OrbitCamera,
    scene: Scene,
    viewport: Viewport,
    config: ViewerConfig,
}

impl Viewer {
    /// Validate the configuration, size the backend and upload the scene.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        config: ViewerConfig,
        viewport: Viewport,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        backend.resize_viewport(viewport.width(), viewport.height());
        let scene = Scene::build(backend, &config.scene)?;
        Ok(Self {
            camera: OrbitCamera::new(config.camera.clone()),
            scene,
            viewport,
            config,
        })
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn handle_event<B: RenderBackend>(&mut self, backend: &mut B, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => self.camera.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.camera.pointer_move(x, y),
            InputEvent::PointerUp => self.camera.pointer_up(),
            InputEvent::Wheel { delta_y } => self.camera.wheel(delta_y),
            InputEvent::Resize { width, height } => {
                self.viewport.resize(width, height);
                backend.resize_viewport(self.viewport.width(), self.viewport.height());
                debug!("viewport resized to {}x{}", self.viewport.width(), self.viewport.height());
            }
        }
    }

    /// Render one frame at `time` seconds since start.
    pub fn render_frame<B: RenderBackend>(&self, backend: &mut B, time: f32) -> Result<FrameStats, ViewerError> {
        backend.clear(self.config.render.clear_color);

        let eye = self.camera.eye();
        let frame = FrameUniforms {
            projection: projection_matrix(&self.config.projection, &self.viewport),
            view: self.camera.view_matrix(),
            light_position: light_position(&self.config.lighting, time),
            camera_position: eye,
            time,
        };
        backend.set_frame_uniforms(&frame);

        let mut stats = FrameStats::default();
        for mesh in self.scene.meshes() {
            backend.set_draw_uniforms(&DrawUniforms {
                model: mesh.model_matrix(),
                color: mesh.color,
            });
            backend.draw(mesh.handle)?;
            stats.draw_calls += 1;
            stats.triangles += mesh.index_count / 3;
        }

        trace!("frame t={time:.3}: {} draws, {} triangles", stats.draw_calls, stats.triangles);
        Ok(stats)
    }

    /// Release every backend resource the viewer owns.
    pub fn shutdown<B: RenderBackend>(mut self, backend: &mut B) {
        self.scene.release(backend);
        debug!("viewer shut down");
    }
}

/// Light circling the Y axis at the configured radius and height.
pub fn light_position(lighting: &LightingConfig, time: f32) -> Point3<f32> {
    let (s, c) = (time * lighting.speed).sin_cos();
    Point3::new(s * lighting.orbit_radius, lighting.height, c * lighting.orbit_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};

    #[test]
    fn test_light_orbit() {
        let lighting = LightingConfig::default();
        assert_eq!(light_position(&lighting, 0.0), Point3::new(0.0, 5.0, 5.0));

        let quarter = std::f32::consts::PI; // t * 0.5 = pi / 2
        let p = light_position(&lighting, quarter);
        assert!((p - Point3::new(5.0, 5.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut backend = RecordingBackend::new();
        let mut config = ViewerConfig::default();
        config.camera.max_distance = 1.0;
        let result = Viewer::new(&mut backend, config, Viewport::default());
        assert!(matches!(result, Err(ViewerError::InvalidConfig(_))));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_resize_reaches_backend() {
        let mut backend = RecordingBackend::new();
        let mut viewer = Viewer::new(&mut backend, ViewerConfig::default(), Viewport::default()).unwrap();
        let _ = backend.take_calls();

        viewer.handle_event(&mut backend, InputEvent::Resize { width: 1024, height: 0 });
        assert_eq!(backend.calls(), &[BackendCall::Resize { width: 1024, height: 1 }]);
        assert_eq!(viewer.viewport().width(), 1024);
    }

    #[test]
    fn test_frame_stats() {
        let mut backend = RecordingBackend::new();
        let viewer = Viewer::new(&mut backend, ViewerConfig::default(), Viewport::default()).unwrap();
        let stats = viewer.render_frame(&mut backend, 0.0).unwrap();
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(stats.triangles, 12 + 32 * 16 * 2 + 12);
    }
}
