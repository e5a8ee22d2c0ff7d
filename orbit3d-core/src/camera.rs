/// Orbit camera driven by pointer drag and wheel input
use std::f32::consts::FRAC_PI_2;

use log::trace;
use nalgebra::{Point3, Vector3};

use crate::config::CameraConfig;
use crate::transform::{Mat4, Transform};

/// Orbit parameters around the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl CameraState {
    /// Spherical-to-Cartesian eye position.
    pub fn derive_eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Point3::new(
            sin_yaw * cos_pitch * self.distance,
            sin_pitch * self.distance,
            cos_yaw * cos_pitch * self.distance,
        )
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            distance: 8.0,
            pitch: 0.4,
            yaw: 0.0,
        }
    }
}

/// Whether a drag is in progress, and where the pointer was last seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { last_x: f32, last_y: f32 },
}

/// Camera orbiting the origin, always looking at it with +Y up.
///
/// Pitch stays within `[-pi/2, pi/2]` and distance within the configured
/// limits after every update.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: CameraState,
    drag: DragState,
    config: CameraConfig,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            state: config.initial_state(),
            drag: DragState::Idle,
            config,
        };
        camera.state.pitch = clamp_pitch(camera.state.pitch);
        camera.state.distance = camera.clamp_distance(camera.state.distance);
        camera
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drag = DragState::Dragging { last_x: x, last_y: y };
    }

    /// Rotate by the pointer delta while dragging; ignored otherwise.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let DragState::Dragging { last_x, last_y } = self.drag else {
            return;
        };
        let sensitivity = self.config.sensitivity;
        self.orbit(-(x - last_x) * sensitivity, (y - last_y) * sensitivity);
        self.drag = DragState::Dragging { last_x: x, last_y: y };
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Zoom by a wheel delta, independent of drag mode.
    pub fn wheel(&mut self, delta_y: f32) {
        self.state.distance = self.clamp_distance(self.state.distance + delta_y * self.config.zoom_speed);
        trace!("camera distance {:.2}", self.state.distance);
    }

    /// Apply a rotation directly, in radians.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.state.yaw += d_yaw;
        self.state.pitch = clamp_pitch(self.state.pitch + d_pitch);
        trace!("camera yaw {:.3} pitch {:.3}", self.state.yaw, self.state.pitch);
    }

    /// Return to the configured starting orbit and stop any drag.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn eye(&self) -> Point3<f32> {
        self.state.derive_eye()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Transform::look_at(&self.eye(), &Point3::origin(), &Vector3::y())
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.config.min_distance, self.config.max_distance)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-FRAC_PI_2, FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_eye() {
        let eye = CameraState { distance: 8.0, pitch: 0.0, yaw: 0.0 }.derive_eye();
        assert!((eye - Point3::new(0.0, 0.0, 8.0)).norm() < 1e-5);

        let eye = CameraState { distance: 8.0, pitch: 0.0, yaw: FRAC_PI_2 }.derive_eye();
        assert!((eye - Point3::new(8.0, 0.0, 0.0)).norm() < 1e-5);

        let eye = CameraState { distance: 4.0, pitch: FRAC_PI_2, yaw: 1.3 }.derive_eye();
        assert!((eye - Point3::new(0.0, 4.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_defaults() {
        let camera = OrbitCamera::default();
        assert_eq!(camera.state(), CameraState { distance: 8.0, pitch: 0.4, yaw: 0.0 });
        assert_eq!(camera.drag(), DragState::Idle);
    }

    #[test]
    fn test_drag_updates_yaw_and_pitch() {
        let mut camera = OrbitCamera::default();
        camera.pointer_down(100.0, 100.0);
        assert!(camera.is_dragging());
        camera.pointer_move(90.0, 110.0);
        camera.pointer_up();
        assert!(!camera.is_dragging());

        let state = camera.state();
        assert!((state.yaw - 0.05).abs() < 1e-6);
        assert!((state.pitch - 0.45).abs() < 1e-6);
        assert_eq!(state.distance, 8.0);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut camera = OrbitCamera::default();
        camera.pointer_move(500.0, 500.0);
        assert_eq!(camera.state(), CameraState::default());
    }

    #[test]
    fn test_drag_tracks_last_position() {
        let mut camera = OrbitCamera::default();
        camera.pointer_down(0.0, 0.0);
        camera.pointer_move(10.0, 0.0);
        camera.pointer_move(20.0, 0.0);
        assert!((camera.state().yaw + 0.1).abs() < 1e-6);
        assert_eq!(camera.drag(), DragState::Dragging { last_x: 20.0, last_y: 0.0 });
    }

    #[test]
    fn test_pitch_clamped_at_poles() {
        let mut camera = OrbitCamera::default();
        camera.pointer_down(0.0, 0.0);
        camera.pointer_move(0.0, 10_000.0);
        assert_eq!(camera.state().pitch, FRAC_PI_2);
        camera.pointer_move(0.0, -30_000.0);
        assert_eq!(camera.state().pitch, -FRAC_PI_2);
        // The view stays finite at the pole.
        assert!(camera.view_matrix().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_wheel_clamps_distance() {
        let mut camera = OrbitCamera::default();
        camera.wheel(100.0);
        assert!((camera.state().distance - 9.0).abs() < 1e-6);
        camera.wheel(1e6);
        assert_eq!(camera.state().distance, 20.0);
        camera.wheel(-1e6);
        assert_eq!(camera.state().distance, 3.0);
    }

    #[test]
    fn test_wheel_works_while_dragging() {
        let mut camera = OrbitCamera::default();
        camera.pointer_down(0.0, 0.0);
        camera.wheel(-200.0);
        assert!(camera.is_dragging());
        assert!((camera.state().distance - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut camera = OrbitCamera::default();
        camera.pointer_down(0.0, 0.0);
        camera.pointer_move(40.0, 40.0);
        camera.wheel(300.0);
        camera.reset();
        assert_eq!(camera.state(), CameraState::default());
        assert!(!camera.is_dragging());
    }

    #[test]
    fn test_view_looks_at_origin() {
        let camera = OrbitCamera::default();
        let origin = camera.view_matrix().transform_point(&Point3::origin());
        assert!(origin.x.abs() < 1e-5 && origin.y.abs() < 1e-5);
        assert!((origin.z + 8.0).abs() < 1e-5);
    }
}
