/// Viewer configuration with TOML support.
///
/// Every section uses `#[serde(default)]`, so a file that only overrides
/// `[camera]` keeps the defaults everywhere else.
use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::error::ViewerError;
use crate::geometry::Primitive;

/// Top-level viewer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub lighting: LightingConfig,
    pub render: RenderConfig,
    /// Scene objects in draw order.
    pub scene: Vec<SceneObject>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            lighting: LightingConfig::default(),
            render: RenderConfig::default(),
            scene: SceneObject::default_scene(),
        }
    }
}

impl ViewerConfig {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml(&self) -> Result<String, ViewerError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the camera and projection would otherwise assert on.
    pub fn validate(&self) -> Result<(), ViewerError> {
        let camera = &self.camera;
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance) {
            return Err(invalid(format!(
                "camera distance limits [{}, {}]",
                camera.min_distance, camera.max_distance
            )));
        }
        if !(camera.sensitivity.is_finite() && camera.zoom_speed.is_finite()) {
            return Err(invalid("camera sensitivity and zoom_speed must be finite".to_owned()));
        }
        // Clamping passes NaN through, and a NaN eye fails look_at.
        for (name, value) in [("distance", camera.distance), ("pitch", camera.pitch), ("yaw", camera.yaw)] {
            if !value.is_finite() {
                return Err(invalid(format!("camera {name} {value} must be finite")));
            }
        }
        let projection = &self.projection;
        if !(projection.fov_y > 0.0 && projection.fov_y < std::f32::consts::PI) {
            return Err(invalid(format!("fov_y {} outside (0, pi)", projection.fov_y)));
        }
        if !(projection.near > 0.0 && projection.far > projection.near) {
            return Err(invalid(format!(
                "clip planes near {} far {}",
                projection.near, projection.far
            )));
        }
        check_color("render.clear_color", &self.render.clear_color)?;
        for (i, object) in self.scene.iter().enumerate() {
            if !object.position.iter().all(|c| c.is_finite()) {
                return Err(invalid(format!("scene[{i}] position {:?} must be finite", object.position)));
            }
            check_color(&format!("scene[{i}] color"), &object.color)?;
        }
        Ok(())
    }
}

fn check_color(name: &str, color: &[f32; 3]) -> Result<(), ViewerError> {
    if color.iter().all(|c| (0.0..=1.0).contains(c)) {
        Ok(())
    } else {
        Err(invalid(format!("{name} {color:?} outside [0, 1]")))
    }
}

fn invalid(message: String) -> ViewerError {
    ViewerError::InvalidConfig(message)
}

/// Orbit camera starting point and input response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    /// Radians per pointer pixel while dragging.
    pub sensitivity: f32,
    /// Distance units per wheel delta unit.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl CameraConfig {
    pub fn initial_state(&self) -> CameraState {
        CameraState {
            distance: self.distance,
            pitch: self.pitch,
            yaw: self.yaw,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        let state = CameraState::default();
        Self {
            distance: state.distance,
            pitch: state.pitch,
            yaw: state.yaw,
            sensitivity: 0.005,
            zoom_speed: 0.01,
            min_distance: 3.0,
            max_distance: 20.0,
        }
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Point light circling the scene above the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub orbit_radius: f32,
    pub height: f32,
    /// Angular speed in radians per second.
    pub speed: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 5.0,
            height: 5.0,
            speed: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 3],
    /// Off by default: the UV sphere winds clockwise seen from outside.
    pub cull_back_faces: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.18],
            cull_back_faces: false,
        }
    }
}

/// One primitive placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub primitive: Primitive,
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl SceneObject {
    /// Red cube, green sphere, blue cube along the X axis.
    pub fn default_scene() -> Vec<Self> {
        vec![
            Self {
                primitive: Primitive::Cube,
                position: [-2.5, 0.5, 0.0],
                color: [0.9, 0.3, 0.3],
            },
            Self {
                primitive: Primitive::SPHERE,
                position: [0.0, 0.5, 0.0],
                color: [0.3, 0.9, 0.4],
            },
            Self {
                primitive: Primitive::Cube,
                position: [2.5, 0.3, 0.0],
                color: [0.3, 0.4, 0.9],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = ViewerConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = r"
[camera]
sensitivity = 0.01

[lighting]
speed = 2.0
";
        let config: ViewerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.camera.sensitivity, 0.01);
        assert_eq!(config.camera.distance, 8.0);
        assert_eq!(config.lighting.speed, 2.0);
        assert_eq!(config.lighting.orbit_radius, 5.0);
        assert_eq!(config.scene.len(), 3);
    }

    #[test]
    fn scene_objects_parse() {
        let text = r#"
[[scene]]
primitive = "plane"
position = [0.0, -1.0, 0.0]
color = [0.5, 0.5, 0.5]

[[scene]]
primitive = { sphere = { segments = 8, rings = 4 } }
position = [0.0, 0.0, 0.0]
color = [1.0, 1.0, 1.0]
"#;
        let config: ViewerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.scene.len(), 2);
        assert_eq!(config.scene[0].primitive, Primitive::Plane);
        assert_eq!(
            config.scene[1].primitive,
            Primitive::Sphere { segments: 8, rings: 4 }
        );
    }

    #[test]
    fn validate_rejects_bad_limits() {
        assert!(ViewerConfig::default().validate().is_ok());

        let mut config = ViewerConfig::default();
        config.camera.min_distance = 30.0;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));

        let mut config = ViewerConfig::default();
        config.projection.far = config.projection.near;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));

        let mut config = ViewerConfig::default();
        config.projection.fov_y = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_camera() {
        for text in ["[camera]\ndistance = nan", "[camera]\nyaw = inf", "[camera]\npitch = nan"] {
            let config: ViewerConfig = toml::from_str(text).unwrap();
            match config.validate() {
                Err(ViewerError::InvalidConfig(message)) => assert!(message.contains("camera"), "{message}"),
                other => panic!("{text:?} should be rejected, got {other:?}"),
            }
        }

        // Infinite pitch clamps to the pole, but it is still rejected.
        let mut config = ViewerConfig::default();
        config.camera.pitch = f32::NEG_INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_colors() {
        let text = r#"
[[scene]]
primitive = "cube"
position = [0.0, 0.0, 0.0]
color = [7.0, -3.0, 0.5]
"#;
        let config: ViewerConfig = toml::from_str(text).unwrap();
        match config.validate() {
            Err(ViewerError::InvalidConfig(message)) => assert!(message.contains("scene[0] color")),
            other => panic!("unexpected {other:?}"),
        }

        let mut config = ViewerConfig::default();
        config.render.clear_color = [0.0, 1.5, 0.0];
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.scene[1].position[2] = f32::NAN;
        assert!(config.validate().is_err());

        // Bounds are inclusive.
        let mut config = ViewerConfig::default();
        config.scene[0].color = [0.0, 1.0, 1.0];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = std::env::temp_dir().join(format!("orbit3d-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[camera\ndistance = ").unwrap();
        assert!(matches!(ViewerConfig::load(&path), Err(ViewerError::Config(_))));
        assert!(matches!(
            ViewerConfig::load(&dir.join("missing.toml")),
            Err(ViewerError::Io(_))
        ));
    }
}
