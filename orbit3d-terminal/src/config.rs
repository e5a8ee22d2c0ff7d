/// Terminal host configuration: viewer options plus terminal-specific knobs.
use std::path::Path;

use orbit3d_core::{ViewerConfig, ViewerError};
use serde::{Deserialize, Serialize};

/// Everything the terminal binary reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub terminal: TerminalOptions,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.terminal.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ViewerError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalOptions {
    /// Target frames per second.
    pub fps: u32,
    /// Height of a character cell divided by its width.
    pub cell_aspect: f32,
    /// Approximate cell size in pixels, used to scale mouse motion.
    pub cell_width_px: f32,
    pub cell_height_px: f32,
    /// Wheel delta reported per scroll notch.
    pub wheel_step: f32,
    /// Orbit angle per arrow or WASD key press, in radians.
    pub key_step: f32,
    pub ambient: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        let shading = ShadingOptions::default();
        Self {
            fps: 30,
            cell_aspect: 2.0,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            wheel_step: 100.0,
            key_step: 0.1,
            ambient: shading.ambient,
            specular: shading.specular,
            shininess: shading.shininess,
        }
    }
}

impl TerminalOptions {
    pub fn shading(&self) -> ShadingOptions {
        ShadingOptions {
            ambient: self.ambient,
            specular: self.specular,
            shininess: self.shininess,
        }
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.fps == 0 {
            return Err(ViewerError::InvalidConfig("terminal fps must be at least 1".to_owned()));
        }
        if !(self.cell_aspect > 0.0 && self.cell_aspect.is_finite()) {
            return Err(ViewerError::InvalidConfig(format!(
                "terminal cell_aspect {} must be positive",
                self.cell_aspect
            )));
        }
        for (name, value) in [
            ("cell_width_px", self.cell_width_px),
            ("cell_height_px", self.cell_height_px),
            ("wheel_step", self.wheel_step),
            ("key_step", self.key_step),
        ] {
            if !value.is_finite() {
                return Err(ViewerError::InvalidConfig(format!("terminal {name} {value} must be finite")));
            }
        }
        Ok(())
    }
}

/// Lighting terms the rasterizer applies on top of the diffuse term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingOptions {
    pub ambient: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            ambient: 0.15,
            specular: 0.4,
            shininess: 32.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit3d_core::Primitive;

    #[test]
    fn test_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[terminal]"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file() {
        let text = r#"
            [terminal]
            fps = 60

            [viewer.camera]
            distance = 12.0

            [[viewer.scene]]
            primitive = "plane"
            position = [0.0, -1.0, 0.0]
            color = [0.4, 0.4, 0.4]
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.terminal.fps, 60);
        assert_eq!(config.terminal.cell_aspect, 2.0);
        assert_eq!(config.viewer.camera.distance, 12.0);
        assert_eq!(config.viewer.camera.min_distance, 3.0);
        assert_eq!(config.viewer.scene.len(), 1);
        assert_eq!(config.viewer.scene[0].primitive, Primitive::Plane);
    }

    #[test]
    fn test_load_rejects_zero_fps() {
        let path = std::env::temp_dir().join(format!("orbit3d-terminal-{}.toml", std::process::id()));
        std::fs::write(&path, "[terminal]\nfps = 0\n").unwrap();
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ViewerError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_input_scales_rejected() {
        let config: AppConfig = toml::from_str("[terminal]\nwheel_step = nan\n").unwrap();
        assert!(matches!(config.terminal.validate(), Err(ViewerError::InvalidConfig(_))));

        for options in [
            TerminalOptions { cell_width_px: f32::INFINITY, ..TerminalOptions::default() },
            TerminalOptions { cell_height_px: f32::NAN, ..TerminalOptions::default() },
            TerminalOptions { key_step: f32::NEG_INFINITY, ..TerminalOptions::default() },
        ] {
            match options.validate() {
                Err(ViewerError::InvalidConfig(message)) => assert!(message.contains("must be finite")),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(TerminalOptions::default().validate().is_ok());
    }

    #[test]
    fn test_shading_from_options() {
        let options = TerminalOptions {
            ambient: 0.3,
            ..TerminalOptions::default()
        };
        assert_eq!(options.shading().ambient, 0.3);
        assert_eq!(options.shading().shininess, 32.0);
    }
}
