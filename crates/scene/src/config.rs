use donutfield_assets::{Shading, TextParams, TorusParams};
use glam::Vec3;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Perspective camera and orbit-control settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

/// Everything the host needs to build and present the scene.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub donut_count: usize,
    pub position_spread: f32,
    /// Fixed seed for the donut field; `None` picks a fresh one each run.
    pub seed: Option<u64>,
    pub text: String,
    pub text_params: TextParams,
    pub torus: TorusParams,
    pub font_path: PathBuf,
    pub matcap_path: PathBuf,
    pub shading: Shading,
    pub pixel_ratio_cap: f32,
    /// Background as `0xRRGGBB`.
    pub clear_color: u32,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            donut_count: 100,
            position_spread: 10.0,
            seed: None,
            text: "originalsidd".into(),
            text_params: TextParams::default(),
            torus: TorusParams::default(),
            font_path: PathBuf::from("assets/fonts/helvetiker_regular.typeface.json"),
            matcap_path: PathBuf::from("assets/textures/matcaps/8.png"),
            shading: Shading::Normal,
            pixel_ratio_cap: 2.0,
            clear_color: 0x000222,
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        };
        positive("position_spread", self.position_spread)?;
        positive("pixel_ratio_cap", self.pixel_ratio_cap)?;
        positive("camera.fov_degrees", self.camera.fov_degrees)?;
        positive("camera.near", self.camera.near)?;
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid {
                field: "camera.far",
                reason: format!("must exceed near ({})", self.camera.near),
            });
        }
        if !(0.0..=1.0).contains(&self.camera.damping_factor) {
            return Err(ConfigError::Invalid {
                field: "camera.damping_factor",
                reason: format!("must be within [0, 1], got {}", self.camera.damping_factor),
            });
        }
        if self.clear_color > 0xFF_FFFF {
            return Err(ConfigError::Invalid {
                field: "clear_color",
                reason: format!("{:#x} is wider than 0xRRGGBB", self.clear_color),
            });
        }
        Ok(())
    }

    /// Background colour as linear-ignorant RGB in `[0, 1]`.
    pub fn clear_rgb(&self) -> [f64; 3] {
        let channel = |shift: u32| ((self.clear_color >> shift) & 0xFF) as f64 / 255.0;
        [channel(16), channel(8), channel(0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_demo_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.donut_count, 100);
        assert_eq!(config.position_spread, 10.0);
        assert_eq!(config.pixel_ratio_cap, 2.0);
        assert_eq!(config.text, "originalsidd");
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json(
            r#"{ "donut_count": 5, "seed": 7, "shading": "matcap", "camera": { "fov_degrees": 60 } }"#,
        )
        .unwrap();
        assert_eq!(config.donut_count, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.shading, Shading::Matcap);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.torus, TorusParams::default());
    }

    #[test]
    fn rejects_non_positive_spread() {
        let err = SceneConfig::from_json(r#"{ "position_spread": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "position_spread",
                ..
            }
        ));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = SceneConfig::from_json(r#"{ "camera": { "near": 5, "far": 1 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.far", .. }));
    }

    #[test]
    fn clear_color_channels() {
        let config = SceneConfig::default();
        let [r, g, b] = config.clear_rgb();
        assert_eq!(r, 0.0);
        assert!((g - 2.0 / 255.0).abs() < 1e-12);
        assert!((b - 34.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn loads_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "text": "hello" }"#).unwrap();
        let config = SceneConfig::from_json_file(tmp.path()).unwrap();
        assert_eq!(config.text, "hello");
    }

    #[test]
    fn unknown_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
