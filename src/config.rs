use std::fs;
use std::path::{Path, PathBuf};

use nalgebra as na;
use na::{vector, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RenderError};
use crate::scene::shader::ShadingMode;
use crate::util::{orthographic, perspective, scaling, translation};

/// Camera placement. `up` only has to be non-parallel to the view direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vector3<f32>,
    pub center: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Camera {
        return Camera {
            eye: vector![1.0, 1.0, 3.0],
            center: vector![0.0, 0.0, 0.0],
            up: vector![0.0, 1.0, 0.0],
        };
    }
}

/// View volume. `width` and `height` are measured at the near plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Perspective { width: f32, height: f32, near: f32, far: f32 },
    Orthographic { width: f32, height: f32, near: f32, far: f32 },
}

impl Default for Projection {
    fn default() -> Projection {
        return Projection::Perspective { width: 1.0, height: 1.0, near: 1.0, far: 10.0 };
    }
}

impl Projection {
    pub fn matrix(&self) -> Result<Matrix4<f32>, RenderError> {
        match *self {
            Projection::Perspective { width, height, near, far } => {
                check_volume(width, height, near, far)?;
                if near <= 0.0 {
                    return Err(RenderError::InvalidProjection(format!("perspective near plane must be positive, got {}", near)));
                }
                return Ok(perspective(width, height, near, far));
            }
            Projection::Orthographic { width, height, near, far } => {
                check_volume(width, height, near, far)?;
                return Ok(orthographic(width, height, near, far));
            }
        }
    }
}

fn check_volume(width: f32, height: f32, near: f32, far: f32) -> Result<(), RenderError> {
    if width <= 0.0 || height <= 0.0 {
        return Err(RenderError::InvalidProjection(format!("empty view volume {}x{}", width, height)));
    }
    if far <= near {
        return Err(RenderError::InvalidProjection(format!("far plane {} is not behind near plane {}", far, near)));
    }
    return Ok(());
}

/// Placement of the object in the world: scaled first, then translated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTransform {
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for ModelTransform {
    fn default() -> ModelTransform {
        return ModelTransform {
            translation: Vector3::zeros(),
            scale: vector![1.0, 1.0, 1.0],
        };
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = self.translation;
        let s = self.scale;
        return translation(t.x, t.y, t.z) * scaling(s.x, s.y, s.z);
    }
}

/// Everything one render call needs besides the geometry itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    /// Direction towards the light, normalized before use.
    pub light: Vector3<f32>,
    pub projection: Projection,
    pub model: ModelTransform,
    pub shading: ShadingMode,
    pub output: PathBuf,
    pub depth_output: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        return RenderConfig {
            width: 1024,
            height: 1024,
            camera: Camera::default(),
            light: vector![1.0, 1.0, 1.0],
            projection: Projection::default(),
            model: ModelTransform::default(),
            shading: ShadingMode::default(),
            output: PathBuf::from("framebuffer.png"),
            depth_output: None,
        };
    }
}

impl RenderConfig {
    /// Reads a TOML file; missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        return RenderConfig::parse(&contents);
    }

    pub fn parse(contents: &str) -> Result<RenderConfig, ConfigError> {
        return Ok(toml::from_str(contents)?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;
    use crate::scene::shader::Lighting;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RenderConfig::parse("").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = RenderConfig::parse(r#"
            width = 320
            depth_output = "depth.png"

            [camera]
            eye = [0.0, 0.0, 4.0]

            [projection]
            kind = "orthographic"
            width = 2.0
            height = 2.0
            near = 0.5
            far = 8.0

            [shading]
            mode = "flat"
            color = { r = 10, g = 20, b = 30 }
        "#).unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 1024);
        assert_eq!(config.camera.eye, vector![0.0, 0.0, 4.0]);
        assert_eq!(config.camera.up, vector![0.0, 1.0, 0.0]);
        assert_eq!(config.projection, Projection::Orthographic { width: 2.0, height: 2.0, near: 0.5, far: 8.0 });
        assert_eq!(config.shading, ShadingMode::Flat { color: Color::new(10, 20, 30) });
        assert_eq!(config.depth_output, Some(PathBuf::from("depth.png")));
    }

    #[test]
    fn textured_mode_parses_lighting() {
        let config = RenderConfig::parse(r#"
            [shading]
            mode = "textured"
            lighting = "specular"
        "#).unwrap();
        assert_eq!(config.shading, ShadingMode::Textured { lighting: Lighting::Specular });
    }

    #[test]
    fn random_color_seed_defaults_to_zero() {
        let config = RenderConfig::parse("[shading]\nmode = \"random_color\"\n").unwrap();
        assert_eq!(config.shading, ShadingMode::RandomColor { seed: 0 });
        let config = RenderConfig::parse("[shading]\nmode = \"random_color\"\nseed = 42\n").unwrap();
        assert_eq!(config.shading, ShadingMode::RandomColor { seed: 42 });
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let result = RenderConfig::parse("width = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn degenerate_projections_are_rejected() {
        let flat = Projection::Perspective { width: 1.0, height: 1.0, near: 2.0, far: 2.0 };
        assert!(matches!(flat.matrix(), Err(RenderError::InvalidProjection(_))));
        let behind = Projection::Perspective { width: 1.0, height: 1.0, near: 0.0, far: 2.0 };
        assert!(matches!(behind.matrix(), Err(RenderError::InvalidProjection(_))));
        let ortho = Projection::Orthographic { width: 0.0, height: 1.0, near: 0.0, far: 2.0 };
        assert!(matches!(ortho.matrix(), Err(RenderError::InvalidProjection(_))));
        assert!(Projection::default().matrix().is_ok());
    }
}
