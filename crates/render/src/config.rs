use std::path::{Path, PathBuf};

use flyscene_input::KeyBindings;
use flyscene_scene::{AssetPaths, DemoParams};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::FlyCamera;
use crate::motion::MotionConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 50.0),
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl CameraConfig {
    pub fn build(&self, aspect: f32) -> FlyCamera {
        FlyCamera::new(
            self.position,
            self.fov_degrees.to_radians(),
            aspect,
            self.near,
            self.far,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory that `/`-prefixed asset paths resolve against.
    pub root: PathBuf,
    #[serde(flatten)]
    pub paths: AssetPaths,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            paths: AssetPaths::default(),
        }
    }
}

/// Everything tunable about the demo. Every field has a default, so a
/// partial YAML file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub motion: MotionConfig,
    pub params: DemoParams,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
    pub bindings: KeyBindings,
}

impl DemoConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
