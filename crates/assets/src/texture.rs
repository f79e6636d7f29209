use serde::{Deserialize, Serialize};

use crate::{AssetError, AssetId};

/// Texture addressing outside `0..1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// A decoded RGBA8 image plus sampling hints.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub id: AssetId,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub wrap: WrapMode,
    /// UV scale applied when sampling.
    pub repeat: [f32; 2],
}

impl TextureData {
    /// Decode PNG or JPEG bytes.
    pub fn decode(label: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        tracing::debug!(label, width, height, "decoded texture");
        Ok(Self {
            id: AssetId::of(bytes),
            label: label.to_string(),
            width,
            height,
            rgba: image.into_raw(),
            wrap: WrapMode::default(),
            repeat: [1.0, 1.0],
        })
    }

    /// 1×1 texture of a single color.
    pub fn solid(label: &str, rgba: [u8; 4]) -> Self {
        Self {
            id: AssetId::of(&rgba),
            label: label.to_string(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            wrap: WrapMode::Repeat,
            repeat: [1.0, 1.0],
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_repeat(mut self, u: f32, v: f32) -> Self {
        self.repeat = [u, v];
        self
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }
}
