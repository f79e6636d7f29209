//! Asset loading for the demo scene.
//!
//! Textures and models are read through an [`AssetSource`], decoded off the
//! render thread, and handed back as [`PendingLoad`] futures. A [`LoadJoin`]
//! reports once every required load has settled.
//!
//! Decoded assets are identified by a content-addressed [`AssetId`]; the GPU
//! backend keys its upload cache on it.

pub mod join;
pub mod load;
pub mod model;
pub mod source;
pub mod texture;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use join::{JoinReport, LoadJoin};
pub use load::{AssetLoader, LoadSender, PendingLoad};
pub use model::{MeshData, ModelData};
pub use source::{AssetSource, DirSource, MemorySource};
pub use texture::{TextureData, WrapMode};

/// Content-addressed asset ID: the first eight bytes of the SHA-256 of the
/// source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        AssetId(u64::from_le_bytes(prefix))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid asset path {0:?}")]
    InvalidPath(String),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("unsupported asset: {0}")]
    Unsupported(String),
    #[error("load of {0} was dropped before completing")]
    Cancelled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_addressed_ids() {
        let a = AssetId::of(b"brick");
        assert_eq!(a, AssetId::of(b"brick"));
        assert_ne!(a, AssetId::of(b"wood"));
        assert_eq!(a.to_string().len(), 16);
    }

    #[test]
    fn cancelled_error_names_the_load() {
        let err = AssetError::Cancelled("/assets/beveledcube.glb".into());
        assert!(err.to_string().contains("beveledcube.glb"));
    }
}
