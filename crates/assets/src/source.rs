use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::AssetError;

/// Where asset bytes come from. Paths use URL-style forward slashes; a
/// leading `/` is relative to the source root.
pub trait AssetSource: Send + Sync + 'static {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Reads assets from a directory on disk (`public/` by default).
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset path onto the filesystem, refusing anything that would
    /// escape the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(AssetError::InvalidPath(path.to_string())),
            }
        }
        Ok(self.root.join(relative))
    }
}

impl Default for DirSource {
    fn default() -> Self {
        Self::new("public")
    }
}

impl AssetSource for DirSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.resolve(path)?;
        std::fs::read(&full).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_string()),
            _ => AssetError::Io {
                path: full.display().to_string(),
                source,
            },
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// In-memory assets, used by tests and the headless CLI.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize(path).to_string(), Arc::from(bytes.into()));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(normalize(path))
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory:{} files", self.files.len())
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_resolves_leading_slash_against_root() {
        let src = DirSource::new("public");
        assert_eq!(
            src.resolve("/assets/WoodFloor051.png").unwrap(),
            PathBuf::from("public/assets/WoodFloor051.png")
        );
        assert_eq!(
            src.resolve("assets/x.jpg").unwrap(),
            PathBuf::from("public/assets/x.jpg")
        );
    }

    #[test]
    fn dir_source_rejects_escapes() {
        let src = DirSource::default();
        assert!(matches!(
            src.resolve("/../secret"),
            Err(AssetError::InvalidPath(_))
        ));
        assert!(matches!(src.resolve("/"), Err(AssetError::InvalidPath(_))));
    }

    #[test]
    fn dir_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/a.bin"), b"abc").unwrap();

        let src = DirSource::new(dir.path());
        assert_eq!(src.read("/assets/a.bin").unwrap(), b"abc");
        assert!(matches!(
            src.read("/assets/missing.bin"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn memory_source_ignores_leading_slash() {
        let src = MemorySource::new().with("/assets/a.bin", b"xyz".to_vec());
        assert_eq!(src.read("assets/a.bin").unwrap(), b"xyz");
        assert_eq!(src.read("/assets/a.bin").unwrap(), b"xyz");
        assert!(src.read("/nope").is_err());
        assert_eq!(src.len(), 1);
    }
}
