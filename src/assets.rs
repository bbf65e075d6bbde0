//! Asset byte sources
//!
//! Geometry lists, shader text and image files all come in through an
//! [`AssetSource`]. Sources are shared with the texture decode workers, so they
//! must be `Send + Sync`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::error::{RenderError, RenderResult};

/// Provides raw asset bytes by path
pub trait AssetSource: Send + Sync {
    fn read_bytes(&self, path: &str) -> RenderResult<Vec<u8>>;

    /// Reads an asset as UTF-8 text (shader sources, coordinate lists)
    fn read_text(&self, path: &str) -> RenderResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| RenderError::Asset {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileSystemSource {
    fn read_bytes(&self, path: &str) -> RenderResult<Vec<u8>> {
        let full = self.root.join(path.trim_start_matches("./"));
        std::fs::read(&full).map_err(|source| RenderError::Asset {
            path: full.display().to_string(),
            source,
        })
    }
}

/// In-memory asset table
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add a file
    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), bytes.into());
    }
}

impl AssetSource for MemorySource {
    fn read_bytes(&self, path: &str) -> RenderResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::Asset {
                path: path.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_round_trips_text() {
        let source = MemorySource::new().with_file("shaders/pbr.vert", "fn main() {}");
        assert_eq!(source.read_text("shaders/pbr.vert").unwrap(), "fn main() {}");
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let source = MemorySource::new();
        let err = source.read_bytes("coords/cube.txt").unwrap_err();
        assert!(matches!(err, RenderError::Asset { .. }));
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let source = MemorySource::new().with_file("bad.txt", vec![0xff, 0xfe]);
        assert!(source.read_text("bad.txt").is_err());
    }

    #[test]
    fn test_file_system_source_strips_dot_prefix() {
        let dir = std::env::temp_dir().join(format!("lumen-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plane.txt"), "0,0,0").unwrap();

        let source = FileSystemSource::new(&dir);
        assert_eq!(source.read_text("./plane.txt").unwrap(), "0,0,0");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
