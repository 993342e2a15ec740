//! Persistence layer for the cache and result files.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats,
//! chosen from the file extension.

use crate::error::{RagError, Result};
use bincode::{Decode, Encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Save format for cache files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json, // Default to JSON
        }
    }
}

/// Save a value to a file, creating parent directories as needed.
pub fn save<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize + Encode,
{
    save_with_format(value, path, SaveFormat::from_path(path))
}

/// Save a value with a specific format.
pub fn save_with_format<T>(value: &T, path: &Path, format: SaveFormat) -> Result<()>
where
    T: Serialize + Encode,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RagError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| RagError::Serialization(e.to_string()))?
            .into_bytes(),
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            bincode::encode_to_vec(value, config)
                .map_err(|e| RagError::Serialization(e.to_string()))?
        }
    };

    fs::write(path, &data).map_err(|e| RagError::io(path, e))?;

    Ok(())
}

/// Load a value from a file.
pub fn load<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Decode<()>,
{
    if !path.exists() {
        return Err(RagError::CacheNotFound(path.to_path_buf()));
    }

    load_with_format(path, SaveFormat::from_path(path))
}

/// Load a value with a specific format.
pub fn load_with_format<T>(path: &Path, format: SaveFormat) -> Result<T>
where
    T: DeserializeOwned + Decode<()>,
{
    let data = fs::read(path).map_err(|e| RagError::io(path, e))?;

    let value = match format {
        SaveFormat::Json => serde_json::from_slice(&data)
            .map_err(|e| RagError::Serialization(format!("{}: {}", path.display(), e)))?,
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            let (value, _): (T, usize) = bincode::decode_from_slice(&data, config)
                .map_err(|e| RagError::Serialization(format!("{}: {}", path.display(), e)))?;
            value
        }
    };

    Ok(value)
}

/// Check if a cache file exists at the given path.
pub fn cache_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Get the size of a cache file in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| RagError::io(path, e))?;
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunk;
    use tempfile::TempDir;

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            Chunk {
                index: 0,
                start: 0,
                text: "Formell verifiering".to_string(),
            },
            Chunk {
                index: 1,
                start: 800,
                text: "av rekursionsrelationer".to_string(),
            },
        ]
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunks.json");

        save(&sample_chunks(), &path).unwrap();
        assert!(cache_exists(&path));

        let loaded: Vec<Chunk> = load(&path).unwrap();
        assert_eq!(loaded, sample_chunks());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Formell verifiering"));
    }

    #[test]
    fn test_save_and_load_bincode_vectors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("embeddings.bin");

        let vectors = vec![vec![0.25f32, -1.0, 3.5], vec![0.0; 3]];
        save(&vectors, &path).unwrap();

        let loaded: Vec<Vec<f32>> = load(&path).unwrap();
        assert_eq!(loaded, vectors);
        assert!(file_size(&path).unwrap() > 0);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SaveFormat::from_path(Path::new("a.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("a.bin")), SaveFormat::Bincode);
        assert_eq!(
            SaveFormat::from_path(Path::new("a.bincode")),
            SaveFormat::Bincode
        );
        assert_eq!(SaveFormat::from_path(Path::new("a")), SaveFormat::Json);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<Vec<Chunk>> = load(Path::new("/nonexistent/chunks.json"));
        assert!(matches!(result, Err(RagError::CacheNotFound(_))));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunks.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Vec<Chunk>> = load(&path);
        assert!(matches!(result, Err(RagError::Serialization(_))));
    }
}
