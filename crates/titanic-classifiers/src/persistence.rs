//! Binary artifact files (bincode).
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ModelError, Result};

fn io_err(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize `value` to `path`, creating parent directories as needed.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|source| ModelError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Deserialize a value written by [`write_artifact`].
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ModelError::ArtifactNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|source| ModelError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_artifact_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");
        assert!(matches!(
            read_artifact::<Vec<f64>>(&path),
            Err(ModelError::ArtifactNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("v.bin");
        write_artifact(&path, &vec![1.5f64, 2.5]).unwrap();
        let back: Vec<f64> = read_artifact(&path).unwrap();
        assert_eq!(back, vec![1.5, 2.5]);
    }
}
