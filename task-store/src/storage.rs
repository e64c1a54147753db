use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Error type for reading or writing a JSON record file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON array of records kept in a single file.
///
/// Every read deserializes the whole file and every write replaces it, so
/// there is no partial update and no locking between writers.
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file, returning `None` if it does not exist.
    pub fn try_load(&self) -> Result<Option<Vec<T>>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Reads the file, treating a missing, unreadable or corrupt file as an
    /// empty list.
    pub fn load(&self) -> Vec<T> {
        match self.try_load() {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("Error loading records, starting empty: {}", err);
                Vec::new()
            }
        }
    }

    /// Replaces the file contents with `records`, pretty-printed.
    pub fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.path)
            .map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(io_error)?;
        tracing::debug!("Saved {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}
