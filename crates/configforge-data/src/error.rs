//! Ingestion errors

use std::path::PathBuf;

/// Errors that can occur while discovering and reading data files
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The data root does not exist or is not a directory
    #[error("data directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    /// An I/O error while walking or reading
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failed
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Unknown encoding label
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    /// Bytes are not valid in the configured encoding
    #[error("malformed {0} text")]
    Decode(String),

    /// CSV syntax error
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Parsing a specific file failed
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<DataError>,
    },

    /// Two files map to the same table name
    #[error("files {} and {} both map to table '{name}'", .first.display(), .second.display())]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl From<DataError> for configforge_core::Error {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NameCollision { ref name, .. } => {
                configforge_core::Error::definition(name.clone(), err.to_string())
            }
            DataError::Io { path, source } => configforge_core::Error::io(path, source),
            DataError::MissingDir(ref path) => configforge_core::Error::io(
                path.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, err.to_string()),
            ),
            DataError::Parse { ref path, .. } => configforge_core::Error::io(
                path.clone(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
            ),
            other => configforge_core::Error::io(
                PathBuf::new(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, other.to_string()),
            ),
        }
    }
}
