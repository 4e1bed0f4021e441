use std::path::{Path, PathBuf};

/// Errors returned by the query engine and its persistence layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The index could not be opened: a backing file is missing or malformed.
    #[error("index unavailable at {}: {cause}", .location.display())]
    IndexUnavailable { location: PathBuf, cause: String },
    /// The on-disk data disagrees with its own directory.
    #[error("index corrupt at {}: {cause}", .location.display())]
    CorruptIndex { location: PathBuf, cause: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn unavailable(location: &Path, cause: impl Into<String>) -> Self {
        Error::IndexUnavailable { location: location.to_path_buf(), cause: cause.into() }
    }

    pub(crate) fn corrupt(location: &Path, cause: impl Into<String>) -> Self {
        Error::CorruptIndex { location: location.to_path_buf(), cause: cause.into() }
    }
}
