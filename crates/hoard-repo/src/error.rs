use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0:?} is not inside a repository")]
    NotARepository(PathBuf),

    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("metadata directory {0:?} already exists and is not empty")]
    NotEmpty(PathBuf),

    #[error("unsupported repository format version {0}, expected 0")]
    UnsupportedFormatVersion(u32),

    #[error("failed to parse configuration: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    EncodeConfig(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
