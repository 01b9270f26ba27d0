use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("bad index signature {0:?}, expected \"DIRC\"")]
    BadSignature([u8; 4]),

    #[error("unsupported index version {0}, only version 2 is readable")]
    UnsupportedVersion(u32),

    #[error("index truncated: needed {needed} more bytes for {what}")]
    Truncated { what: &'static str, needed: usize },

    #[error("malformed index entry: {0}")]
    MalformedEntry(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
