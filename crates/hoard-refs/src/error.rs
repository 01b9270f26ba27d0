use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefError {
    /// A chain of symbolic references revisited a name it already
    /// followed, so resolution can never terminate.
    #[error("cyclic reference chain through {0:?}")]
    CyclicReference(String),

    #[error("reference name {0:?} escapes the metadata directory")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type RefResult<T> = Result<T, RefError>;
