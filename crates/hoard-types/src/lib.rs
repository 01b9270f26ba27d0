//! Core identifier types for the hoard object store.
//!
//! Everything persisted by hoard is addressed by the SHA-1 hash of its
//! framed content. [`ObjectId`] is that hash: 20 raw bytes, rendered as
//! 40 hex characters on disk and in command output.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, ID_LEN};
