//! Read-only access to the binary staging index.

pub mod error;
pub mod index;

pub use error::{IndexError, IndexResult};
pub use index::{EntryType, Index, IndexEntry};
