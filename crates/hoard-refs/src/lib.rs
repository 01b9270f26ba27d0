//! Reference storage and resolution.
//!
//! References are small files under the repository metadata directory.
//! A file either names an object hash directly or starts with `ref: `
//! and names another reference, forming a chain that [`RefDb::resolve`]
//! follows to its terminal hash.

pub mod error;
pub mod refdb;

pub use error::{RefError, RefResult};
pub use refdb::{RefDb, RefNode, RefTree};
