//! Loose-object storage for the hoard object store.
//!
//! Objects are framed as `<kind> <decimal length>\0<payload>`, hashed
//! with SHA-1 over the framed bytes, zlib-compressed, and persisted at
//! `objects/<first 2 hex chars>/<remaining 38>` under the repository
//! metadata directory.
//!
//! The store is a stateless codec over persisted bytes: it holds no
//! references to decoded objects, and every read re-validates the
//! header (type, declared length) against the decompressed payload.
//! A failed read returns no object.

pub mod error;
pub mod odb;

pub use error::{StoreError, StoreResult};
pub use odb::Odb;
