//! The closed object model of the hoard store.
//!
//! Four object kinds exist: [`Blob`] (opaque bytes), [`Commit`] and
//! [`Tag`] (KVLM payloads decoded into typed records), and [`Tree`]
//! (the binary directory-snapshot format). [`Object`] is the sum over
//! the four; dispatch is on the kind tag, so adding or auditing a kind
//! is exhaustive-checked at compile time.
//!
//! Every variant round-trips: `deserialize` then `serialize` reproduces
//! the payload byte for byte, unknown fields included.
//!
//! # Modules
//!
//! - [`error`] — [`ObjectError`], the decode/encode failure kinds
//! - [`kind`] — [`ObjectKind`], the closed type tag
//! - [`object`] — [`Object`] and [`Blob`]
//! - [`commit`] — [`Commit`] and [`Signature`]
//! - [`tag`] — [`Tag`], lightweight and annotated
//! - [`tree`] — [`Tree`], [`TreeEntry`], and the binary entry codec

pub mod commit;
pub mod error;
pub mod kind;
pub mod object;
pub mod tag;
pub mod tree;

pub use commit::{Commit, Signature};
pub use error::{ObjectError, ObjectResult};
pub use kind::ObjectKind;
pub use object::{Blob, Object};
pub use tag::Tag;
pub use tree::{Tree, TreeEntry};
