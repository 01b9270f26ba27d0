//! Insertion-ordered maps and the KVLM ("key-value-list-with-message")
//! codec used by commit and tag payloads.
//!
//! A KVLM payload is a block of `key value` lines (values may continue
//! across physical lines, each continuation prefixed by one space),
//! terminated by a blank line, followed by a free-text message. Field
//! order is significant and a key may repeat — a merge commit carries
//! one `parent` line per parent — so the in-memory form is an
//! insertion-ordered multimap, not a hash map.
//!
//! # Modules
//!
//! - [`ordered`] — [`OrderedMap`], the generic insertion-ordered map
//! - [`kvlm`] — [`Kvlm`], [`FieldValue`], and the byte codec

pub mod kvlm;
pub mod ordered;

pub use kvlm::{FieldValue, Kvlm};
pub use ordered::OrderedMap;
