//! Repository discovery, initialization and configuration.
//!
//! A repository is an ordinary directory (the worktree) containing a
//! `.hoard` metadata directory. [`Repository::init`] lays out the
//! metadata directory, [`Repository::discover`] finds the enclosing
//! repository from any path inside the worktree.

pub mod config;
pub mod error;
pub mod repo;

pub use config::{Config, CoreConfig};
pub use error::{RepoError, RepoResult};
pub use repo::Repository;
