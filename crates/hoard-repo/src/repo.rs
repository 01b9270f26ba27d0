//! Repository on disk: a worktree with a `.hoard` metadata directory
//! holding objects, references, the staging index and configuration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{RepoError, RepoResult};

pub const META_DIR_NAME: &str = ".hoard";
pub const HEAD_FILE: &str = "HEAD";
pub const CONFIG_FILE: &str = "config";
pub const DESCRIPTION_FILE: &str = "description";

const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";
const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

#[derive(Debug, Clone)]
pub struct Repository {
    worktree: PathBuf,
    meta_dir: PathBuf,
    config: Config,
}

impl Repository {
    /// Opens the repository whose worktree is `path`, validating its
    /// configuration.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = path.as_ref().to_path_buf();
        let meta_dir = worktree.join(META_DIR_NAME);
        if !meta_dir.is_dir() {
            return Err(RepoError::NotARepository(worktree));
        }

        let config_path = meta_dir.join(CONFIG_FILE);
        let config = Config::load(&config_path)?;
        config.validate()?;

        Ok(Self {
            worktree,
            meta_dir,
            config,
        })
    }

    /// Creates a fresh repository at `path`, building the worktree if
    /// it does not exist yet. Fails if a non-empty metadata directory
    /// is already present.
    pub fn init(path: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = path.as_ref().to_path_buf();
        let meta_dir = worktree.join(META_DIR_NAME);

        if meta_dir.exists() {
            if !worktree.is_dir() {
                return Err(RepoError::NotADirectory(worktree));
            }
            if fs::read_dir(&meta_dir)?.next().is_some() {
                return Err(RepoError::NotEmpty(meta_dir));
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        for dirs in [
            &["branches"][..],
            &["objects"],
            &["refs", "tags"],
            &["refs", "heads"],
        ] {
            let mut path = meta_dir.clone();
            path.extend(dirs);
            fs::create_dir_all(&path)?;
        }

        fs::write(meta_dir.join(DESCRIPTION_FILE), DEFAULT_DESCRIPTION)?;
        fs::write(meta_dir.join(HEAD_FILE), DEFAULT_HEAD)?;

        let config = Config::default();
        config.save(meta_dir.join(CONFIG_FILE))?;

        info!(worktree = %worktree.display(), "initialized empty repository");
        Ok(Self {
            worktree,
            meta_dir,
            config,
        })
    }

    /// Walks up from `start` until a directory containing the metadata
    /// directory is found.
    pub fn discover(start: impl AsRef<Path>) -> RepoResult<Self> {
        let start = start.as_ref().canonicalize()?;
        let mut current = start.as_path();
        loop {
            if current.join(META_DIR_NAME).is_dir() {
                debug!(root = %current.display(), "found repository");
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(RepoError::NotARepository(start)),
            }
        }
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of a file under the metadata directory.
    pub fn meta_path(&self, segments: &[&str]) -> PathBuf {
        let mut path = self.meta_dir.clone();
        path.extend(segments);
        path
    }

    /// Like [`meta_path`](Self::meta_path) but creates the directory
    /// chain first.
    pub fn ensure_meta_dir(&self, segments: &[&str]) -> RepoResult<PathBuf> {
        let path = self.meta_path(segments);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.meta_dir.join("objects")
    }

    pub fn index_path(&self) -> PathBuf {
        self.meta_dir.join("index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let meta = repo.meta_dir();
        assert!(meta.join("branches").is_dir());
        assert!(meta.join("objects").is_dir());
        assert!(meta.join("refs/tags").is_dir());
        assert!(meta.join("refs/heads").is_dir());

        let head = fs::read_to_string(meta.join("HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/master\n");
        assert!(meta.join("description").is_file());
        assert!(meta.join("config").is_file());
    }

    #[test]
    fn init_builds_missing_worktree() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/repo");
        let repo = Repository::init(&nested).unwrap();
        assert_eq!(repo.worktree(), nested.as_path());
    }

    #[test]
    fn init_refuses_non_empty_meta_dir() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        assert!(matches!(
            Repository::init(dir.path()),
            Err(RepoError::NotEmpty(_))
        ));
    }

    #[test]
    fn open_round_trips_config() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.config(), &Config::default());
    }

    #[test]
    fn open_rejects_plain_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::NotARepository(_))
        ));
    }

    #[test]
    fn open_rejects_future_format_version() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(
            repo.meta_path(&["config"]),
            "[core]\nrepository_format_version = 9\n",
        )
        .unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::UnsupportedFormatVersion(9))
        ));
    }

    #[test]
    fn discover_walks_up_from_nested_dir() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("src/deep/module");
        fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(
            repo.worktree().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn discover_fails_outside_any_repository() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::discover(dir.path()),
            Err(RepoError::NotARepository(_))
        ));
    }

    #[test]
    fn meta_path_and_ensure() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let path = repo.ensure_meta_dir(&["refs", "remotes"]).unwrap();
        assert!(path.is_dir());
        assert_eq!(path, repo.meta_path(&["refs", "remotes"]));
    }
}
