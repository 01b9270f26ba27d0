//! Reference database: files under the metadata directory whose content
//! is either an object hash or a `ref: <name>` indirection to another
//! reference.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use hoard_kvlm::OrderedMap;
use tracing::debug;

use crate::error::{RefError, RefResult};

/// Prefix marking a symbolic reference that points at another reference
/// rather than directly at an object.
const SYMREF_PREFIX: &str = "ref: ";

/// One node in a listed reference namespace: a resolved hash for a
/// plain file, or a nested tree for a directory such as `refs/heads`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    /// Resolved hash. Empty when the file exists but its chain ends at
    /// a name with no backing file.
    Hash(String),
    Nested(RefTree),
}

/// Name-ordered map of reference names to their nodes.
pub type RefTree = OrderedMap<String, RefNode>;

/// Reference store rooted at a repository metadata directory.
#[derive(Debug, Clone)]
pub struct RefDb {
    meta_dir: PathBuf,
}

impl RefDb {
    pub fn new(meta_dir: impl Into<PathBuf>) -> Self {
        Self {
            meta_dir: meta_dir.into(),
        }
    }

    pub fn meta_dir(&self) -> &std::path::Path {
        &self.meta_dir
    }

    /// Resolves `name` (relative to the metadata directory, e.g. `HEAD`
    /// or `refs/heads/master`) to an object hash, following symbolic
    /// indirections. A missing file yields `Ok(None)`.
    pub fn resolve(&self, name: &str) -> RefResult<Option<String>> {
        let mut visited = HashSet::new();
        self.resolve_inner(name, &mut visited)
    }

    fn resolve_inner(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> RefResult<Option<String>> {
        check_name(name)?;
        if !visited.insert(name.to_owned()) {
            return Err(RefError::CyclicReference(name.to_owned()));
        }
        let path = self.meta_dir.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        let mut text = String::from_utf8_lossy(&raw).into_owned();
        // Reference files carry exactly one trailing newline.
        if text.ends_with('\n') {
            text.pop();
        }
        match text.strip_prefix(SYMREF_PREFIX) {
            Some(target) => {
                debug!(name, target, "following symbolic reference");
                self.resolve_inner(target, visited)
            }
            None => Ok(Some(text)),
        }
    }

    /// Lists the `refs` namespace as a nested, name-sorted tree with
    /// every leaf fully resolved.
    pub fn list(&self) -> RefResult<RefTree> {
        self.list_at("refs")
    }

    /// Lists an arbitrary subtree of the reference namespace.
    pub fn list_at(&self, name: &str) -> RefResult<RefTree> {
        check_name(name)?;
        let dir = self.meta_dir.join(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            entries.push((file_name, entry.file_type()?.is_dir()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut tree = RefTree::new();
        for (file_name, is_dir) in entries {
            let child = format!("{name}/{file_name}");
            let node = if is_dir {
                RefNode::Nested(self.list_at(&child)?)
            } else {
                RefNode::Hash(self.resolve(&child)?.unwrap_or_default())
            };
            tree.insert(file_name, node);
        }
        Ok(tree)
    }

    /// Creates `refs/<name>` pointing directly at `id`, creating any
    /// intermediate namespace directories.
    pub fn create(&self, name: &str, id: &str) -> RefResult<()> {
        check_name(name)?;
        let path = self.meta_dir.join("refs").join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{id}\n"))?;
        debug!(name, id, "created reference");
        Ok(())
    }
}

/// Rejects names that would escape the metadata directory.
fn check_name(name: &str) -> RefResult<()> {
    let escapes = name.is_empty()
        || name.starts_with('/')
        || name.split('/').any(|part| part == "..");
    if escapes {
        return Err(RefError::InvalidName(name.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HASH_A: &str = "9daeafb9864cf43055ae93beb0afd6c7d144bfa4";
    const HASH_B: &str = "af5626b4a114abcb82d63db7c8082c3c4756e51b";

    fn write_ref(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn resolves_direct_hash() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "refs/heads/master", &format!("{HASH_A}\n"));
        let refs = RefDb::new(dir.path());
        assert_eq!(
            refs.resolve("refs/heads/master").unwrap(),
            Some(HASH_A.to_owned())
        );
    }

    #[test]
    fn follows_symbolic_chain() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "HEAD", "ref: refs/heads/master\n");
        write_ref(&dir, "refs/heads/master", &format!("{HASH_A}\n"));
        let refs = RefDb::new(dir.path());
        assert_eq!(refs.resolve("HEAD").unwrap(), Some(HASH_A.to_owned()));
    }

    #[test]
    fn missing_reference_is_none() {
        let dir = TempDir::new().unwrap();
        let refs = RefDb::new(dir.path());
        assert_eq!(refs.resolve("refs/heads/gone").unwrap(), None);
    }

    #[test]
    fn dangling_symbolic_reference_is_none() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "HEAD", "ref: refs/heads/unborn\n");
        let refs = RefDb::new(dir.path());
        assert_eq!(refs.resolve("HEAD").unwrap(), None);
    }

    #[test]
    fn strips_only_one_trailing_newline() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "refs/heads/master", &format!("{HASH_A}\n\n"));
        let refs = RefDb::new(dir.path());
        assert_eq!(
            refs.resolve("refs/heads/master").unwrap(),
            Some(format!("{HASH_A}\n"))
        );
    }

    #[test]
    fn detects_cycle() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "refs/a", "ref: refs/b\n");
        write_ref(&dir, "refs/b", "ref: refs/a\n");
        let refs = RefDb::new(dir.path());
        match refs.resolve("refs/a") {
            Err(RefError::CyclicReference(name)) => assert_eq!(name, "refs/a"),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn detects_self_cycle() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "refs/me", "ref: refs/me\n");
        let refs = RefDb::new(dir.path());
        assert!(matches!(
            refs.resolve("refs/me"),
            Err(RefError::CyclicReference(_))
        ));
    }

    #[test]
    fn rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let refs = RefDb::new(dir.path());
        assert!(matches!(
            refs.resolve("../outside"),
            Err(RefError::InvalidName(_))
        ));
        assert!(matches!(
            refs.create("../outside", HASH_A),
            Err(RefError::InvalidName(_))
        ));
    }

    #[test]
    fn lists_nested_tree_sorted() {
        let dir = TempDir::new().unwrap();
        write_ref(&dir, "refs/heads/master", &format!("{HASH_A}\n"));
        write_ref(&dir, "refs/heads/dev", &format!("{HASH_B}\n"));
        write_ref(&dir, "refs/tags/v1", "ref: refs/heads/master\n");
        let refs = RefDb::new(dir.path());

        let tree = refs.list().unwrap();
        let names: Vec<_> = tree.keys().collect();
        assert_eq!(names, ["heads", "tags"]);

        let heads = match tree.get("heads").unwrap() {
            RefNode::Nested(t) => t,
            other => panic!("expected nested node, got {other:?}"),
        };
        let head_names: Vec<_> = heads.keys().collect();
        assert_eq!(head_names, ["dev", "master"]);
        assert_eq!(
            heads.get("master").unwrap(),
            &RefNode::Hash(HASH_A.to_owned())
        );

        // Symbolic leaves come back fully resolved.
        let tags = match tree.get("tags").unwrap() {
            RefNode::Nested(t) => t,
            other => panic!("expected nested node, got {other:?}"),
        };
        assert_eq!(tags.get("v1").unwrap(), &RefNode::Hash(HASH_A.to_owned()));
    }

    #[test]
    fn create_writes_hash_and_newline() {
        let dir = TempDir::new().unwrap();
        let refs = RefDb::new(dir.path());
        refs.create("tags/v1", HASH_A).unwrap();
        let raw = fs::read_to_string(dir.path().join("refs/tags/v1")).unwrap();
        assert_eq!(raw, format!("{HASH_A}\n"));
        assert_eq!(refs.resolve("refs/tags/v1").unwrap(), Some(HASH_A.to_owned()));
    }
}
