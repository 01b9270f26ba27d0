//! Directory snapshots: the binary tree-entry codec.
//!
//! Each entry is laid out as `<mode><SP><path><NUL><20 raw hash bytes>`
//! with no separators between entries. Mode text is 5 or 6 ASCII
//! digits; the canonical sort emits a file before a same-named
//! directory.

use hoard_types::{ObjectId, ID_LEN};

use crate::error::{ObjectError, ObjectResult};
use crate::kind::ObjectKind;

/// One directory entry: mode, name, and target id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    mode: String,
    path: String,
    id: ObjectId,
}

impl TreeEntry {
    /// Create an entry. The mode must be 5 or 6 ASCII digits; the path
    /// is a single name, no slashes.
    pub fn new(
        mode: impl Into<String>,
        path: impl Into<String>,
        id: ObjectId,
    ) -> ObjectResult<Self> {
        let mode = mode.into();
        if mode.len() != 5 && mode.len() != 6 {
            return Err(ObjectError::MalformedTreeEntry {
                reason: format!("mode {mode:?} is not 5 or 6 characters"),
            });
        }
        Ok(Self {
            mode,
            path: path.into(),
            id,
        })
    }

    /// The mode text exactly as parsed or constructed (5 or 6 digits).
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The 6-character canonical mode, zero-padded: `40000` becomes
    /// `040000`. Used for display and uniform type classification.
    pub fn canonical_mode(&self) -> String {
        format!("{:0>6}", self.mode)
    }

    /// The entry name.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The referenced object's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Classify the referenced object from the mode's type prefix:
    /// `10` regular file (blob), `04` directory (tree), `16` gitlink
    /// (commit), `12` symbolic link (stored as blob content).
    pub fn kind(&self) -> ObjectResult<ObjectKind> {
        match &self.canonical_mode()[..2] {
            "10" => Ok(ObjectKind::Blob),
            "04" => Ok(ObjectKind::Tree),
            "16" => Ok(ObjectKind::Commit),
            "12" => Ok(ObjectKind::Blob),
            other => Err(ObjectError::UnknownObjectType(other.to_string())),
        }
    }

    /// Sort key for canonical emission: a file sorts by its bare path,
    /// everything else by `path + "/"`, so a file precedes a same-named
    /// directory.
    fn sort_key(&self) -> String {
        if self.mode.starts_with("10") {
            self.path.clone()
        } else {
            format!("{}/", self.path)
        }
    }
}

/// A directory snapshot: an ordered list of [`TreeEntry`] values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree from entries. Order is normalized at serialize
    /// time, not here: parsed payloads keep their on-disk order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// The entries, in stored order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Decode a binary tree payload.
    pub fn from_payload(raw: &[u8]) -> ObjectResult<Self> {
        let mut entries = Vec::new();
        let mut start = 0;
        while start < raw.len() {
            let (next, entry) = parse_entry(raw, start)?;
            entries.push(entry);
            start = next;
        }
        Ok(Self { entries })
    }

    /// Encode to the binary form, entries in canonical sort order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut ordered: Vec<&TreeEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| e.sort_key());

        let mut out = Vec::new();
        for entry in ordered {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.path.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        out
    }
}

/// Parse one entry starting at `start`; returns the offset just past
/// it.
fn parse_entry(raw: &[u8], start: usize) -> ObjectResult<(usize, TreeEntry)> {
    let space = raw[start..]
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::MalformedTreeEntry {
            reason: "missing space after mode".into(),
        })?;
    if space != 5 && space != 6 {
        return Err(ObjectError::MalformedTreeEntry {
            reason: format!("mode length {space} is not 5 or 6"),
        });
    }
    let mode = String::from_utf8_lossy(&raw[start..start + space]).into_owned();

    let path_start = start + space + 1;
    let nul = raw[path_start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::MalformedTreeEntry {
            reason: "missing NUL terminator after path".into(),
        })?;
    let path = String::from_utf8_lossy(&raw[path_start..path_start + nul]).into_owned();

    let hash_start = path_start + nul + 1;
    if raw.len() < hash_start + ID_LEN {
        return Err(ObjectError::MalformedTreeEntry {
            reason: format!(
                "expected {ID_LEN} hash bytes, found {}",
                raw.len() - hash_start
            ),
        });
    }
    let mut digest = [0u8; ID_LEN];
    digest.copy_from_slice(&raw[hash_start..hash_start + ID_LEN]);
    let id = ObjectId::from_raw(digest);

    Ok((hash_start + ID_LEN, TreeEntry { mode, path, id }))
}
