//! Binary staging-index (version 2) reader.
//!
//! Layout: a 12-byte header (`DIRC` signature, big-endian version and
//! entry count) followed by entries sorted by name. Each entry carries
//! filesystem metadata, the staged object id and a flags word, then the
//! NUL-terminated name, padded with NULs so the next entry starts on an
//! 8-byte boundary.

use std::fs;
use std::path::Path;

use hoard_types::{ObjectId, ID_LEN};
use tracing::debug;

use crate::error::{IndexError, IndexResult};

const SIGNATURE: &[u8; 4] = b"DIRC";
const SUPPORTED_VERSION: u32 = 2;

/// Fixed-size portion of an entry, up to and including the flags word.
const ENTRY_FIXED_LEN: usize = 62;

/// Name lengths at or above this sentinel are not stored in the flags
/// word and must be recovered by scanning for the NUL terminator.
const NAME_LEN_MASK: u16 = 0x0FFF;

/// File type nibble from the mode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Regular,
    Symlink,
    Gitlink,
}

impl EntryType {
    fn from_mode(mode: u32) -> IndexResult<Self> {
        match mode >> 12 {
            0b1000 => Ok(Self::Regular),
            0b1010 => Ok(Self::Symlink),
            0b1110 => Ok(Self::Gitlink),
            other => Err(IndexError::MalformedEntry(format!(
                "unknown file type nibble {other:#b}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular file",
            Self::Symlink => "symlink",
            Self::Gitlink => "git link",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Creation time as (seconds, nanoseconds).
    pub ctime: (u32, u32),
    /// Modification time as (seconds, nanoseconds).
    pub mtime: (u32, u32),
    pub dev: u32,
    pub ino: u32,
    pub entry_type: EntryType,
    /// Permission bits, meaningful for regular files only.
    pub perms: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub id: ObjectId,
    pub assume_valid: bool,
    pub stage: u8,
    pub name: String,
}

/// Parsed staging index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}

impl Index {
    /// Reads and parses the index file at `path`.
    pub fn read(path: impl AsRef<Path>) -> IndexResult<Self> {
        let raw = fs::read(path)?;
        Self::parse(&raw)
    }

    /// Parses an in-memory index image.
    pub fn parse(raw: &[u8]) -> IndexResult<Self> {
        let mut cur = Cursor::new(raw);

        let signature: [u8; 4] = cur
            .take(4, "signature")?
            .try_into()
            .unwrap_or([0; 4]);
        if &signature != SIGNATURE {
            return Err(IndexError::BadSignature(signature));
        }
        let version = cur.read_u32("version")?;
        if version != SUPPORTED_VERSION {
            return Err(IndexError::UnsupportedVersion(version));
        }
        let count = cur.read_u32("entry count")?;
        debug!(version, count, "parsing staging index");

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(parse_entry(&mut cur)?);
        }
        Ok(Self { version, entries })
    }
}

fn parse_entry(cur: &mut Cursor<'_>) -> IndexResult<IndexEntry> {
    let start = cur.pos;

    let ctime = (cur.read_u32("ctime seconds")?, cur.read_u32("ctime nanos")?);
    let mtime = (cur.read_u32("mtime seconds")?, cur.read_u32("mtime nanos")?);
    let dev = cur.read_u32("device")?;
    let ino = cur.read_u32("inode")?;
    let mode = cur.read_u32("mode")?;
    let entry_type = EntryType::from_mode(mode)?;
    let perms = mode & 0o777;
    let uid = cur.read_u32("uid")?;
    let gid = cur.read_u32("gid")?;
    let size = cur.read_u32("size")?;

    let mut hash = [0u8; ID_LEN];
    hash.copy_from_slice(cur.take(ID_LEN, "object id")?);
    let id = ObjectId::from_raw(hash);

    let flags = cur.read_u16("flags")?;
    let assume_valid = flags & 0x8000 != 0;
    if flags & 0x4000 != 0 {
        return Err(IndexError::MalformedEntry(
            "extended flag set in a version 2 index".into(),
        ));
    }
    let stage = ((flags >> 12) & 0b11) as u8;
    let stored_len = flags & NAME_LEN_MASK;

    let name_bytes = if stored_len < NAME_LEN_MASK {
        cur.take(stored_len as usize, "entry name")?
    } else {
        cur.take_until_nul("entry name")?
    };
    let name = String::from_utf8(name_bytes.to_vec())
        .map_err(|_| IndexError::MalformedEntry("entry name is not valid UTF-8".into()))?;

    // Entries are NUL-padded so the next begins on an 8-byte boundary,
    // with at least one NUL terminating the name.
    let consumed = cur.pos - start;
    let padded = (consumed / 8 + 1) * 8;
    cur.take(padded - consumed, "entry padding")?;

    Ok(IndexEntry {
        ctime,
        mtime,
        dev,
        ino,
        entry_type,
        perms,
        uid,
        gid,
        size,
        id,
        assume_valid,
        stage,
        name,
    })
}

struct Cursor<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &'static str) -> IndexResult<&'a [u8]> {
        let remaining = self.raw.len() - self.pos;
        if remaining < len {
            return Err(IndexError::Truncated {
                what,
                needed: len - remaining,
            });
        }
        let out = &self.raw[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn take_until_nul(&mut self, what: &'static str) -> IndexResult<&'a [u8]> {
        let rest = &self.raw[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(IndexError::Truncated { what, needed: 1 })?;
        self.pos += end;
        Ok(&rest[..end])
    }

    fn read_u32(&mut self, what: &'static str) -> IndexResult<u32> {
        let bytes: [u8; 4] = self.take(4, what)?.try_into().unwrap_or([0; 4]);
        Ok(u32::from_be_bytes(bytes))
    }

    fn read_u16(&mut self, what: &'static str) -> IndexResult<u16> {
        let bytes: [u8; 2] = self.take(2, what)?.try_into().unwrap_or([0; 2]);
        Ok(u16::from_be_bytes(bytes))
    }
}
