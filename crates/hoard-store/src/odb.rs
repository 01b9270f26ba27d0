//! The loose-object database.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use hoard_objects::{Object, ObjectKind};
use hoard_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Object database rooted at an `objects/` directory.
///
/// Reads and writes are idempotent: the id of an object is a pure
/// function of its framed content, and writing the same object twice
/// lands on the same fan-out path.
#[derive(Clone, Debug)]
pub struct Odb {
    root: PathBuf,
}

impl Odb {
    /// Open the database at its root directory. The directory is only
    /// touched when an object is persisted or read.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `objects/` directory this store operates on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hash an object and, when `persist` is set, compress and write it
    /// at its fan-out path. The id is returned either way: computing a
    /// hash never requires persistence.
    pub fn write(&self, object: &Object, persist: bool) -> StoreResult<ObjectId> {
        let framed = frame(object.kind(), &object.serialize());
        let id = ObjectId::hash_bytes(&framed);

        if persist {
            let dir = self.root.join(id.fanout_dir());
            fs::create_dir_all(&dir)?;
            let path = dir.join(id.fanout_file());

            let file = fs::File::create(&path)?;
            let mut encoder = ZlibEncoder::new(file, Compression::default());
            encoder.write_all(&framed)?;
            encoder.finish()?;
            debug!(id = %id, kind = %object.kind(), path = %path.display(), "wrote object");
        }

        Ok(id)
    }

    /// Read an object back: decompress, validate the header, and
    /// dispatch to the kind's decoder.
    pub fn read(&self, id: &ObjectId) -> StoreResult<Object> {
        let path = self.object_path(id);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id));
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::new();
        ZlibDecoder::new(file).read_to_end(&mut content)?;

        let (kind, payload) = parse_frame(&content)?;
        debug!(id = %id, kind = %kind, "read object");
        Ok(Object::deserialize(kind, payload)?)
    }

    /// Returns `true` if an object with this id has been persisted.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Hash a file's content as an object of the given kind,
    /// optionally persisting it (the `hash-object` path).
    pub fn hash_file(
        &self,
        path: &Path,
        kind: ObjectKind,
        persist: bool,
    ) -> StoreResult<ObjectId> {
        let data = fs::read(path)?;
        let object = Object::deserialize(kind, &data)?;
        self.write(&object, persist)
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.fanout_dir()).join(id.fanout_file())
    }
}

/// Prepend the `<kind> <len>\0` header.
fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut framed = format!("{} {}\0", kind, payload.len()).into_bytes();
    framed.extend_from_slice(payload);
    framed
}

/// Split framed content into its kind tag and payload, validating the
/// header fields and the declared length.
fn parse_frame(content: &[u8]) -> StoreResult<(ObjectKind, &[u8])> {
    let nul = content
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| StoreError::InvalidObjectHeader {
            reason: "no NUL separator".into(),
        })?;

    let header =
        std::str::from_utf8(&content[..nul]).map_err(|_| StoreError::InvalidObjectHeader {
            reason: "header is not valid UTF-8".into(),
        })?;

    let (kind_name, size_text) =
        header
            .split_once(' ')
            .ok_or_else(|| StoreError::InvalidObjectHeader {
                reason: format!("expected '<type> <size>', got {header:?}"),
            })?;

    let kind = ObjectKind::from_str(kind_name)?;

    let expected: usize =
        size_text
            .parse()
            .map_err(|_| StoreError::InvalidObjectHeader {
                reason: format!("size {size_text:?} is not a decimal integer"),
            })?;

    let payload = &content[nul + 1..];
    if payload.len() != expected {
        return Err(StoreError::ObjectSizeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    Ok((kind, payload))
}
