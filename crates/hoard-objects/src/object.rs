use crate::commit::Commit;
use crate::error::ObjectResult;
use crate::kind::ObjectKind;
use crate::tag::Tag;
use crate::tree::Tree;

/// Raw content object. Serialize and deserialize are the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The blob's content.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// One loadable/storable unit: the sum over the four object kinds.
///
/// The payload format of each variant is determined solely by its kind
/// tag; matching on `Object` is exhaustive, so a new kind cannot be
/// added without every dispatch site being revisited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Commit(Commit),
    Tree(Tree),
    Tag(Tag),
}

impl Object {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Encode the payload bytes (header not included).
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data().to_vec(),
            Self::Commit(commit) => commit.serialize(),
            Self::Tree(tree) => tree.serialize(),
            Self::Tag(tag) => tag.serialize(),
        }
    }

    /// Decode a payload according to the given kind tag.
    pub fn deserialize(kind: ObjectKind, payload: &[u8]) -> ObjectResult<Self> {
        match kind {
            ObjectKind::Blob => Ok(Self::Blob(Blob::new(payload.to_vec()))),
            ObjectKind::Commit => Ok(Self::Commit(Commit::from_payload(payload)?)),
            ObjectKind::Tree => Ok(Self::Tree(Tree::from_payload(payload)?)),
            ObjectKind::Tag => Ok(Self::Tag(Tag::from_payload(payload)?)),
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Tag> for Object {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}
