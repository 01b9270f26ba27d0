use std::fmt;
use std::str::FromStr;

use crate::error::ObjectError;

/// The closed set of object kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Commit metadata in KVLM form.
    Commit,
    /// Directory snapshot in the binary tree format.
    Tree,
    /// Named pointer, lightweight or annotated, in KVLM form.
    Tag,
}

impl ObjectKind {
    /// The external name used in object headers and command output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "tag" => Ok(Self::Tag),
            other => Err(ObjectError::UnknownObjectType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(ObjectKind::Blob.to_string(), "blob");
        assert_eq!(ObjectKind::Commit.to_string(), "commit");
        assert_eq!(ObjectKind::Tree.to_string(), "tree");
        assert_eq!(ObjectKind::Tag.to_string(), "tag");
    }

    #[test]
    fn parse_roundtrip() {
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Commit,
            ObjectKind::Tree,
            ObjectKind::Tag,
        ] {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_name() {
        let err = "branch".parse::<ObjectKind>().unwrap_err();
        assert!(matches!(err, ObjectError::UnknownObjectType(name) if name == "branch"));
    }
}
