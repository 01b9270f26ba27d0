//! Tag objects, lightweight and annotated.

use hoard_kvlm::Kvlm;

use crate::error::ObjectResult;
use crate::kind::ObjectKind;

/// A named pointer at another object.
///
/// A lightweight tag carries only a name and a target; an annotated tag
/// is a stored object of its own, with a target type, a tagger line, a
/// creation timestamp, and a message. A tag is annotated iff its `type`
/// field names the commit kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    kvlm: Kvlm,
    /// Tag name (e.g. `v1.0.0`).
    pub name: String,
    /// Hex id of the referenced object.
    pub target: String,
    /// Kind name of the referenced object; set only on annotated tags.
    pub target_type: Option<String>,
    /// Tagger line, stored verbatim (`name <email> timestamp timezone`).
    pub tagger: Option<String>,
    /// Creation time in seconds since the epoch, extracted from the
    /// tagger line.
    pub when: Option<i64>,
    /// Tag message; set only on annotated tags.
    pub message: Option<String>,
}

impl Tag {
    /// Create a lightweight tag: name and target only.
    pub fn lightweight(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Create an annotated tag pointing at a commit, stamped with the
    /// current time in the `+0000` zone.
    pub fn annotated(
        name: impl Into<String>,
        target: impl Into<String>,
        tagger: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut tag = Self {
            name: name.into(),
            target: target.into(),
            target_type: Some(ObjectKind::Commit.as_str().to_string()),
            tagger: Some(tagger.into()),
            when: Some(chrono::Utc::now().timestamp()),
            message: Some(message.into()),
            ..Self::default()
        };
        tag.kvlm = tag.to_kvlm();
        tag
    }

    /// Returns `true` if this tag carries annotation metadata.
    pub fn is_annotated(&self) -> bool {
        self.target_type.as_deref() == Some(ObjectKind::Commit.as_str())
    }

    /// Decode a tag payload.
    pub fn from_payload(payload: &[u8]) -> ObjectResult<Self> {
        Ok(Self::from_kvlm(Kvlm::parse(payload)))
    }

    /// Derive the typed view from a decoded KVLM map.
    ///
    /// All fields are optional here: a sparse map simply yields a
    /// lightweight tag. The tagger line is kept verbatim; only its
    /// trailing timestamp (second-to-last token) is parsed out.
    pub fn from_kvlm(kvlm: Kvlm) -> Self {
        let text = |key: &[u8]| {
            kvlm.first(key)
                .map(|v| String::from_utf8_lossy(v).into_owned())
        };

        let tagger = text(b"tagger");
        let when = tagger.as_deref().and_then(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            tokens[tokens.len() - 2].parse().ok()
        });

        Self {
            name: text(b"tag").unwrap_or_default(),
            target: text(b"object").unwrap_or_default(),
            target_type: text(b"type"),
            message: text(b""),
            tagger,
            when,
            kvlm,
        }
    }

    /// The KVLM form of an annotated tag.
    ///
    /// A lightweight tag has no stored object form, so this is empty
    /// for one.
    pub fn to_kvlm(&self) -> Kvlm {
        let mut kvlm = Kvlm::new();
        if self.is_annotated() {
            kvlm.set("object", self.target.clone().into_bytes());
            kvlm.set("type", ObjectKind::Commit.as_str().into());
            kvlm.set("tag", self.name.clone().into_bytes());
            kvlm.set(
                "tagger",
                format!(
                    "{} {} +0000",
                    self.tagger.as_deref().unwrap_or_default(),
                    self.when.unwrap_or_default()
                )
                .into_bytes(),
            );
            kvlm.set_message(
                self.message
                    .clone()
                    .unwrap_or_default()
                    .into_bytes(),
            );
        }
        kvlm
    }

    /// Encode back to the KVLM byte form.
    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_constructor_populates_all_fields() {
        let tag = Tag::annotated("v1.0.0", "abc123", "John Doe <john@example.com>", "Release");
        assert!(tag.is_annotated());
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.target, "abc123");
        assert_eq!(tag.target_type.as_deref(), Some("commit"));
        assert_eq!(tag.tagger.as_deref(), Some("John Doe <john@example.com>"));
        assert!(tag.when.is_some());
        assert_eq!(tag.message.as_deref(), Some("Release"));
    }

    #[test]
    fn lightweight_tag_is_not_annotated() {
        let tag = Tag::lightweight("v0.1", "abc123");
        assert!(!tag.is_annotated());
        assert!(tag.tagger.is_none());
        assert!(tag.message.is_none());
    }

    #[test]
    fn to_kvlm_of_annotated_tag() {
        let mut tag = Tag::annotated("v1.0.0", "abc123", "John Doe <john@example.com>", "Release");
        tag.when = Some(1623456789);
        let kvlm = tag.to_kvlm();
        assert_eq!(kvlm.first(b"object"), Some(b"abc123".as_slice()));
        assert_eq!(kvlm.first(b"type"), Some(b"commit".as_slice()));
        assert_eq!(kvlm.first(b"tag"), Some(b"v1.0.0".as_slice()));
        assert_eq!(
            kvlm.first(b"tagger"),
            Some(b"John Doe <john@example.com> 1623456789 +0000".as_slice())
        );
        assert_eq!(kvlm.message(), Some(b"Release".as_slice()));
    }

    #[test]
    fn to_kvlm_of_lightweight_tag_is_empty() {
        let tag = Tag::lightweight("v0.1", "abc123");
        assert!(tag.to_kvlm().keys().next().is_none());
    }

    #[test]
    fn from_payload_parses_annotated_tag() {
        let payload: &[u8] = b"object abc123\ntype commit\ntag v1.0.0\n\
            tagger John Doe <john@example.com> 1623456789 +0000\n\nRelease v1\n";
        let tag = Tag::from_payload(payload).unwrap();
        assert!(tag.is_annotated());
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.target, "abc123");
        assert_eq!(tag.when, Some(1623456789));
        assert_eq!(tag.message.as_deref(), Some("Release v1"));
        assert_eq!(tag.serialize(), payload);
    }

    #[test]
    fn from_kvlm_without_type_is_lightweight() {
        let mut kvlm = Kvlm::new();
        kvlm.set("object", b"abc123".to_vec());
        let tag = Tag::from_kvlm(kvlm);
        assert!(!tag.is_annotated());
        assert_eq!(tag.target, "abc123");
    }
}
