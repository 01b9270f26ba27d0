//! Commit objects and the author/committer signature format.

use std::fmt;

use hoard_kvlm::{FieldValue, Kvlm};
use hoard_types::ObjectId;

use crate::error::{ObjectError, ObjectResult};

/// Author or committer identity: `name <email> timestamp timezone`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Free text, no angle brackets.
    pub name: String,
    /// Free text, no angle brackets.
    pub email: String,
    /// Seconds since the Unix epoch.
    pub when: i64,
    /// Timezone offset as written, e.g. `+0100`.
    pub tz: String,
}

impl Signature {
    /// Parse a signature line.
    ///
    /// The last token is the timezone, the second-to-last the integer
    /// timestamp; everything before them is `name <email>`. Fewer than
    /// four space-delimited tokens, a non-integer timestamp, or missing
    /// angle brackets are fatal.
    pub fn parse(raw: &[u8]) -> ObjectResult<Self> {
        let text = std::str::from_utf8(raw).map_err(|_| ObjectError::MalformedSignature {
            reason: "not valid UTF-8".into(),
        })?;

        let tokens: Vec<&str> = text.split(' ').collect();
        if tokens.len() < 4 {
            return Err(ObjectError::MalformedSignature {
                reason: format!("expected at least 4 tokens, got {}", tokens.len()),
            });
        }

        let tz = tokens[tokens.len() - 1].to_string();
        let when: i64 = tokens[tokens.len() - 2].parse().map_err(|_| {
            ObjectError::MalformedSignature {
                reason: format!("timestamp {:?} is not an integer", tokens[tokens.len() - 2]),
            }
        })?;

        let who = tokens[..tokens.len() - 2].join(" ");
        let open = who.find('<').ok_or_else(|| ObjectError::MalformedSignature {
            reason: "missing '<' before email".into(),
        })?;
        let close = who.find('>').ok_or_else(|| ObjectError::MalformedSignature {
            reason: "missing '>' after email".into(),
        })?;
        if close < open {
            return Err(ObjectError::MalformedSignature {
                reason: "'>' precedes '<'".into(),
            });
        }

        Ok(Self {
            name: who[..open].trim().to_string(),
            email: who[open + 1..close].to_string(),
            when,
            tz,
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} {}", self.name, self.email, self.when, self.tz)
    }
}

/// Decoded commit metadata.
///
/// The original KVLM form is retained alongside the typed view, so
/// serialization reproduces the payload byte for byte, unknown fields
/// (signatures, extension headers) included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    kvlm: Kvlm,
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    /// Decode a commit payload, validating the mandatory fields.
    pub fn from_payload(payload: &[u8]) -> ObjectResult<Self> {
        Self::from_kvlm(Kvlm::parse(payload))
    }

    /// Derive the typed record from a decoded KVLM map.
    ///
    /// `tree`, `author`, `committer` and the message are mandatory;
    /// `parent` may be absent (root commit), single, or accumulated
    /// (merge).
    pub fn from_kvlm(kvlm: Kvlm) -> ObjectResult<Self> {
        let tree = required_id(&kvlm, "tree")?;

        let parents = match kvlm.get(b"parent") {
            None => Vec::new(),
            Some(value) => value
                .values()
                .map(|v| parse_id("parent", v))
                .collect::<ObjectResult<Vec<_>>>()?,
        };

        let author = Signature::parse(required(&kvlm, "author")?)?;
        let committer = Signature::parse(required(&kvlm, "committer")?)?;

        let message = kvlm
            .message()
            .ok_or(ObjectError::MissingRequiredField("message"))?;
        let message = String::from_utf8_lossy(message).into_owned();

        Ok(Self {
            kvlm,
            tree,
            parents,
            author,
            committer,
            message,
        })
    }

    /// Encode back to the KVLM byte form.
    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }

    /// The root tree of this commit.
    pub fn tree(&self) -> ObjectId {
        self.tree
    }

    /// Parent commits: empty for a root commit, more than one for a
    /// merge.
    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying KVLM map, unknown fields included.
    pub fn kvlm(&self) -> &Kvlm {
        &self.kvlm
    }
}

fn required<'a>(kvlm: &'a Kvlm, field: &'static str) -> ObjectResult<&'a [u8]> {
    kvlm.get(field.as_bytes())
        .map(FieldValue::first)
        .ok_or(ObjectError::MissingRequiredField(field))
}

fn parse_id(field: &'static str, raw: &[u8]) -> ObjectResult<ObjectId> {
    let text = std::str::from_utf8(raw).map_err(|_| ObjectError::InvalidObjectId {
        field,
        source: hoard_types::TypeError::InvalidHex("not valid UTF-8".into()),
    })?;
    ObjectId::from_hex(text).map_err(|source| ObjectError::InvalidObjectId { field, source })
}

fn required_id(kvlm: &Kvlm, field: &'static str) -> ObjectResult<ObjectId> {
    parse_id(field, required(kvlm, field)?)
}
