//! The key-value-list-with-message multimap and its byte codec.

use crate::ordered::OrderedMap;

/// Key used to store the trailing free-text message.
pub const MESSAGE_KEY: &[u8] = b"";

/// The value slot of a KVLM field.
///
/// A key that appears once holds a `Single` byte-string; a repeated key
/// (e.g. `parent` on a merge commit) accumulates into `Multiple`, in
/// the order the values were appended. The two cases are explicit so
/// every consumer handles both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Single(Vec<u8>),
    Multiple(Vec<Vec<u8>>),
}

impl FieldValue {
    /// All values in append order.
    pub fn values(&self) -> impl Iterator<Item = &[u8]> {
        let slice: &[Vec<u8>] = match self {
            FieldValue::Single(v) => std::slice::from_ref(v),
            FieldValue::Multiple(vs) => vs,
        };
        slice.iter().map(Vec::as_slice)
    }

    /// The first value.
    pub fn first(&self) -> &[u8] {
        match self {
            FieldValue::Single(v) => v,
            // Multiple is only ever built from a promoted Single, so it
            // holds at least two values.
            FieldValue::Multiple(vs) => &vs[0],
        }
    }
}

/// An ordered multimap of byte-string fields plus a free-text message.
///
/// This is the decoded form of a commit or tag payload. Keys are raw
/// bytes, same as values, so a payload with a non-UTF-8 key still
/// re-serializes byte for byte. Field order is preserved exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    fields: OrderedMap<Vec<u8>, FieldValue>,
}

impl Kvlm {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`, accumulating on repeat.
    ///
    /// A new key is inserted at the end of the order as a `Single`; an
    /// existing `Single` is promoted to a two-element `Multiple`; an
    /// existing `Multiple` grows by one.
    pub fn append(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        let key = key.into();
        if !self.fields.contains_key(key.as_slice()) {
            self.fields.insert(key, FieldValue::Single(value));
            return;
        }
        if let Some(slot) = self.fields.get_mut(key.as_slice()) {
            match slot {
                FieldValue::Single(existing) => {
                    let first = std::mem::take(existing);
                    *slot = FieldValue::Multiple(vec![first, value]);
                }
                FieldValue::Multiple(vs) => vs.push(value),
            }
        }
    }

    /// Replace the value under `key` with a `Single`, discarding any
    /// accumulated values.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.fields.insert(key, FieldValue::Single(value));
    }

    /// Look up a field by key.
    pub fn get(&self, key: &[u8]) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The first value under `key`, if present.
    pub fn first(&self, key: &[u8]) -> Option<&[u8]> {
        self.fields.get(key).map(FieldValue::first)
    }

    /// Remove a field, dropping the key from the order record.
    pub fn remove(&mut self, key: &[u8]) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// The free-text message, if present.
    pub fn message(&self) -> Option<&[u8]> {
        self.first(MESSAGE_KEY)
    }

    /// Set the free-text message.
    pub fn set_message(&mut self, message: Vec<u8>) {
        self.set(MESSAGE_KEY, message);
    }

    /// Keys in insertion order (the message key included, if set).
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.fields.keys().map(Vec::as_slice)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// Decode a raw KVLM payload.
    ///
    /// The parser is position-based and total: any byte sequence decodes
    /// to some map, including truncated input without a trailing
    /// newline. At each step it finds the next space and newline; a
    /// blank line (or a line with no space) ends the field block, and
    /// the rest of the buffer is the message. A value runs until the
    /// first newline not followed by a space; each `\n ` continuation
    /// collapses to `\n`.
    pub fn parse(raw: &[u8]) -> Self {
        let mut kvlm = Kvlm::new();
        let mut start = 0;

        while start < raw.len() {
            let spc = find_byte(raw, b' ', start);
            let nl = find_byte(raw, b'\n', start);

            // Message case: a newline before any space. Everything one
            // byte past that newline is the message. With no newline
            // left at all, there is nothing more to take.
            let spc = match (spc, nl) {
                (Some(s), Some(n)) if s < n => s,
                (Some(s), None) => s,
                (_, Some(n)) => {
                    let mut message = raw[n + 1..].to_vec();
                    if message.last() == Some(&b'\n') {
                        message.pop();
                    }
                    kvlm.set_message(message);
                    return kvlm;
                }
                (None, None) => return kvlm,
            };
            let key = raw[start..spc].to_vec();

            // The value ends at the first newline not followed by a
            // continuation space.
            let mut cursor = spc;
            let value_end = loop {
                match find_byte(raw, b'\n', cursor + 1) {
                    None => break raw.len(),
                    Some(n) => {
                        if n + 1 >= raw.len() || raw[n + 1] != b' ' {
                            break n;
                        }
                        cursor = n;
                    }
                }
            };

            let value = strip_continuations(&raw[spc + 1..value_end]);
            kvlm.append(key, value);

            start = value_end + 1;
        }

        kvlm
    }

    /// Encode back to the byte format.
    ///
    /// Fields are emitted in insertion order, one line per accumulated
    /// value, with `\n ` re-inserted before each internal value line.
    /// A present message is emitted after one blank line with a single
    /// trailing newline, the exact inverse of [`Kvlm::parse`].
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for (key, value) in self.iter() {
            if key == MESSAGE_KEY {
                continue;
            }
            for v in value.values() {
                write_field(&mut out, key, v);
            }
        }

        if let Some(message) = self.message() {
            out.push(b'\n');
            out.extend_from_slice(message);
            out.push(b'\n');
        }

        out
    }
}

fn find_byte(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn strip_continuations(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        out.push(raw[i]);
        if raw[i] == b'\n' && raw.get(i + 1) == Some(&b' ') {
            i += 1; // drop exactly one leading space
        }
        i += 1;
    }
    out
}

fn write_field(out: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    out.extend_from_slice(key);
    out.push(b' ');
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
    out.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(s: &str) -> FieldValue {
        FieldValue::Single(s.as_bytes().to_vec())
    }

    #[test]
    fn serialize_empty_map() {
        assert_eq!(Kvlm::new().serialize(), b"");
    }

    #[test]
    fn serialize_single_field() {
        let mut kvlm = Kvlm::new();
        kvlm.append("key1", b"value1".to_vec());
        assert_eq!(kvlm.serialize(), b"key1 value1\n");
    }

    #[test]
    fn serialize_multiple_fields_in_order() {
        let mut kvlm = Kvlm::new();
        kvlm.append("key1", b"value1".to_vec());
        kvlm.append("key2", b"value2".to_vec());
        assert_eq!(kvlm.serialize(), b"key1 value1\nkey2 value2\n");
    }

    #[test]
    fn serialize_multiline_value() {
        let mut kvlm = Kvlm::new();
        kvlm.append("key1", b"line1\nline2".to_vec());
        assert_eq!(kvlm.serialize(), b"key1 line1\n line2\n");
    }

    #[test]
    fn serialize_with_message() {
        let mut kvlm = Kvlm::new();
        kvlm.append("key1", b"value1".to_vec());
        kvlm.set_message(b"This is a message".to_vec());
        assert_eq!(kvlm.serialize(), b"key1 value1\n\nThis is a message\n");
    }

    #[test]
    fn serialize_repeated_key_emits_one_line_per_value() {
        let mut kvlm = Kvlm::new();
        kvlm.append("key1", b"value1".to_vec());
        kvlm.append("key1", b"value2".to_vec());
        assert_eq!(kvlm.serialize(), b"key1 value1\nkey1 value2\n");
    }

    #[test]
    fn parse_empty_input() {
        assert_eq!(Kvlm::parse(b""), Kvlm::new());
    }

    #[test]
    fn parse_single_field() {
        let kvlm = Kvlm::parse(b"key1 value1\n");
        assert_eq!(kvlm.get(b"key1"), Some(&single("value1")));
        assert_eq!(kvlm.message(), None);
    }

    #[test]
    fn parse_continuation_lines() {
        let kvlm = Kvlm::parse(b"key1 line1\n line2\n line3\n");
        assert_eq!(kvlm.get(b"key1"), Some(&single("line1\nline2\nline3")));
    }

    #[test]
    fn parse_message_after_blank_line() {
        let kvlm = Kvlm::parse(b"tree abc\n\nCommit message\n");
        assert_eq!(kvlm.first(b"tree"), Some(b"abc".as_slice()));
        assert_eq!(kvlm.message(), Some(b"Commit message".as_slice()));
    }

    #[test]
    fn parse_truncated_value_without_trailing_newline() {
        let kvlm = Kvlm::parse(b"key1 value1");
        assert_eq!(kvlm.get(b"key1"), Some(&single("value1")));
    }

    #[test]
    fn non_utf8_key_roundtrips_byte_exact() {
        let raw: &[u8] = b"k\xffy value\nplain other\n";
        let kvlm = Kvlm::parse(raw);
        assert_eq!(kvlm.first(b"k\xffy"), Some(b"value".as_slice()));
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn duplicate_key_accumulates_in_order() {
        let mut kvlm = Kvlm::new();
        kvlm.append("parent", b"a".to_vec());
        kvlm.append("parent", b"b".to_vec());
        kvlm.append("parent", b"c".to_vec());
        assert_eq!(
            kvlm.get(b"parent"),
            Some(&FieldValue::Multiple(vec![
                b"a".to_vec(),
                b"b".to_vec(),
                b"c".to_vec()
            ]))
        );
        assert_eq!(kvlm.serialize(), b"parent a\nparent b\nparent c\n");
    }

    #[test]
    fn parse_merge_commit_accumulates_parents() {
        let raw = b"tree t\nparent p1\nparent p2\nauthor a\n\nmerge\n";
        let kvlm = Kvlm::parse(raw);
        assert_eq!(
            kvlm.get(b"parent"),
            Some(&FieldValue::Multiple(vec![b"p1".to_vec(), b"p2".to_vec()]))
        );
        let keys: Vec<&[u8]> = kvlm.keys().collect();
        assert_eq!(
            keys,
            vec![
                b"tree".as_slice(),
                b"parent".as_slice(),
                b"author".as_slice(),
                b"".as_slice()
            ]
        );
    }

    #[test]
    fn realistic_payload_reserializes_byte_exact() {
        let raw: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
            parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
            author John Doe <john@example.com> 1623456789 +0100\n\
            committer Jane Smith <jane@example.com> 1623456790 +0100\n\
            gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEE\n -----END PGP SIGNATURE-----\n\
            \nImplement new feature\n";
        let kvlm = Kvlm::parse(raw);
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn remove_drops_field() {
        let mut kvlm = Kvlm::new();
        kvlm.append("a", b"1".to_vec());
        kvlm.append("b", b"2".to_vec());
        kvlm.remove(b"a");
        assert_eq!(kvlm.serialize(), b"b 2\n");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn field_key() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9-]{0,9}"
        }

        fn field_value() -> impl Strategy<Value = Vec<u8>> {
            // Any bytes, newlines included: continuation handling must
            // cope with values that span lines.
            proptest::collection::vec(any::<u8>(), 0..32)
        }

        proptest! {
            #[test]
            fn roundtrip(
                fields in proptest::collection::vec((field_key(), field_value()), 0..8),
                message in proptest::option::of(field_value()),
            ) {
                let mut kvlm = Kvlm::new();
                for (k, v) in fields {
                    kvlm.append(k, v);
                }
                if let Some(m) = message {
                    kvlm.set_message(m);
                }
                let reparsed = Kvlm::parse(&kvlm.serialize());
                prop_assert_eq!(reparsed, kvlm);
            }
        }
    }
}
