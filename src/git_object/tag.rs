use super::{commit::header_hash, Error, Kvlm, ObjectKind, Result, Sha1Hash, Signature};
use bytes::Bytes;

/// Annotated tag object. Lightweight tags are plain references and never
/// reach the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag(Kvlm);

impl Tag {
    pub fn new(
        target: Sha1Hash,
        kind: ObjectKind,
        name: &str,
        tagger: &Signature,
        message: &str,
    ) -> Self {
        let mut kvlm = Kvlm::new()
            .with("object", target.hex())
            .with("type", kind.as_str())
            .with("tag", name.to_string())
            .with("tagger", tagger.to_string());
        kvlm.set_message(message.to_string());
        Self(kvlm)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Kvlm::parse(bytes).map(Self)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.0.serialize()
    }

    pub fn kvlm(&self) -> &Kvlm {
        &self.0
    }

    /// Hash of the tagged object.
    pub fn object(&self) -> Result<Sha1Hash> {
        let value = self
            .0
            .get("object")
            .ok_or_else(|| Error::corrupt("tag: missing object header"))?;
        header_hash(value)
    }

    pub fn name(&self) -> Option<String> {
        self.0
            .get("tag")
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    pub fn message(&self) -> &Bytes {
        self.0.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_points_at_its_target() {
        let target = Sha1Hash::from([9u8; 20]);
        let tagger = Signature::new("Ada", "ada@example.com", 42);
        let tag = Tag::new(target, ObjectKind::Commit, "v1.0", &tagger, "release\n");

        assert_eq!(tag.object().unwrap(), target);
        assert_eq!(tag.name().as_deref(), Some("v1.0"));

        let reparsed = Tag::parse(&tag.serialize()).unwrap();
        assert_eq!(reparsed, tag);
        assert!(String::from_utf8(tag.serialize())
            .unwrap()
            .starts_with(&format!("object {target}\ntype commit\ntag v1.0\ntagger Ada")));
    }
}
