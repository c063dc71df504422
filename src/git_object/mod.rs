mod blob;
mod commit;
mod kvlm;
mod tag;
mod tree;

use super::{Error, Result, Sha1Hash, SHA1_HASH_SIZE};
use bytes::Bytes;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

pub use blob::Blob;
pub use commit::{Commit, Signature};
pub use kvlm::Kvlm;
pub use tag::Tag;
pub use tree::{
    Mode, Tree, TreeEntry, TreeRecords, MODE_DIR, MODE_EXEC, MODE_FILE, MODE_GITLINK, MODE_SYML,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
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
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            _ => Err(Error::UnknownObjectKind(s.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl GitObject {
    pub fn new_blob<R: Read>(mut content: R) -> Result<Self> {
        let mut buf = vec![];
        content.read_to_end(&mut buf)?;
        Ok(Self::Blob(Blob::from(buf)))
    }

    /// Decodes a bare payload (no frame) of the given kind.
    pub fn from_payload(kind: ObjectKind, payload: &[u8]) -> Result<Self> {
        let obj = match kind {
            ObjectKind::Blob => Self::Blob(Blob::from(Bytes::copy_from_slice(payload))),
            ObjectKind::Tree => Self::Tree(Tree::parse(payload)?),
            ObjectKind::Commit => Self::Commit(Commit::parse(payload)?),
            ObjectKind::Tag => Self::Tag(Tag::parse(payload)?),
        };
        Ok(obj)
    }

    /// Decodes a framed `"<kind> <len>\0<payload>"` buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (kind, payload) = unframe(data)?;
        Self::from_payload(kind, payload)
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Canonical payload bytes.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.serialize(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.serialize(),
            Self::Tag(tag) => tag.serialize(),
        }
    }

    /// Framed bytes; the input to both hashing and storage.
    pub fn encode(&self) -> Vec<u8> {
        frame(self.kind(), &self.serialize())
    }

    pub fn hash(&self) -> Sha1Hash {
        Sha1Hash::digest(&self.encode())
    }
}

impl From<Blob> for GitObject {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}

impl From<Tree> for GitObject {
    fn from(value: Tree) -> Self {
        Self::Tree(value)
    }
}

impl From<Commit> for GitObject {
    fn from(value: Commit) -> Self {
        Self::Commit(value)
    }
}

impl From<Tag> for GitObject {
    fn from(value: Tag) -> Self {
        Self::Tag(value)
    }
}

pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    [header.as_bytes(), payload].concat()
}

pub fn unframe(data: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let sp_pos = space_position(data).ok_or_else(|| Error::corrupt("frame: no kind separator"))?;
    let zero_pos = zero_position(&data[sp_pos..])
        .map(|p| p + sp_pos)
        .ok_or_else(|| Error::corrupt("frame: no \\0 after the header"))?;

    let kind = std::str::from_utf8(&data[..sp_pos])
        .ok()
        .and_then(|kind| kind.parse::<ObjectKind>().ok())
        .ok_or_else(|| {
            Error::corrupt(format!(
                "frame: unknown kind {:?}",
                String::from_utf8_lossy(&data[..sp_pos])
            ))
        })?;

    let size = std::str::from_utf8(&data[(sp_pos + 1)..zero_pos])
        .ok()
        .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|size| size.parse::<usize>().ok())
        .ok_or_else(|| Error::corrupt("frame: payload length is not a number"))?;

    let payload = &data[(zero_pos + 1)..];
    if payload.len() != size {
        return Err(Error::corrupt(format!(
            "frame: bad length, header says {size} but payload is {}",
            payload.len()
        )));
    }

    Ok((kind, payload))
}

impl fmt::Display for GitObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(blob) => fmt::Display::fmt(blob, f),
            Self::Tree(tree) => {
                for entry in tree.entries() {
                    writeln!(f, "{entry}")?;
                }
                Ok(())
            }
            Self::Commit(_) | Self::Tag(_) => {
                write!(f, "{}", String::from_utf8_lossy(&self.serialize()))
            }
        }
    }
}

type GetPosition = Box<dyn Fn(&[u8]) -> Option<usize>>;
fn position(byte: u8) -> GetPosition {
    Box::new(move |bytes: &[u8]| bytes.iter().position(|&b| b == byte))
}

fn zero_position(bytes: &[u8]) -> Option<usize> {
    position(b'\0')(bytes)
}

fn space_position(bytes: &[u8]) -> Option<usize> {
    position(b' ')(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_blob_git_object() {
        let bytes = b"blob 11\0hello world";
        let obj = GitObject::decode(bytes);
        assert_eq!(
            obj.unwrap(),
            GitObject::Blob(Blob::from(Bytes::from_static(b"hello world")))
        );
    }

    #[test]
    fn it_calculates_sha1_hash() {
        let bytes = b"blob 11\0hello world";
        let expected = Sha1Hash::digest(bytes);

        let obj = GitObject::decode(bytes).unwrap();
        assert_eq!(obj.hash(), expected);
        assert_eq!(obj.encode(), bytes);
    }

    #[test]
    fn it_rejects_bad_length() {
        assert!(matches!(
            GitObject::decode(b"blob 12\0hello world"),
            Err(Error::CorruptObject(_))
        ));
        assert!(matches!(
            GitObject::decode(b"blob x\0hello world"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_rejects_signed_or_empty_lengths() {
        for frame in [&b"blob +5\0hello"[..], &b"blob \x005"[..], &b"blob  5\0hello"[..]] {
            assert!(
                matches!(GitObject::decode(frame), Err(Error::CorruptObject(_))),
                "{:?} accepted",
                String::from_utf8_lossy(frame)
            );
        }
    }

    #[test]
    fn it_rejects_missing_separators() {
        assert!(matches!(
            GitObject::decode(b"blob11hello"),
            Err(Error::CorruptObject(_))
        ));
        assert!(matches!(
            GitObject::decode(b"blob 11hello world"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_rejects_unknown_kinds() {
        assert!(matches!(
            GitObject::decode(b"note 2\0hi"),
            Err(Error::CorruptObject(_))
        ));
        assert!(matches!(
            "note".parse::<ObjectKind>(),
            Err(Error::UnknownObjectKind(_))
        ));
    }

    #[test]
    fn it_dispatches_by_kind() {
        let commit = b"commit 15\0tree x\n\nmessage";
        let obj = GitObject::decode(commit).unwrap();
        assert_eq!(obj.kind(), ObjectKind::Commit);

        let tag = frame(ObjectKind::Tag, b"object y\n\n");
        assert_eq!(GitObject::decode(&tag).unwrap().kind(), ObjectKind::Tag);

        let tree = frame(ObjectKind::Tree, b"");
        assert_eq!(
            GitObject::decode(&tree).unwrap(),
            GitObject::Tree(Tree::default())
        );
    }
}
