use super::{Error, Kvlm, Result, Sha1Hash};
use bytes::Bytes;
use std::env;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_NAME: &str = "tinygit";
const DEFAULT_EMAIL: &str = "tinygit@localhost";

/// `Name <email> <unix-seconds> <offset>` line used by `author`, `committer`
/// and `tagger` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    email: String,
    timestamp: u64,
}

impl Signature {
    pub fn new(name: &str, email: &str, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp,
        }
    }

    /// Identity from `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`, stamped now.
    pub fn from_env() -> Self {
        let name = env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| DEFAULT_NAME.into());
        let email = env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.into());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new(&name, &email, now)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} +0000", self.name, self.email, self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit(Kvlm);

impl Commit {
    pub fn new(tree: Sha1Hash, parents: &[Sha1Hash], author: &Signature, message: &str) -> Self {
        let mut kvlm = Kvlm::new().with("tree", tree.hex());
        for parent in parents {
            kvlm.push("parent", parent.hex());
        }
        kvlm.push("author", author.to_string());
        kvlm.push("committer", author.to_string());
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

    pub fn tree(&self) -> Result<Sha1Hash> {
        let value = self
            .0
            .get("tree")
            .ok_or_else(|| Error::corrupt("commit: missing tree header"))?;
        header_hash(value)
    }

    pub fn parents(&self) -> Result<Vec<Sha1Hash>> {
        self.0.get_all("parent").map(header_hash).collect()
    }

    pub fn message(&self) -> &Bytes {
        self.0.message()
    }

    /// First line of the message, trimmed.
    pub fn summary(&self) -> String {
        let message = String::from_utf8_lossy(self.message());
        message.trim().lines().next().unwrap_or_default().to_string()
    }
}

pub(super) fn header_hash(value: &Bytes) -> Result<Sha1Hash> {
    let hex = std::str::from_utf8(value)
        .map_err(|err| Error::corrupt(format!("header is not a hex hash. {err}")))?;
    Sha1Hash::from_hex(hex.trim()).map_err(|err| Error::corrupt(err.to_string()))
}
