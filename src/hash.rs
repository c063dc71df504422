use super::Error;
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

pub const SHA1_HASH_SIZE: usize = 20;
pub const SHA1_HEX_SIZE: usize = SHA1_HASH_SIZE * 2;

/// Object identity: the SHA-1 digest of an object's framed encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sha1Hash([u8; SHA1_HASH_SIZE]);

impl Sha1Hash {
    pub fn hasher() -> Sha1 {
        Sha1::new()
    }

    pub fn new(hasher: Sha1) -> Self {
        Self(hasher.finalize().into())
    }

    pub fn digest(bytes: &[u8]) -> Self {
        Self::new(Self::hasher().chain_update(bytes))
    }

    pub fn from_hex(value: &str) -> Result<Self, Error> {
        if value.len() != SHA1_HEX_SIZE {
            return Err(Error::InvalidHash(format!(
                "{value:?} must be {SHA1_HEX_SIZE} hex characters long"
            )));
        }
        let mut bytes = [0u8; SHA1_HASH_SIZE];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|err| Error::InvalidHash(format!("{value:?}: {err}")))?;
        Ok(Self(bytes))
    }

    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short(&self) -> String {
        self.hex()[..7].to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl FromStr for Sha1Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<&[u8]> for Sha1Hash {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; SHA1_HASH_SIZE] = bytes.try_into().map_err(|_| {
            Error::InvalidHash(format!(
                "raw digest must be {SHA1_HASH_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; SHA1_HASH_SIZE]> for Sha1Hash {
    fn from(value: [u8; SHA1_HASH_SIZE]) -> Self {
        Self(value)
    }
}
