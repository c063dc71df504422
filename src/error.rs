use super::{git_object::ObjectKind, hash::Sha1Hash};
use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("ERR - Io: {0}")]
    Io(#[from] io::Error),

    #[error("ERR - Not a git repository (or any parent up to the root): {0}")]
    NotARepository(PathBuf),

    #[error("ERR - Config file missing: {0}")]
    ConfigMissing(PathBuf),

    #[error("ERR - Unsupported repositoryformatversion: {0}")]
    ConfigVersionUnsupported(String),

    #[error("ERR - Invalid config: {0}")]
    InvalidConfig(String),

    #[error("ERR - Object not found: {0}")]
    ObjectNotFound(String),

    #[error("ERR - Corrupt object: {0}")]
    CorruptObject(String),

    #[error("ERR - Unknown object kind: {0}")]
    UnknownObjectKind(String),

    #[error("ERR - Invalid hash: {0}")]
    InvalidHash(String),

    #[error("ERR - Invalid reference: {0}")]
    InvalidReference(String),

    #[error("ERR - Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("ERR - Ambiguous reference {name}: candidates are {}", hex_list(.candidates))]
    AmbiguousReference {
        name: String,
        candidates: Vec<Sha1Hash>,
    },

    #[error("ERR - Symbolic reference cycle: {}", .0.join(" -> "))]
    ReferenceCycle(Vec<String>),

    #[error("ERR - {name} is a {found}, cannot peel it to a {wanted}")]
    TypeMismatch {
        name: String,
        wanted: ObjectKind,
        found: ObjectKind,
    },

    #[error("ERR - Destination is not empty: {0}")]
    DestinationNotEmpty(PathBuf),

    #[error("ERR - Destination is not a directory: {0}")]
    DestinationNotADirectory(PathBuf),

    #[error("ERR - Checkout failed at {path}: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("ERR - Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("ERR - Other: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptObject(msg.into())
    }

    /// Tags a failure during checkout with the path being written.
    pub(crate) fn materialize<E: Into<Error>>(path: impl Into<PathBuf>) -> impl FnOnce(E) -> Self {
        let path = path.into();
        move |source| Self::Materialize {
            path,
            source: Box::new(source.into()),
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Self::Other(anyhow::anyhow!("{value}"))
    }
}

fn hex_list(hashes: &[Sha1Hash]) -> String {
    hashes
        .iter()
        .map(Sha1Hash::hex)
        .collect::<Vec<_>>()
        .join(", ")
}
