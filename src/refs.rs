//! References: `HEAD` and the files under `.git/refs`.
//!
//! A reference file holds either a hash (`<40 hex>\n`) or an indirection to
//! another reference (`ref: refs/heads/main\n`). Writes go through a temp
//! file and a rename; concurrent writers to one name race and the last
//! rename wins.

use super::{Error, Result, Sha1Hash};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

const SYMREF_PREFIX: &str = "ref: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Points at an object.
    Direct(Sha1Hash),
    /// Points at another reference, e.g. `HEAD -> refs/heads/main`.
    Symbolic(String),
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim_end();
        match s.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Ok(Self::Symbolic(target.trim().to_string())),
            None => Sha1Hash::from_hex(s)
                .map(Self::Direct)
                .map_err(|_| Error::InvalidReference(format!("unreadable reference {s:?}"))),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(hash) => writeln!(f, "{hash}"),
            Self::Symbolic(target) => writeln!(f, "{SYMREF_PREFIX}{target}"),
        }
    }
}

/// Node of a listed reference namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Hash(Sha1Hash),
    Namespace(RefTree),
}

pub type RefTree = BTreeMap<String, RefNode>;

#[derive(Debug, Clone)]
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn new<P: AsRef<Path>>(git_dir: P) -> Self {
        Self {
            git_dir: git_dir.as_ref().into(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// The raw reference, `None` when no such file exists. A namespace
    /// directory such as `refs/heads/feature` is not a reference either.
    pub fn read(&self, name: &str) -> Result<Option<Reference>> {
        let path = self.path(name);
        if path.is_dir() {
            return Ok(None);
        }
        match fs::read_to_string(path) {
            Ok(content) => content.parse().map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Follows indirections down to a hash. `None` for a missing reference or
    /// one that dangles, like `HEAD` before the first commit.
    pub fn resolve(&self, name: &str) -> Result<Option<Sha1Hash>> {
        let (_, hash) = self.follow(name)?;
        Ok(hash)
    }

    /// Last reference name in the chain starting at `name`, and the hash it
    /// holds if any.
    fn follow(&self, name: &str) -> Result<(String, Option<Sha1Hash>)> {
        let mut chain = vec![name.to_string()];
        let mut seen = HashSet::from([name.to_string()]);
        let mut current = name.to_string();

        loop {
            match self.read(&current)? {
                None => return Ok((current, None)),
                Some(Reference::Direct(hash)) => return Ok((current, Some(hash))),
                Some(Reference::Symbolic(target)) => {
                    chain.push(target.clone());
                    if !seen.insert(target.clone()) {
                        return Err(Error::ReferenceCycle(chain));
                    }
                    current = target;
                }
            }
        }
    }

    /// Writes `reference` under `name` and returns the file written.
    pub fn write(&self, name: &str, reference: &Reference) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.path(name);
        let dir = path
            .parent()
            .ok_or_else(|| Error::InvalidReference(name.into()))?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(reference.to_string().as_bytes())?;
        tmp.persist(&path).map_err(|err| Error::Io(err.error))?;

        debug!(name, target = %reference.to_string().trim_end(), "wrote reference");
        Ok(path)
    }

    /// Stores `hash` at the end of the chain starting at `name`, so updating
    /// `HEAD` moves the branch it points to.
    pub fn update(&self, name: &str, hash: Sha1Hash) -> Result<PathBuf> {
        let (target, _) = self.follow(name)?;
        self.write(&target, &Reference::Direct(hash))
    }

    /// Lists `namespace` (e.g. `refs`) recursively, sorted by name.
    pub fn list(&self, namespace: &str) -> Result<RefTree> {
        let mut tree = RefTree::new();
        let dir = self.path(namespace);
        if !dir.is_dir() {
            return Ok(tree);
        }

        let mut names: Vec<String> = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        names.sort();

        for name in names {
            // temp files and lock files
            if name.starts_with('.') || name.ends_with(".lock") {
                continue;
            }
            let full = format!("{namespace}/{name}");
            if self.path(&full).is_dir() {
                tree.insert(name, RefNode::Namespace(self.list(&full)?));
            } else if let Some(hash) = self.resolve(&full)? {
                tree.insert(name, RefNode::Hash(hash));
            }
        }
        Ok(tree)
    }
}

/// `(full name, hash)` pairs of a listed namespace, depth first.
pub fn flatten(prefix: &str, tree: &RefTree) -> Vec<(String, Sha1Hash)> {
    let mut out = vec![];
    for (name, node) in tree {
        let full = format!("{prefix}/{name}");
        match node {
            RefNode::Hash(hash) => out.push((full, *hash)),
            RefNode::Namespace(sub) => out.extend(flatten(&full, sub)),
        }
    }
    out
}

fn validate_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let valid = !name.is_empty()
        && !name.ends_with('/')
        && !name.ends_with(".lock")
        && path.components().all(|c| match c {
            Component::Normal(part) => !part.to_string_lossy().starts_with('.'),
            _ => false,
        });
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidReference(format!("illegal reference name {name:?}")))
    }
}
