use super::{
    git_object::{GitObject, ObjectKind},
    refs::RefStore,
    store::ObjectStore,
    Error, Result, Sha1Hash,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static HASH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{4,40}$").expect("valid hash regex"));

/// Turns user-supplied revision names into object hashes.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    objects: &'a ObjectStore,
    refs: &'a RefStore,
}

impl<'a> Resolver<'a> {
    pub fn new(objects: &'a ObjectStore, refs: &'a RefStore) -> Self {
        Self { objects, refs }
    }

    /// Every hash `name` could mean: stored objects it prefixes, then the tag
    /// and the branch of that name. Duplicates are dropped.
    pub fn candidates(&self, name: &str) -> Result<Vec<Sha1Hash>> {
        let mut candidates = vec![];

        if name == "HEAD" {
            candidates.extend(self.refs.resolve("HEAD")?);
            return Ok(candidates);
        }

        if HASH_PREFIX.is_match(name) {
            candidates.extend(self.objects.find_by_prefix(&name.to_lowercase())?);
        }
        for namespace in ["refs/tags", "refs/heads"] {
            if let Some(hash) = self.refs.resolve(&format!("{namespace}/{name}"))? {
                if !candidates.contains(&hash) {
                    candidates.push(hash);
                }
            }
        }
        Ok(candidates)
    }

    /// Resolves `name` to exactly one hash.
    pub fn resolve(&self, name: &str) -> Result<Sha1Hash> {
        let mut candidates = self.candidates(name)?;
        match candidates.len() {
            0 => Err(Error::ReferenceNotFound(name.into())),
            1 => {
                let hash = candidates.remove(0);
                debug!(name, %hash, "resolved revision");
                Ok(hash)
            }
            _ => Err(Error::AmbiguousReference {
                name: name.into(),
                candidates,
            }),
        }
    }

    /// Resolves `name`, then peels tags (to their object) and commits (to
    /// their tree, only when a tree is wanted) until the object is a `wanted`.
    pub fn resolve_typed(&self, name: &str, wanted: ObjectKind) -> Result<Sha1Hash> {
        let mut hash = self.resolve(name)?;
        let mut seen = HashSet::new();

        loop {
            if !seen.insert(hash) {
                return Err(Error::corrupt(format!("{hash}: tag chain loops")));
            }
            let object = self.objects.read(&hash)?;
            if object.kind() == wanted {
                return Ok(hash);
            }

            hash = match (&object, wanted) {
                (GitObject::Tag(tag), _) => tag.object()?,
                (GitObject::Commit(commit), ObjectKind::Tree) => commit.tree()?,
                _ => {
                    return Err(Error::TypeMismatch {
                        name: name.into(),
                        wanted,
                        found: object.kind(),
                    })
                }
            };
            debug!(name, %hash, "peeled to");
        }
    }
}
