use super::{
    git_object::{GitObject, ObjectKind},
    store::ObjectStore,
    Error, Result, Sha1Hash,
};
use std::collections::HashSet;

/// A visited commit and the parents it names, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEdge {
    pub commit: Sha1Hash,
    pub parents: Vec<Sha1Hash>,
}

/// Depth-first walk over `parent` links. Each commit is yielded once, so
/// converging histories do not revisit shared ancestors.
#[derive(Debug)]
pub struct History<'a> {
    store: &'a ObjectStore,
    stack: Vec<Sha1Hash>,
    seen: HashSet<Sha1Hash>,
}

impl<'a> History<'a> {
    pub fn new(store: &'a ObjectStore, start: Sha1Hash) -> Self {
        Self {
            store,
            stack: vec![start],
            seen: HashSet::new(),
        }
    }

    fn visit(&mut self, hash: Sha1Hash) -> Result<CommitEdge> {
        let parents = match self.store.read(&hash)? {
            GitObject::Commit(commit) => commit.parents()?,
            other => {
                return Err(Error::TypeMismatch {
                    name: hash.hex(),
                    wanted: ObjectKind::Commit,
                    found: other.kind(),
                })
            }
        };

        // first parent is explored first
        self.stack.extend(
            parents
                .iter()
                .rev()
                .filter(|parent| !self.seen.contains(*parent)),
        );

        Ok(CommitEdge {
            commit: hash,
            parents,
        })
    }
}

impl Iterator for History<'_> {
    type Item = Result<CommitEdge>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(hash) = self.stack.pop() {
            if !self.seen.insert(hash) {
                continue;
            }
            let edge = self.visit(hash);
            if edge.is_err() {
                self.stack.clear();
            }
            return Some(edge);
        }
        None
    }
}

/// Collects the whole ancestry of `start`.
pub fn walk(store: &ObjectStore, start: Sha1Hash) -> Result<Vec<CommitEdge>> {
    History::new(store, start).collect()
}
