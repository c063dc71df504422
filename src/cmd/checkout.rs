use super::{ObjectKind, Repository, Result};
use crate::tree::FileTree;

pub(crate) fn run(repo: &Repository, revision: &str, dir: String) -> Result<()> {
    let tree = repo.resolver().resolve_typed(revision, ObjectKind::Tree)?;
    FileTree::new(dir, repo.objects()).checkout(tree)
}
