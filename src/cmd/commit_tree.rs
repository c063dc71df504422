use super::{ObjectKind, Repository, Result};
use crate::git_object::{Commit, GitObject, Signature};

pub fn run(repo: &Repository, tree: &str, parents: &[String], message: &str) -> Result<()> {
    let resolver = repo.resolver();
    let tree = resolver.resolve_typed(tree, ObjectKind::Tree)?;
    let parents = parents
        .iter()
        .map(|parent| resolver.resolve_typed(parent, ObjectKind::Commit))
        .collect::<Result<Vec<_>>>()?;

    let mut message = message.to_string();
    if !message.ends_with('\n') {
        message.push('\n');
    }

    let commit = Commit::new(tree, &parents, &Signature::from_env(), &message);
    let hash = repo.objects().write(&GitObject::from(commit))?;
    println!("{hash}");
    Ok(())
}
