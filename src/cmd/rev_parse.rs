use super::{ObjectKind, Repository, Result};

pub(crate) fn run(repo: &Repository, name: &str, kind: Option<ObjectKind>) -> Result<()> {
    let resolver = repo.resolver();
    let hash = match kind {
        Some(kind) => resolver.resolve_typed(name, kind)?,
        None => resolver.resolve(name)?,
    };
    println!("{hash}");
    Ok(())
}
