use super::{Repository, Result};

pub(crate) fn run(repo: &Repository, name: &str, revision: &str) -> Result<()> {
    let hash = repo.resolver().resolve(revision)?;
    let path = repo.refs().update(name, hash)?;
    println!("{}", path.display());
    Ok(())
}
