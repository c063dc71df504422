use super::{Repository, Result};
use crate::refs::flatten;

pub(crate) fn run(repo: &Repository) -> Result<()> {
    let refs = repo.refs().list("refs")?;
    for (name, hash) in flatten("refs", &refs) {
        println!("{hash} {name}");
    }
    Ok(())
}
