use super::{ObjectKind, Repository, Result};
use crate::tree::list_tree;

pub fn run(repo: &Repository, tree: &str, recursive: bool) -> Result<()> {
    let hash = repo.resolver().resolve_typed(tree, ObjectKind::Tree)?;
    for row in list_tree(repo.objects(), hash, recursive)? {
        println!(
            "{} {} {}\t{}",
            row.mode.padded(),
            row.kind,
            row.hash,
            row.path.display()
        );
    }
    Ok(())
}
