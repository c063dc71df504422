use super::{ObjectKind, Repository, Result};
use std::io::{self, Write};

pub(crate) fn run(repo: &Repository, object: &str, kind: Option<ObjectKind>) -> Result<()> {
    let resolver = repo.resolver();
    let hash = match kind {
        Some(kind) => resolver.resolve_typed(object, kind)?,
        None => resolver.resolve(object)?,
    };
    let obj = repo.objects().read(&hash)?;
    io::stdout().write_all(&obj.serialize())?;
    Ok(())
}
