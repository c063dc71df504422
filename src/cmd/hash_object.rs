use super::{ObjectKind, Repository, Result};
use crate::GitObject;
use std::fs;

pub(crate) fn run(path: String, kind: ObjectKind, write: bool) -> Result<()> {
    let data = fs::read(path)?;
    let obj = GitObject::from_payload(kind, &data)?;

    let hash = if write {
        Repository::find(".")?.objects().write(&obj)?
    } else {
        obj.hash()
    };
    println!("{hash}");
    Ok(())
}
