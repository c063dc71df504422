use super::{Repository, Result};
use crate::{git_object::Signature, refs::flatten};

pub(crate) fn run(
    repo: &Repository,
    name: Option<String>,
    object: &str,
    message: Option<String>,
) -> Result<()> {
    let Some(name) = name else {
        let tags = repo.refs().list("refs/tags")?;
        for (tag, _) in flatten("", &tags) {
            println!("{}", tag.trim_start_matches('/'));
        }
        return Ok(());
    };

    let tagger = Signature::from_env();
    let annotation = message.as_deref().map(|message| (&tagger, message));
    let path = repo.create_tag(&name, object, annotation)?;
    println!("{}", path.display());
    Ok(())
}
