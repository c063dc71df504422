use super::{Repository, Result};

pub(crate) fn run(path: String) -> Result<()> {
    let repo = Repository::init(&path)?;
    println!(
        "Initialized empty repository in {}",
        repo.git_dir().display()
    );
    Ok(())
}
