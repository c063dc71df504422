use super::{
    config::Config,
    git_object::{GitObject, ObjectKind, Signature, Tag},
    refs::{RefStore, Reference},
    revision::Resolver,
    store::ObjectStore,
    Error, Result, GIT_DIR,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_HEAD: &str = "ref: refs/heads/main\n";
const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// An opened repository: worktree root, metadata directory and its config.
#[derive(Debug)]
pub struct Repository {
    worktree: PathBuf,
    git_dir: PathBuf,
    config: Config,
    objects: ObjectStore,
    refs: RefStore,
}

impl Repository {
    /// Creates an empty repository at `path`.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let git_dir = worktree.join(GIT_DIR);

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(Error::DestinationNotADirectory(worktree));
            }
            if git_dir.exists() && fs::read_dir(&git_dir)?.next().is_some() {
                return Err(Error::DestinationNotEmpty(git_dir));
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        for dir in ["branches", "objects", "refs/heads", "refs/tags"] {
            fs::create_dir_all(git_dir.join(dir))?;
        }
        fs::write(git_dir.join("description"), DESCRIPTION)?;
        fs::write(git_dir.join("HEAD"), DEFAULT_HEAD)?;

        let config = Config::default();
        fs::write(git_dir.join("config"), config.to_string())?;

        info!(path = %worktree.display(), "initialized empty repository");
        Ok(Self::assemble(worktree, git_dir, config))
    }

    /// Opens the repository whose worktree root is `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let git_dir = worktree.join(GIT_DIR);
        if !git_dir.is_dir() {
            return Err(Error::NotARepository(worktree));
        }
        let config = Config::load(git_dir.join("config"))?;
        Ok(Self::assemble(worktree, git_dir, config))
    }

    /// Opens the closest repository at or above `start`.
    pub fn find<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = fs::canonicalize(start.as_ref())?;
        let mut current = start.as_path();

        loop {
            if current.join(GIT_DIR).is_dir() {
                debug!(worktree = %current.display(), "found repository");
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(Error::NotARepository(start)),
            }
        }
    }

    fn assemble(worktree: PathBuf, git_dir: PathBuf, config: Config) -> Self {
        Self {
            objects: ObjectStore::new(git_dir.join("objects")),
            refs: RefStore::new(&git_dir),
            worktree,
            git_dir,
            config,
        }
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path under the metadata directory.
    pub fn path<I, S>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.git_dir.clone();
        path.extend(parts);
        path
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.objects, &self.refs)
    }

    /// Points `refs/tags/<name>` at `revision`. With a message, an annotated
    /// tag object is stored first and the reference points at it.
    pub fn create_tag(
        &self,
        name: &str,
        revision: &str,
        annotation: Option<(&Signature, &str)>,
    ) -> Result<PathBuf> {
        let target = self.resolver().resolve(revision)?;
        let ref_name = format!("refs/tags/{name}");

        let hash = match annotation {
            Some((tagger, message)) => {
                let kind = self.objects.read(&target)?.kind();
                let tag = Tag::new(target, kind, name, tagger, message);
                self.objects.write(&GitObject::from(tag))?
            }
            None => target,
        };

        self.refs.write(&ref_name, &Reference::Direct(hash))
    }

    /// Points `refs/heads/<name>` at `revision`.
    pub fn create_branch(&self, name: &str, revision: &str) -> Result<PathBuf> {
        let target = self.resolver().resolve_typed(revision, ObjectKind::Commit)?;
        self.refs
            .write(&format!("refs/heads/{name}"), &Reference::Direct(target))
    }
}
