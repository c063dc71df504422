use super::{
    git_object::{GitObject, Mode, ObjectKind, Tree},
    store::ObjectStore,
    Error, Result, Sha1Hash,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes a tree object out as files and directories under `root_dir`.
///
/// Fails before writing anything if `root_dir` is a file or a non-empty
/// directory. A failure halfway leaves whatever was already written.
#[derive(Debug)]
pub struct FileTree<'a> {
    root_dir: PathBuf,
    store: &'a ObjectStore,
}

impl<'a> FileTree<'a> {
    pub fn new<P: AsRef<Path>>(root_dir: P, store: &'a ObjectStore) -> Self {
        Self {
            root_dir: root_dir.as_ref().into(),
            store,
        }
    }

    pub fn checkout(self, tree: Sha1Hash) -> Result<()> {
        let tree = match self.store.read(&tree)? {
            GitObject::Tree(tree) => tree,
            other => {
                return Err(Error::TypeMismatch {
                    name: tree.hex(),
                    wanted: ObjectKind::Tree,
                    found: other.kind(),
                })
            }
        };

        prepare(&self.root_dir)?;
        self.write(&tree, &self.root_dir)
    }

    fn write(&self, tree: &Tree, dir: &Path) -> Result<()> {
        for entry in tree.entries() {
            let path = dir.join(checked_name(entry.name())?);

            // submodule commits live in another repository
            if entry.mode().kind()? == ObjectKind::Commit {
                warn!(path = %path.display(), hash = %entry.hash(), "skipping submodule entry");
                continue;
            }

            match self
                .store
                .read(&entry.hash())
                .map_err(Error::materialize(&path))?
            {
                GitObject::Tree(subtree) => {
                    fs::create_dir(&path).map_err(Error::materialize(&path))?;
                    self.write(&subtree, &path)?;
                }
                GitObject::Blob(blob) => {
                    fs::write(&path, &*blob).map_err(Error::materialize(&path))?;
                    debug!(path = %path.display(), size = blob.len(), "wrote file");
                }
                other => {
                    return Err(Error::materialize(&path)(Error::corrupt(format!(
                        "tree entry points at a {}",
                        other.kind()
                    ))))
                }
            }
        }
        Ok(())
    }
}

/// The destination must be absent (it is created) or an empty directory.
fn prepare(root_dir: &Path) -> Result<()> {
    if root_dir.exists() {
        if !root_dir.is_dir() {
            return Err(Error::DestinationNotADirectory(root_dir.into()));
        }
        if fs::read_dir(root_dir)?.next().is_some() {
            return Err(Error::DestinationNotEmpty(root_dir.into()));
        }
        Ok(())
    } else {
        fs::create_dir_all(root_dir).map_err(Error::materialize(root_dir))
    }
}

// a stored name must stay inside the directory it is written to
fn checked_name(name: &str) -> Result<&str> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::corrupt(format!("unsafe tree entry name {name:?}")));
    }
    Ok(name)
}

/// One row of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeListing {
    pub mode: Mode,
    pub kind: ObjectKind,
    pub hash: Sha1Hash,
    pub path: PathBuf,
}

/// Lists a tree's entries. With `recursive`, subtrees are descended into
/// instead of listed.
pub fn list_tree(store: &ObjectStore, tree: Sha1Hash, recursive: bool) -> Result<Vec<TreeListing>> {
    let mut rows = vec![];
    list_into(store, tree, Path::new(""), recursive, &mut rows)?;
    Ok(rows)
}

fn list_into(
    store: &ObjectStore,
    hash: Sha1Hash,
    prefix: &Path,
    recursive: bool,
    rows: &mut Vec<TreeListing>,
) -> Result<()> {
    let tree = match store.read(&hash)? {
        GitObject::Tree(tree) => tree,
        other => {
            return Err(Error::TypeMismatch {
                name: hash.hex(),
                wanted: ObjectKind::Tree,
                found: other.kind(),
            })
        }
    };

    for entry in tree.entries() {
        let kind = entry.mode().kind()?;
        let path = prefix.join(entry.name());
        if recursive && kind == ObjectKind::Tree {
            list_into(store, entry.hash(), &path, recursive, rows)?;
        } else {
            rows.push(TreeListing {
                mode: entry.mode().clone(),
                kind,
                hash: entry.hash(),
                path,
            });
        }
    }
    Ok(())
}
