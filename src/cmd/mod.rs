mod cat_file;
mod checkout;
mod commit_tree;
mod hash_object;
mod init;
mod log;
mod ls_tree;
mod rev_parse;
mod show_ref;
mod tag;
mod update_ref;

use super::{Args, Error, ObjectKind, Repository, Result};

#[derive(Debug, PartialEq)]
pub enum Command {
    Init {
        path: String,
    },
    CatFile {
        object: String,
        kind: Option<ObjectKind>,
    },
    HashObject {
        path: String,
        kind: ObjectKind,
        write: bool,
    },
    LsTree {
        tree: String,
        recursive: bool,
    },
    Checkout {
        revision: String,
        dir: String,
    },
    CommitTree {
        tree: String,
        parents: Vec<String>,
        message: String,
    },
    UpdateRef {
        name: String,
        revision: String,
    },
    Tag {
        name: Option<String>,
        object: String,
        message: Option<String>,
    },
    ShowRef,
    RevParse {
        name: String,
        kind: Option<ObjectKind>,
    },
    Log {
        revision: String,
    },
}

impl Command {
    pub fn new(args: &[String]) -> Result<Self> {
        let rest = args.get(1..).unwrap_or_default();
        let cmd = match args.first().map(|v| v.as_str()) {
            Some("init") => {
                let args = Args::builder().position(0, "path").build(rest)?;
                Self::Init {
                    path: args.value("path").unwrap_or_else(|| ".".into()),
                }
            }
            Some("cat-file") => {
                let args = Args::builder()
                    .position(0, "first")
                    .position(1, "second")
                    .build(rest)?;
                match (args.required("first")?, args.value("second")) {
                    (kind, Some(object)) => Self::CatFile {
                        object,
                        kind: Some(kind.parse()?),
                    },
                    (object, None) => Self::CatFile { object, kind: None },
                }
            }
            Some("hash-object") => {
                let args = Args::builder()
                    .flag("-w")
                    .arg("-t")
                    .position(0, "path")
                    .build(rest)?;
                Self::HashObject {
                    path: args.required("path")?,
                    kind: parse_kind(args.value("-t"))?.unwrap_or(ObjectKind::Blob),
                    write: args.flag("-w"),
                }
            }
            Some("ls-tree") => {
                let args = Args::builder()
                    .flag("-r")
                    .position(0, "tree")
                    .build(rest)?;
                Self::LsTree {
                    tree: args.required("tree")?,
                    recursive: args.flag("-r"),
                }
            }
            Some("checkout") => {
                let args = Args::builder()
                    .position(0, "revision")
                    .position(1, "dir")
                    .build(rest)?;
                Self::Checkout {
                    revision: args.required("revision")?,
                    dir: args.required("dir")?,
                }
            }
            Some("commit-tree") => {
                let args = Args::builder()
                    .multi("-p")
                    .arg("-m")
                    .position(0, "tree")
                    .build(rest)?;
                Self::CommitTree {
                    tree: args.required("tree")?,
                    parents: args.values("-p"),
                    message: args.required("-m")?,
                }
            }
            Some("update-ref") => {
                let args = Args::builder()
                    .position(0, "name")
                    .position(1, "revision")
                    .build(rest)?;
                Self::UpdateRef {
                    name: args.required("name")?,
                    revision: args.required("revision")?,
                }
            }
            Some("tag") => {
                let args = Args::builder()
                    .flag("-a")
                    .arg("-m")
                    .position(0, "name")
                    .position(1, "object")
                    .build(rest)?;
                let message = match (args.flag("-a"), args.value("-m")) {
                    (_, Some(message)) => Some(message),
                    (true, None) => Some(String::new()),
                    (false, None) => None,
                };
                Self::Tag {
                    name: args.value("name"),
                    object: args.value("object").unwrap_or_else(|| "HEAD".into()),
                    message,
                }
            }
            Some("show-ref") => Self::ShowRef,
            Some("rev-parse") => {
                let args = Args::builder()
                    .arg("--type")
                    .position(0, "name")
                    .build(rest)?;
                Self::RevParse {
                    name: args.required("name")?,
                    kind: parse_kind(args.value("--type"))?,
                }
            }
            Some("log") => {
                let args = Args::builder().position(0, "revision").build(rest)?;
                Self::Log {
                    revision: args.value("revision").unwrap_or_else(|| "HEAD".into()),
                }
            }
            Some(other) => return Err(Error::InvalidArgs(format!("unknown command {other:?}"))),
            None => return Err(Error::InvalidArgs("no command given".into())),
        };
        Ok(cmd)
    }

    pub fn run(self) -> Result<()> {
        match self {
            Self::Init { path } => init::run(path),
            Self::CatFile { object, kind } => cat_file::run(&Repository::find(".")?, &object, kind),
            Self::HashObject { path, kind, write } => hash_object::run(path, kind, write),
            Self::LsTree { tree, recursive } => {
                ls_tree::run(&Repository::find(".")?, &tree, recursive)
            }
            Self::Checkout { revision, dir } => {
                checkout::run(&Repository::find(".")?, &revision, dir)
            }
            Self::CommitTree {
                tree,
                parents,
                message,
            } => commit_tree::run(&Repository::find(".")?, &tree, &parents, &message),
            Self::UpdateRef { name, revision } => {
                update_ref::run(&Repository::find(".")?, &name, &revision)
            }
            Self::Tag {
                name,
                object,
                message,
            } => tag::run(&Repository::find(".")?, name, &object, message),
            Self::ShowRef => show_ref::run(&Repository::find(".")?),
            Self::RevParse { name, kind } => rev_parse::run(&Repository::find(".")?, &name, kind),
            Self::Log { revision } => log::run(&Repository::find(".")?, &revision),
        }
    }
}

fn parse_kind(value: Option<String>) -> Result<Option<ObjectKind>> {
    value.map(|v| v.parse()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(values: &[&str]) -> Result<Command> {
        let args: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        Command::new(&args)
    }

    #[test]
    fn it_builds_cat_file_with_and_without_kind() {
        assert_eq!(
            command(&["cat-file", "tree", "HEAD"]).unwrap(),
            Command::CatFile {
                object: "HEAD".into(),
                kind: Some(ObjectKind::Tree)
            }
        );
        assert_eq!(
            command(&["cat-file", "abcd"]).unwrap(),
            Command::CatFile {
                object: "abcd".into(),
                kind: None
            }
        );
        assert!(matches!(
            command(&["cat-file", "note", "HEAD"]),
            Err(Error::UnknownObjectKind(_))
        ));
    }

    #[test]
    fn it_builds_hash_object() {
        assert_eq!(
            command(&["hash-object", "-w", "-t", "commit", "msg.txt"]).unwrap(),
            Command::HashObject {
                path: "msg.txt".into(),
                kind: ObjectKind::Commit,
                write: true
            }
        );
    }

    #[test]
    fn it_defaults_log_and_tag_to_head() {
        assert_eq!(
            command(&["log"]).unwrap(),
            Command::Log {
                revision: "HEAD".into()
            }
        );
        assert_eq!(
            command(&["tag", "-a", "v1"]).unwrap(),
            Command::Tag {
                name: Some("v1".into()),
                object: "HEAD".into(),
                message: Some(String::new())
            }
        );
        assert_eq!(
            command(&["tag"]).unwrap(),
            Command::Tag {
                name: None,
                object: "HEAD".into(),
                message: None
            }
        );
    }

    #[test]
    fn it_builds_commit_tree_with_parents() {
        assert_eq!(
            command(&["commit-tree", "t", "-p", "a", "-p", "b", "-m", "merge"]).unwrap(),
            Command::CommitTree {
                tree: "t".into(),
                parents: vec!["a".into(), "b".into()],
                message: "merge".into()
            }
        );
    }

    #[test]
    fn it_rejects_unknown_commands() {
        assert!(matches!(command(&["push"]), Err(Error::InvalidArgs(_))));
        assert!(matches!(command(&[]), Err(Error::InvalidArgs(_))));
        assert!(matches!(command(&["checkout", "HEAD"]), Err(Error::InvalidArgs(_))));
    }
}
