mod args;
mod cmd;
mod error;
mod hash;

pub mod config;
pub mod git_object;
pub mod graph;
pub mod refs;
pub mod repository;
pub mod revision;
pub mod store;
pub mod tree;

const GIT_DIR: &str = ".git";

use args::Args;
pub use cmd::Command;
pub use error::Error;
pub use git_object::{GitObject, ObjectKind};
pub use hash::{Sha1Hash, SHA1_HASH_SIZE, SHA1_HEX_SIZE};
pub use repository::Repository;
pub type Result<T> = std::result::Result<T, Error>;
