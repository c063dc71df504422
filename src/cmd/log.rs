use super::{ObjectKind, Repository, Result};
use crate::{
    git_object::GitObject,
    graph::{walk, CommitEdge},
    store::ObjectStore,
};

pub(crate) fn run(repo: &Repository, revision: &str) -> Result<()> {
    let start = repo.resolver().resolve_typed(revision, ObjectKind::Commit)?;
    let edges = walk(repo.objects(), start)?;
    print!("{}", graphviz(repo.objects(), &edges)?);
    Ok(())
}

/// Renders the history as a Graphviz `digraph`, one node per commit labelled
/// with its short hash and summary line.
fn graphviz(store: &ObjectStore, edges: &[CommitEdge]) -> Result<String> {
    let mut out = String::from("digraph tinygitlog{\n  node[shape=rect]\n");
    for edge in edges {
        let summary = match store.read(&edge.commit)? {
            GitObject::Commit(commit) => commit.summary(),
            _ => String::new(),
        };
        out.push_str(&format!(
            "  c_{} [label=\"{}: {}\"]\n",
            edge.commit,
            edge.commit.short(),
            escape(&summary)
        ));
        for parent in edge.parents.iter() {
            out.push_str(&format!("  c_{} -> c_{};\n", edge.commit, parent));
        }
    }
    out.push_str("}\n");
    Ok(out)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
