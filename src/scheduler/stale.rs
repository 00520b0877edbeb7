//! Staleness policy: decide whether a claimed node's recipe runs

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::graph::Node;

/// True when `node`'s recipe must run.
///
/// Consults filesystem metadata only; callers invoke this outside the
/// scheduler lock. A node reached over a prerequisite edge is an existence
/// gate: once the file is there, timestamps are ignored.
pub fn should_run(node: &Node) -> bool {
    if node.is_phony {
        return true;
    }
    let target = Path::new(&node.name);
    if !target.exists() {
        return true;
    }
    if node.is_prerequisite {
        return false;
    }
    // A phony dependency has no timestamp to compare, so it always forces
    // the parent to rebuild.
    if node.depends.iter().any(|dep| dep.is_phony) {
        return true;
    }
    let Some(target_mtime) = mtime(target) else {
        return true;
    };
    node.depends.iter().any(|dep| {
        mtime(Path::new(&dep.name)).map_or(true, |dep_mtime| dep_mtime > target_mtime)
    })
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
