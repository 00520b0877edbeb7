//! Claim search over the dependency tree

use std::collections::HashMap;

use crate::graph::Node;

/// Per-name build progress, shared by every occurrence of the name in the
/// tree.
///
/// Transitions are forward-only:
/// - `NotYetMade` -> `CurrentlyMaking` when a worker claims the name
/// - `CurrentlyMaking` -> `FinishedMaking` when the recipe ran or was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeState {
    NotYetMade,
    CurrentlyMaking,
    FinishedMaking,
}

/// Outcome of one claim attempt.
pub enum Claim<'a> {
    /// This node was moved to `CurrentlyMaking` for the caller to build.
    Claimed(&'a Node),
    /// Every candidate waits on a name another worker is still making.
    Blocked,
    /// The root is already claimed or finished; nothing left to hand out.
    NothingLeft,
}

/// Find and claim the next buildable node, deepest first, `depends` before
/// `prerequisites`.
///
/// Must run under the scheduler lock so the search and the state write are
/// one atomic step. A node is claimable once every child name is
/// `FinishedMaking`; a `CurrentlyMaking` child anywhere on the way blocks
/// the caller instead.
pub fn claim<'a>(root: &'a Node, states: &mut HashMap<String, MakeState>) -> Claim<'a> {
    if state_of(states, &root.name) != MakeState::NotYetMade {
        return Claim::NothingLeft;
    }
    match deepest_unmade(root, states) {
        Some(node) => {
            states.insert(node.name.clone(), MakeState::CurrentlyMaking);
            Claim::Claimed(node)
        }
        None => Claim::Blocked,
    }
}

fn state_of(states: &HashMap<String, MakeState>, name: &str) -> MakeState {
    states.get(name).copied().unwrap_or(MakeState::NotYetMade)
}

/// Deepest node under `node` (inclusive) whose children are all finished,
/// or `None` if progress waits on another worker.
fn deepest_unmade<'a>(node: &'a Node, states: &HashMap<String, MakeState>) -> Option<&'a Node> {
    let mut blocked = false;
    for child in node.depends.iter().chain(node.prerequisites.iter()) {
        match state_of(states, &child.name) {
            MakeState::NotYetMade => match deepest_unmade(child, states) {
                Some(found) => return Some(found),
                None => blocked = true,
            },
            MakeState::CurrentlyMaking => blocked = true,
            MakeState::FinishedMaking => {}
        }
    }
    if blocked {
        None
    } else {
        Some(node)
    }
}
