//! Concurrent build scheduler: a fixed pool of workers claiming nodes

mod claim;
mod failure;
mod stale;


use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::error::Error;
use crate::graph::{self, Node};
use crate::rules::Registry;

pub use claim::{claim, Claim, MakeState};
pub use failure::FailureChannel;
pub use stale::should_run;

/// Shared state for one build run. Constructed per invocation so concurrent
/// runs in one process never see each other.
struct RunContext {
    states: Mutex<HashMap<String, MakeState>>,
    failure: FailureChannel,
}

impl RunContext {
    fn lock_states(&self) -> MutexGuard<'_, HashMap<String, MakeState>> {
        // A worker can only poison this lock by panicking inside claim or a
        // state write, neither of which leaves the map half-updated.
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve `goal` into a dependency tree and build it with `jobs` workers.
pub fn run(registry: &Registry, goal: &str, jobs: usize) -> Result<(), Error> {
    let root = graph::build(registry, goal)?;
    execute(&root, jobs)
}

/// Build an already-resolved dependency tree with `jobs` workers.
///
/// Workers cooperatively claim nodes off the shared tree and exit once the
/// root is claimed or a failure is recorded. Returns the first failure.
pub fn execute(root: &Node, jobs: usize) -> Result<(), Error> {
    if jobs == 0 {
        return Err(Error::MakefileUsage(
            "Job count must be at least 1".to_string(),
        ));
    }

    let ctx = RunContext {
        states: Mutex::new(HashMap::new()),
        failure: FailureChannel::new(),
    };

    thread::scope(|scope| {
        for _ in 0..jobs {
            scope.spawn(|| worker(root, &ctx));
        }
    });

    ctx.failure.into_result()
}

fn worker(root: &Node, ctx: &RunContext) {
    while !ctx.failure.is_aborted() {
        let next = claim(root, &mut ctx.lock_states());

        match next {
            Claim::NothingLeft => break,
            Claim::Blocked => {
                // Some candidate is mid-build on another worker; poll again.
                // TODO: replace the yield loop with a condvar signalled on
                // every FinishedMaking transition.
                thread::yield_now();
            }
            Claim::Claimed(node) => {
                if let Err(error) = build_node(node) {
                    ctx.failure.record(error);
                    return;
                }
                ctx.lock_states()
                    .insert(node.name.clone(), MakeState::FinishedMaking);
                tracing::debug!("finished '{}'", node.name);
            }
        }
    }
}

/// Run one claimed node: skip if fresh, invoke the recipe, then check the
/// output contract. Holds no locks.
fn build_node(node: &Node) -> Result<(), Error> {
    if !stale::should_run(node) {
        tracing::debug!("'{}' is up to date", node.name);
        return Ok(());
    }

    let depends = names(&node.depends);
    let prerequisites = names(&node.prerequisites);

    tracing::debug!("making '{}'", node.name);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        (node.recipe)(&node.name, &depends, &prerequisites)
    }));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(error)) => return Err(classify(&node.name, error)),
        Err(payload) => {
            tracing::error!(
                "recipe for '{}' panicked: {}",
                node.name,
                panic_message(payload.as_ref())
            );
            return Err(Error::RecipeFailed(node.name.clone()));
        }
    }

    if !node.is_phony && !Path::new(&node.name).exists() {
        return Err(Error::PhonyUsage(node.name.clone()));
    }
    Ok(())
}

fn names(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(|node| node.name.clone()).collect()
}

/// Build errors pass through unchanged; anything else is a recipe bug,
/// logged with its context chain and reported as a recipe failure.
fn classify(target: &str, error: anyhow::Error) -> Error {
    match error.downcast::<Error>() {
        Ok(build_error) => build_error,
        Err(other) => {
            tracing::error!("recipe for '{}' failed: {:#}", target, other);
            Error::RecipeFailed(target.to_string())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}
