//! First-failure capture shared by all workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::Error;

/// Abort flag plus the first error recorded by any worker.
///
/// Workers check [`FailureChannel::is_aborted`] before every claim attempt,
/// so a failure stops new work while recipes already running finish
/// undisturbed.
#[derive(Default)]
pub struct FailureChannel {
    aborted: AtomicBool,
    error: Mutex<Option<Error>>,
}

impl FailureChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Record a failure and stop further claims. The first error wins;
    /// later ones are dropped.
    pub fn record(&self, error: Error) {
        if let Ok(mut slot) = self.error.lock() {
            slot.get_or_insert(error);
        }
        self.aborted.store(true, Ordering::Relaxed);
    }

    /// Consume the channel into the run's result.
    pub fn into_result(self) -> Result<(), Error> {
        let slot = match self.error.into_inner() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
