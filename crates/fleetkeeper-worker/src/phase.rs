//! A worker's mutually-exclusive lifecycle phase.
//!
//! The source manages the tag loop, disk loop and shutdown as four
//! independent `threading.Event` flags whose startup ordering had to be
//! hand-tuned. Here they collapse into a single mutex-guarded state machine:
//! at most one of the tag task, the disk task, or shutdown may be active for
//! a given worker at any moment.

use std::sync::Mutex;

/// Mutually-exclusive phase of a single worker's tag/disk task pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Neither task is running; either may be entered.
    Idle,
    /// The tag-reconciliation task is running.
    Tagging,
    /// The disk-hygiene task is running.
    Disking,
    /// Shutdown has been requested; no new task may be entered.
    Stopping,
}

/// Guards `WorkerPhase` transitions so the tag and disk tasks of one worker
/// never run concurrently.
#[derive(Debug)]
pub struct PhaseGuard {
    phase: Mutex<WorkerPhase>,
}

impl Default for PhaseGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseGuard {
    /// Construct a guard starting in [`WorkerPhase::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(WorkerPhase::Idle),
        }
    }

    /// Attempt to enter `phase`. Succeeds only if the worker is currently
    /// `Idle`; any other current phase — including the same phase re-firing
    /// before its prior run finished, or `Stopping` — is rejected so the
    /// caller can log a re-entrancy warning and return without doing the
    /// work, matching "a fire that finds either flag set logs a warning and
    /// returns".
    pub fn try_enter(&self, phase: WorkerPhase) -> Option<PhaseToken<'_>> {
        let mut guard = self.lock();
        if *guard != WorkerPhase::Idle {
            return None;
        }
        *guard = phase;
        drop(guard);
        Some(PhaseToken { owner: self })
    }

    /// Force the machine into `Stopping`. Any task holding a token continues
    /// to its next safe point; once it releases, the phase stays `Stopping`
    /// rather than reverting to `Idle`, so no further task can be entered.
    pub fn stop(&self) {
        *self.lock() = WorkerPhase::Stopping;
    }

    /// Current phase, for diagnostics and the disk task's startup poll.
    #[must_use]
    pub fn current(&self) -> WorkerPhase {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorkerPhase> {
        self.phase.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Proof that a worker successfully entered a non-`Idle` phase; releases
/// back to `Idle` on drop unless the machine has since been told to stop.
pub struct PhaseToken<'a> {
    owner: &'a PhaseGuard,
}

impl Drop for PhaseToken<'_> {
    fn drop(&mut self) {
        let mut guard = self.owner.lock();
        if *guard != WorkerPhase::Stopping {
            *guard = WorkerPhase::Idle;
        }
    }
}
