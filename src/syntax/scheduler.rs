//! Edit debouncing for classification passes
//!
//! The host reports every content change with `notify_edit` and calls
//! `run_due` from its event loop. Edits inside the quiescence window push the
//! deadline back, so a burst of keystrokes costs one pass.

use std::time::{Duration, Instant};

use tracing::trace;

/// Reference quiescence window
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A pass is armed to run at `deadline`
    Pending { deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct HighlightScheduler {
    window: Duration,
    state: SchedulerState,
    /// Edits seen so far
    revision: u64,
    /// Passes fired so far
    passes: u64,
}

impl HighlightScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: SchedulerState::Idle,
            revision: 0,
            passes: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Record an edit at `now`, re-arming the timer
    ///
    /// Returns the edit's revision number.
    pub fn notify_edit(&mut self, now: Instant) -> u64 {
        self.revision += 1;
        let deadline = now + self.window;
        if let SchedulerState::Pending { deadline: old } = self.state {
            trace!(revision = self.revision, ?old, "re-arming highlight timer");
        }
        self.state = SchedulerState::Pending { deadline };
        self.revision
    }

    /// Whether the quiescence window has elapsed with a pass still armed
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.state, SchedulerState::Pending { deadline } if now >= deadline)
    }

    /// Record a finished pass and return to idle
    pub fn complete(&mut self) {
        self.state = SchedulerState::Idle;
        self.passes += 1;
        trace!(revision = self.revision, passes = self.passes, "highlight pass complete");
    }

    /// Run `pass` if the timer is due, then go idle; `None` when nothing ran
    pub fn run_due<R, F: FnOnce() -> R>(&mut self, now: Instant, pass: F) -> Option<R> {
        if !self.is_due(now) {
            return None;
        }
        let result = pass();
        self.complete();
        Some(result)
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Pending { deadline } => Some(deadline),
            SchedulerState::Idle => None,
        }
    }

    /// How long the host may sleep before the next poll matters
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SchedulerState::Pending { .. })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Default for HighlightScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
