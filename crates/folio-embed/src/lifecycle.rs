//! Per-view initialization state machine.
//!
//! Tracks one embedded view from not-yet-requested through initializing
//! (with host-reported sub-detail) to initialized, or to a classified error.
//! Transitions are monotonic: success is never downgraded, a first error is
//! never overwritten by a stale one, and the only edge back to `Idle` is an
//! explicit retry. A stall deadline demotes an unanswered initialization to
//! a timeout error.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{classify, ClassifiedError, RawFailure};
use crate::protocol::InitProgress;

/// Readiness of one embedded view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum InitStatus {
    /// No update-view request has been sent yet.
    Idle,
    /// The host acknowledged a request; `detail` narrates sub-progress.
    Initializing {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<InitProgress>,
    },
    /// Terminal success.
    Initialized,
    /// Terminal failure, escapable only via explicit retry.
    Error { error: ClassifiedError },
}

impl InitStatus {
    pub fn is_initialized(&self) -> bool {
        matches!(self, InitStatus::Initialized)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InitStatus::Error { .. })
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        match self {
            InitStatus::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// State machine and stall deadline for one view.
#[derive(Debug)]
pub struct LifecycleState {
    status: InitStatus,
    attempts: u32,
    deadline: Option<Instant>,
    stall_timeout: Duration,
}

impl LifecycleState {
    pub fn new(stall_timeout: Duration) -> Self {
        Self {
            status: InitStatus::Idle,
            attempts: 0,
            deadline: None,
            stall_timeout,
        }
    }

    pub fn status(&self) -> &InitStatus {
        &self.status
    }

    /// Update-view sends while neither initialized nor errored count as
    /// initialization attempts. Only the arming of the stall deadline keys
    /// off this, never correctness.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record that an update-view was flushed for this view. Leaves terminal
    /// states untouched; arms the stall deadline on the first attempt.
    pub fn note_update_sent(&mut self, now: Instant) -> bool {
        match self.status {
            InitStatus::Initialized | InitStatus::Error { .. } => return false,
            InitStatus::Idle | InitStatus::Initializing { .. } => {}
        }

        self.attempts += 1;
        if self.attempts == 1 {
            self.deadline = Some(now + self.stall_timeout);
        }

        if self.status == InitStatus::Idle {
            self.status = InitStatus::Initializing { detail: None };
            true
        } else {
            false
        }
    }

    /// Apply host-reported initialization progress. Returns true when the
    /// status changed.
    ///
    /// `Loaded` (or a bare success with no sub-detail) is terminal and wins
    /// over any in-flight detail. Events for an already-initialized or
    /// already-errored view are ignored.
    pub fn advance(&mut self, progress: Option<InitProgress>) -> bool {
        match &self.status {
            InitStatus::Initialized => {
                debug!(?progress, "duplicate initialization report ignored");
                false
            }
            InitStatus::Error { .. } => {
                debug!(?progress, "stale success after error ignored");
                false
            }
            _ => match progress {
                Some(InitProgress::Loaded) | None => {
                    self.status = InitStatus::Initialized;
                    self.deadline = None;
                    true
                }
                Some(detail) => {
                    let next = InitStatus::Initializing {
                        detail: Some(detail),
                    };
                    let changed = self.status != next;
                    self.status = next;
                    changed
                }
            },
        }
    }

    /// Apply a host-reported failure, already classified. Returns true when
    /// the status changed. Success is never downgraded and the first error
    /// wins over later ones.
    pub fn fail(&mut self, error: ClassifiedError) -> bool {
        match &self.status {
            InitStatus::Initialized => {
                warn!(
                    title = %error.friendly_title,
                    "failure report for an initialized view ignored"
                );
                false
            }
            InitStatus::Error { .. } => {
                debug!(
                    title = %error.friendly_title,
                    "failure report for an already-errored view ignored"
                );
                false
            }
            _ => {
                self.status = InitStatus::Error { error };
                self.deadline = None;
                true
            }
        }
    }

    /// Stall sweep. When the armed deadline has passed without a terminal
    /// transition, forces the timeout error. The deadline is consumed, so
    /// this fires at most once per arming.
    pub fn poll_stall(&mut self, now: Instant, url: Option<String>) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.deadline = None;

        match self.status {
            InitStatus::Initialized | InitStatus::Error { .. } => false,
            _ => {
                let window_secs = self.stall_timeout.as_secs();
                warn!(window_secs, "view initialization stalled");
                self.status = InitStatus::Error {
                    error: classify(&RawFailure::local_timeout(url, window_secs)),
                };
                true
            }
        }
    }

    /// Escape the error state. Resets to `Idle`, zeroes the attempt counter,
    /// and disarms the deadline; the surrounding component re-triggers the
    /// bounds resend. Returns false from any non-error state.
    pub fn retry(&mut self) -> bool {
        if !self.status.is_error() {
            return false;
        }
        self.status = InitStatus::Idle;
        self.attempts = 0;
        self.deadline = None;
        true
    }
}
