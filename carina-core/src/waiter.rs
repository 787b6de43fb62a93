//! Waiter - Poll a remote resource until it settles
//!
//! Remote control planes provision asynchronously: the create/update/delete
//! call returns immediately and the resource moves through intermediate
//! states. `wait_for_state` refreshes the resource at a fixed interval and
//! classifies each observed state as pending, target or failure.
//!
//! States are open strings. A remote service may add new states at any time;
//! anything outside the configured sets is reported, never panicked on.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{Instant, sleep, timeout_at};

/// One observation returned by a refresh function
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh<T> {
    /// The resource exists and is in `state`
    Current { value: T, state: String },
    /// The remote side no longer knows the resource
    Gone,
}

impl<T> Refresh<T> {
    pub fn current(value: T, state: impl Into<String>) -> Self {
        Refresh::Current {
            value,
            state: state.into(),
        }
    }
}

/// What a `Refresh::Gone` observation means for this wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The resource vanished while we expected it to settle
    Fail,
    /// Absence is the terminal state (deletion)
    Complete,
}

/// Successful end of a wait
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    /// A target state was reached; carries the last observed value
    Reached(T),
    /// The resource disappeared and `NotFound::Complete` was configured
    Gone,
}

impl<T> WaitOutcome<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            WaitOutcome::Reached(value) => Some(value),
            WaitOutcome::Gone => None,
        }
    }
}

/// Why a wait did not reach a target state
#[derive(Debug, thiserror::Error)]
pub enum WaitError<T: Debug, E: std::error::Error + 'static> {
    #[error("resource entered failure state '{state}'")]
    Failed { state: String, value: T },

    #[error("unexpected state '{state}', wanted one of: {}", expected.join(", "))]
    UnexpectedState { state: String, expected: Vec<String> },

    #[error("timeout while waiting for state to become '{}' (last state: '{}', timeout: {timeout:?})",
        target.join(", "), last_state.as_deref().unwrap_or(""))]
    Timeout {
        target: Vec<String>,
        last_state: Option<String>,
        timeout: Duration,
    },

    #[error("resource no longer exists")]
    Gone,

    #[error(transparent)]
    Refresh(E),
}

impl<T: Debug, E: std::error::Error + 'static> WaitError<T, E> {
    /// The state the resource was last seen in, when known
    pub fn state(&self) -> Option<&str> {
        match self {
            WaitError::Failed { state, .. } | WaitError::UnexpectedState { state, .. } => {
                Some(state)
            }
            WaitError::Timeout { last_state, .. } => last_state.as_deref(),
            WaitError::Gone | WaitError::Refresh(_) => None,
        }
    }
}

/// Pending/target/failure state sets and timing of one wait
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    pub failure: Vec<String>,
    pub timeout: Duration,
    /// Wait before the first refresh
    pub delay: Duration,
    /// Wait between two refreshes
    pub min_interval: Duration,
    pub not_found: NotFound,
}

impl StateChangeConf {
    pub fn new(pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            failure: Vec::new(),
            timeout,
            delay: Duration::ZERO,
            min_interval: Duration::from_secs(1),
            not_found: NotFound::Fail,
        }
    }

    pub fn with_failure(mut self, state: impl Into<String>) -> Self {
        self.failure.push(state.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_not_found(mut self, not_found: NotFound) -> Self {
        self.not_found = not_found;
        self
    }

    fn expected(&self) -> Vec<String> {
        self.pending
            .iter()
            .chain(self.target.iter())
            .cloned()
            .collect()
    }
}

/// Refresh until the resource reaches a target state
///
/// Sleeps `delay`, then calls `refresh` every `min_interval`. Returns a
/// timeout error when the next refresh would start past `timeout`.
pub async fn wait_for_state<T, E, F, Fut>(
    conf: &StateChangeConf,
    mut refresh: F,
) -> Result<WaitOutcome<T>, WaitError<T, E>>
where
    T: Debug,
    E: std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Refresh<T>, E>>,
{
    let deadline = Instant::now() + conf.timeout;
    let mut last_state: Option<String> = None;
    let mut wait = conf.delay;

    loop {
        if Instant::now() + wait > deadline {
            return Err(WaitError::Timeout {
                target: conf.target.clone(),
                last_state,
                timeout: conf.timeout,
            });
        }
        sleep(wait).await;
        wait = conf.min_interval;

        // A hung refresh must not outlive the deadline
        let Ok(observed) = timeout_at(deadline, refresh()).await else {
            return Err(WaitError::Timeout {
                target: conf.target.clone(),
                last_state,
                timeout: conf.timeout,
            });
        };

        match observed.map_err(WaitError::Refresh)? {
            Refresh::Gone => {
                return match conf.not_found {
                    NotFound::Complete => Ok(WaitOutcome::Gone),
                    NotFound::Fail => Err(WaitError::Gone),
                };
            }
            Refresh::Current { value, state } => {
                debug!("waiting for {:?}, current state: {}", conf.target, state);
                if conf.target.contains(&state) {
                    return Ok(WaitOutcome::Reached(value));
                }
                if conf.failure.contains(&state) {
                    return Err(WaitError::Failed { state, value });
                }
                if !conf.pending.contains(&state) {
                    return Err(WaitError::UnexpectedState {
                        state,
                        expected: conf.expected(),
                    });
                }
                last_state = Some(state);
            }
        }
    }
}
