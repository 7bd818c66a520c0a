//! Healing error types.

use thiserror::Error;

/// Result alias for healing operations.
pub type HealingResult<T> = Result<T, HealingError>;

/// Errors surfaced by the healing orchestrator and action executors.
#[derive(Debug, Error)]
pub enum HealingError {
    /// No action with that name is registered.
    #[error("no healing action registered under name '{name}'")]
    UnknownAction { name: String },

    /// The action crossed its consecutive-failure ceiling and needs an
    /// operator reset before it can run again.
    #[error(
        "action '{name}' is disabled for target '{target}' after {consecutive_failures} consecutive failures"
    )]
    ActionDisabled {
        name: String,
        target: String,
        consecutive_failures: u32,
    },

    /// An executor reported a failure. Recorded as a failed run, never
    /// retried within the same trigger.
    #[error("action execution failed: {reason}")]
    ExecutionFailed { reason: String },

    /// A shared-state lock was poisoned by a panicking writer.
    #[error("action history lock poisoned")]
    LockPoisoned,
}
