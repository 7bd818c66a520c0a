//! Brainstem Healing - Self-healing action registry and orchestration
//!
//! When the anomaly detector opens an anomaly, the healing orchestrator
//! looks up a matching remediation action and executes it under a bounded
//! timeout, with bookkeeping that keeps automated remediation safe:
//!
//! - **Single flight per target**: at most one action runs against a target
//!   at any instant, enforced by a compare-and-swap on an in-flight marker.
//! - **Cooldown**: an action will not re-run against a target until its
//!   cooldown has elapsed since the previous start.
//! - **Failure ceiling**: consecutive failures past the configured ceiling
//!   disable the action until an operator resets it.
//! - **Honest statistics**: skipped triggers produce no run record, so the
//!   rolling success rate only reflects real executions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use brainstem_healing::{
//!     ActionRegistry, ActionTrigger, HealingAction, HealingConfig, HealingOrchestrator,
//!     NoOpExecutor,
//! };
//! use brainstem_types::AnomalySeverity;
//!
//! # async fn example() {
//! let mut registry = ActionRegistry::new();
//! registry.register(
//!     HealingAction {
//!         name: "increase_database_pool_size".into(),
//!         target: "database".into(),
//!         trigger: ActionTrigger::new("db_connection_wait_ms", AnomalySeverity::Medium),
//!         cooldown: Duration::from_secs(300),
//!         timeout: Duration::from_secs(30),
//!         max_consecutive_failures: 3,
//!     },
//!     Arc::new(NoOpExecutor),
//! );
//!
//! let orchestrator = HealingOrchestrator::new(HealingConfig::default(), Arc::new(registry));
//! let outcome = orchestrator
//!     .trigger_by_name("increase_database_pool_size", "database")
//!     .await
//!     .unwrap();
//! println!("outcome: {outcome:?}");
//! # }
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod error;
pub mod orchestrator;
pub mod stats;

// Re-export main types
pub use action::{
    ActionExecutor, ActionRegistry, ActionTrigger, FailingExecutor, HealingAction, NoOpExecutor,
};
pub use error::{HealingError, HealingResult};
pub use orchestrator::{
    HealingConfig, HealingEvent, HealingOrchestrator, SkipReason, TriggerOutcome,
};
pub use stats::ActionStatsSnapshot;
