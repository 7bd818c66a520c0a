//! Brainstem Runtime - Control-loop wiring and reporting surface
//!
//! This crate assembles the four brainstem components into one supervised
//! control loop:
//!
//! - **Control cycle**: drain the metric feed, detect anomalies against
//!   rolling baselines, trigger matching healing actions, and fast-path
//!   resolve anomalies whose remediation succeeded.
//! - **Calibration cycle**: fetch settled outcome batches and publish one
//!   calibration report per (scope, period), analyzed off the scheduler
//!   thread.
//! - **Health cycle**: run all component probes concurrently and cache the
//!   aggregated snapshot.
//!
//! The cycles run as independent tokio tasks. Every fault is local: a
//! failing probe, action, source, or analysis run degrades its own report
//! and is logged; the loop never crashes the host process.
//!
//! The excluded API layer consumes the loop through the read-only
//! reporting surface on [`Brainstem`]: `latest_calibration`, `anomalies`,
//! `action_history`, `action_stats`, and `health` are side-effect-free
//! reads over already-computed state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use brainstem_healing::{ActionRegistry, ActionTrigger, HealingAction, NoOpExecutor};
//! use brainstem_runtime::{
//!     Brainstem, BrainstemConfig, MetricSource, OutcomeBatch, OutcomeSource, RuntimeResult,
//! };
//! use brainstem_types::{AnomalySeverity, MetricSample};
//!
//! struct PushedMetrics; // wraps whatever transport the deployment has
//!
//! #[async_trait]
//! impl MetricSource for PushedMetrics {
//!     async fn poll(&self) -> RuntimeResult<Vec<MetricSample>> {
//!         Ok(vec![])
//!     }
//! }
//!
//! struct SettledOutcomes;
//!
//! #[async_trait]
//! impl OutcomeSource for SettledOutcomes {
//!     async fn fetch(&self) -> RuntimeResult<Vec<OutcomeBatch>> {
//!         Ok(vec![])
//!     }
//! }
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
//! let brainstem = Arc::new(Brainstem::new(
//!     BrainstemConfig::default(),
//!     Arc::new(registry),
//!     vec![],
//!     Arc::new(PushedMetrics),
//!     Arc::new(SettledOutcomes),
//! ));
//!
//! brainstem.clone().start();
//! // ... serve snapshots until shutdown ...
//! brainstem.shutdown();
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod reports;
pub mod sources;
pub mod supervisor;

// Re-export main types
pub use config::BrainstemConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use reports::ReportStore;
pub use sources::{MetricSource, OutcomeBatch, OutcomeSource};
pub use supervisor::Brainstem;
