//! Brainstem Types - Core types for the operational control loop
//!
//! Brainstem is the self-monitoring, self-correcting control loop for a
//! decision-making service. This crate holds the shared data model consumed
//! by every other brainstem crate.
//!
//! ## Architectural Boundaries
//!
//! - **brainstem-anomaly** owns: rolling baselines, anomaly lifecycle
//! - **brainstem-healing** owns: remediation actions and their bookkeeping
//! - **brainstem-health** owns: component probes and aggregation
//! - **brainstem-calibration** owns: prediction-vs-outcome statistics
//!
//! This crate owns none of the behavior - only the records that flow between
//! the components and out to the reporting surface.
//!
//! ## Key Concepts
//!
//! - **MetricSample**: A timestamped named measurement from the metric feed
//! - **AnomalyRecord**: A metric deviating from its rolling baseline
//! - **ActionRun**: One execution of a registered healing action
//! - **HealthCheckResult**: One component probe outcome

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod action;
pub mod anomaly;
pub mod health;
pub mod ids;
pub mod metric;

// Re-export main types
pub use action::{ActionResult, ActionRun};
pub use anomaly::{AnomalyFilter, AnomalyRecord, AnomalySeverity, AnomalyStatus};
pub use health::{HealthCheckResult, HealthStatus};
pub use ids::{AnomalyId, CorrelationId};
pub use metric::{Baseline, MetricSample};
