//! Settled outcome records, the calibration input contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One settled prediction: what we predicted, what happened, and the money.
///
/// Produced by an external settlement/outcome recorder; the analyzer only
/// reads these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Predicted probability of the outcome, in [0, 1].
    pub predicted_prob: f64,

    /// Whether the predicted outcome occurred.
    pub outcome: bool,

    /// Amount staked.
    pub stake: f64,

    /// Amount returned (0 for a loss, stake x odds for a win).
    pub payout: f64,

    /// Sport the prediction belongs to, when known.
    pub sport_id: Option<String>,

    /// When the outcome settled.
    pub settled_at: DateTime<Utc>,
}

impl OutcomeRecord {
    /// Create a record settled now.
    pub fn new(predicted_prob: f64, outcome: bool, stake: f64, payout: f64) -> Self {
        Self {
            predicted_prob,
            outcome,
            stake,
            payout,
            sport_id: None,
            settled_at: Utc::now(),
        }
    }

    /// Tag the record with a sport.
    pub fn with_sport(mut self, sport_id: impl Into<String>) -> Self {
        self.sport_id = Some(sport_id.into());
        self
    }

    /// Validation failure reason, if the record is unusable.
    pub(crate) fn validation_error(&self) -> Option<String> {
        if !self.predicted_prob.is_finite() || !(0.0..=1.0).contains(&self.predicted_prob) {
            return Some(format!(
                "predicted_prob {} outside [0, 1]",
                self.predicted_prob
            ));
        }
        if !self.stake.is_finite() || self.stake < 0.0 {
            return Some(format!("stake {} is not a non-negative number", self.stake));
        }
        if !self.payout.is_finite() || self.payout < 0.0 {
            return Some(format!("payout {} is not a non-negative number", self.payout));
        }
        None
    }
}
