/// Adaptive production multiplier
/// A proportional step with dead-band and saturation: each simulated day the
/// cooking factor moves one step towards the side the forecast missed on.

use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::models::round_dp;

/// One feedback step, logged whether or not the factor moved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationRecord {
    pub day: u32,
    pub prediction_error: f64,
    pub old_factor: f64,
    pub new_factor: f64,
}

impl AdaptationRecord {
    pub fn changed(&self) -> bool {
        self.old_factor != self.new_factor
    }
}

/// Next cooking factor given the realized minus forecast demand total.
pub fn next_factor(factor: f64, prediction_error: f64, cfg: &ControllerConfig) -> f64 {
    let mut next = factor;
    if prediction_error.abs() > cfg.dead_band {
        if prediction_error > 0.0 {
            next += cfg.step;
        } else {
            next -= cfg.step;
        }
    }
    next.max(cfg.min_factor).min(cfg.max_factor)
}

/// Feedback controller state carried across the days of a run
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveController {
    factor: f64,
    history: Vec<AdaptationRecord>,
}

impl AdaptiveController {
    pub fn new(cfg: &ControllerConfig) -> Self {
        AdaptiveController {
            factor: cfg.initial_factor.max(cfg.min_factor).min(cfg.max_factor),
            history: Vec::new(),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn history(&self) -> &[AdaptationRecord] {
        &self.history
    }

    pub fn adaptation_count(&self) -> usize {
        self.history.iter().filter(|r| r.changed()).count()
    }

    /// Apply the feedback rule for `day` and return the recorded step.
    pub fn observe(&mut self, day: u32, prediction_error: f64, cfg: &ControllerConfig) -> &AdaptationRecord {
        let old = self.factor;
        self.factor = next_factor(old, prediction_error, cfg);
        self.history.push(AdaptationRecord {
            day,
            prediction_error: round_dp(prediction_error, 1),
            old_factor: round_dp(old, 2),
            new_factor: round_dp(self.factor, 2),
        });
        &self.history[self.history.len() - 1]
    }
}
