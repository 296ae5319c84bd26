/// Data structures shared across the engine
/// Maps are keyed by item or ingredient name and kept ordered so every run
/// iterates (and serializes) them identically.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::controller::AdaptationRecord;
use crate::decision::{Decision, ShelterState};

/// Quantity per menu item or per ingredient
pub type ItemQuantities = BTreeMap<String, f64>;

/// Inputs handed to the forecast producer for one decision cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub hour: u32,
    /// 0 = Sunday.
    pub day_of_week: u32,
    pub temperature: f64,
    pub rainfall: f64,
    pub event_flag: u8,
}

/// Predicted demand for one period, with per-item spread
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecast {
    pub predictions: ItemQuantities,
    pub uncertainty: ItemQuantities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<ItemQuantities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<ItemQuantities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl DemandForecast {
    pub fn new(predictions: ItemQuantities, uncertainty: ItemQuantities) -> Self {
        DemandForecast {
            predictions,
            uncertainty,
            ..Default::default()
        }
    }

    pub fn total_predicted(&self) -> f64 {
        self.predictions.values().sum()
    }
}

/// Ambient conditions for a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub temperature: f64,
    pub rainfall: f64,
    pub description: String,
    pub city: String,
    pub source: String,
}

/// Result of a single "predict" cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResult {
    #[serde(flatten)]
    pub forecast: DemandForecast,
    pub ingredient_usage: ItemQuantities,
    pub surplus: ItemQuantities,
    pub surplus_risk: f64,
    pub decision: Decision,
}

/// Record of one simulated day on the adaptive side
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub day: u32,
    pub date: NaiveDate,
    pub weather: WeatherReport,
    pub predictions: ItemQuantities,
    pub adjusted_predictions: ItemQuantities,
    pub actual_demand: BTreeMap<String, u32>,
    pub prediction_error: f64,
    pub cooking_factor: f64,
    pub surplus_risk: f64,
    pub decision: Decision,
    pub revenue: f64,
    pub metrics_snapshot: DaySnapshot,
}

/// Cumulative adaptive-side counters as of the end of a day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySnapshot {
    pub waste_reduced: f64,
    pub meals_donated: u32,
    pub revenue_loss: f64,
    pub total_revenue: f64,
}

/// Record of one simulated day on the baseline side
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineDay {
    pub day: u32,
    pub production: BTreeMap<String, u32>,
    pub actual_demand: BTreeMap<String, u32>,
    pub waste: BTreeMap<String, u32>,
    pub waste_kg: f64,
    pub meals_donated: u32,
    pub discount_revenue_loss: f64,
    pub revenue: f64,
}

/// Cumulative metrics of the adaptive run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub waste_reduction_kg: f64,
    pub meals_donated: u32,
    pub revenue_loss: f64,
    pub total_revenue: f64,
    pub waste_reduction_percent: f64,
    pub avg_surplus_risk: f64,
    pub days_simulated: usize,
    pub final_cooking_factor: f64,
    pub adaptation_count: usize,
    pub carbon_saved_kg: f64,
    pub shelter: ShelterState,
}

/// Cumulative metrics of the baseline run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineMetrics {
    pub total_waste_kg: f64,
    pub total_meals_donated: u32,
    pub revenue_loss: f64,
    pub total_revenue: f64,
    pub avg_daily_waste: f64,
}

/// Adaptive run measured against the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub food_saved_kg: f64,
    pub waste_reduction_percent: f64,
    pub meals_donated_delta: i64,
    pub revenue_delta: f64,
    pub net_social_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_days: u32,
    pub adaptive: MetricsSnapshot,
    pub baseline: BaselineMetrics,
    pub comparison: ComparisonSummary,
}

/// Full trace of a multi-day run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub days: Vec<DayRecord>,
    pub baseline_days: Vec<BaselineDay>,
    pub summary: RunSummary,
    pub adaptation_history: Vec<AdaptationRecord>,
}

/// Round to a fixed number of decimals for presentation.
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub fn items<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> ItemQuantities {
    pairs
        .into_iter()
        .map(|(name, qty)| (name.to_string(), qty))
        .collect()
}
