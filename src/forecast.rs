/// Forecast producer contract
/// The engine never trains or runs a model itself; it asks a `DemandForecaster`
/// for item quantities and spreads and validates what comes back.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SimError};
use crate::models::{round_dp, DemandForecast, ForecastRequest, ItemQuantities};

const REQUIRED_FIELDS: [&str; 5] = ["hour", "day_of_week", "temperature", "rainfall", "event_flag"];

impl ForecastRequest {
    /// Build a request from loosely-typed input, naming the first missing or
    /// malformed field.
    pub fn from_json(value: &Value) -> Result<Self> {
        let number = |field: &str| -> Result<f64> {
            match value.get(field) {
                None | Some(Value::Null) => Err(SimError::invalid(field, "missing")),
                Some(v) => v
                    .as_f64()
                    .ok_or_else(|| SimError::invalid(field, "not a number")),
            }
        };

        let mut fields = [0.0; REQUIRED_FIELDS.len()];
        for (slot, field) in fields.iter_mut().zip(REQUIRED_FIELDS) {
            *slot = number(field)?;
        }
        let [hour, day_of_week, temperature, rainfall, event_flag] = fields;

        if !(0.0..24.0).contains(&hour) {
            return Err(SimError::invalid("hour", "must be within 0-23"));
        }
        if !(0.0..7.0).contains(&day_of_week) {
            return Err(SimError::invalid("day_of_week", "must be within 0-6"));
        }
        if rainfall < 0.0 {
            return Err(SimError::invalid("rainfall", "must not be negative"));
        }

        Ok(ForecastRequest {
            hour: hour as u32,
            day_of_week: day_of_week as u32,
            temperature,
            rainfall,
            event_flag: u8::from(event_flag != 0.0),
        })
    }
}

/// Largest per-item quantity a single forecast may carry.
pub const MAX_ITEM_QUANTITY: f64 = 1_000_000.0;

/// Reject forecasts with negative, non-finite or implausibly large figures.
pub fn validate_forecast(forecast: &DemandForecast) -> Result<()> {
    for (field, map) in [("predictions", &forecast.predictions), ("uncertainty", &forecast.uncertainty)] {
        for (item, qty) in map {
            if !qty.is_finite() || *qty < 0.0 {
                return Err(SimError::invalid(
                    format!("{}.{}", field, item),
                    format!("expected a finite non-negative value, got {}", qty),
                ));
            }
            if *qty > MAX_ITEM_QUANTITY {
                return Err(SimError::invalid(
                    format!("{}.{}", field, item),
                    format!("{} exceeds the per-item limit of {}", qty, MAX_ITEM_QUANTITY),
                ));
            }
        }
    }
    Ok(())
}

/// Anything that can turn a request into a demand forecast
pub trait DemandForecaster {
    fn forecast(&mut self, request: &ForecastRequest) -> Result<DemandForecast>;
}

impl<T: DemandForecaster + ?Sized> DemandForecaster for Box<T> {
    fn forecast(&mut self, request: &ForecastRequest) -> Result<DemandForecast> {
        (**self).forecast(request)
    }
}

/// Wire format printed by an external model process
#[derive(Debug, Deserialize)]
struct ForecasterOutput {
    predictions: Option<ItemQuantities>,
    uncertainty: Option<ItemQuantities>,
    lower_bound: Option<ItemQuantities>,
    upper_bound: Option<ItemQuantities>,
    model_version: Option<String>,
    error: Option<String>,
}

/// Runs an external model: the request goes in as JSON on stdin, the
/// forecast comes back as JSON on stdout.
#[derive(Debug, Clone)]
pub struct SubprocessForecaster {
    program: String,
    args: Vec<String>,
}

impl SubprocessForecaster {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        SubprocessForecaster {
            program: program.into(),
            args,
        }
    }

    fn parse(stdout: &str) -> Result<DemandForecast> {
        let output: ForecasterOutput = serde_json::from_str(stdout.trim())
            .map_err(|e| SimError::forecaster(format!("unparseable output: {}", e)))?;

        if let Some(error) = output.error {
            return Err(SimError::forecaster(format!("model reported: {}", error)));
        }
        let predictions = output
            .predictions
            .ok_or_else(|| SimError::forecaster("output lacks `predictions`"))?;
        let uncertainty = output
            .uncertainty
            .ok_or_else(|| SimError::forecaster("output lacks `uncertainty`"))?;

        Ok(DemandForecast {
            predictions,
            uncertainty,
            lower_bound: output.lower_bound,
            upper_bound: output.upper_bound,
            model_version: output.model_version,
        })
    }
}

impl DemandForecaster for SubprocessForecaster {
    fn forecast(&mut self, request: &ForecastRequest) -> Result<DemandForecast> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| SimError::forecaster(format!("cannot encode request: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SimError::forecaster(format!("cannot start `{}`: {}", self.program, e)))?;

        // A process that exits without reading stdin closes the pipe early; its
        // exit status is the more useful report, so the write error waits.
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| SimError::forecaster(format!("cannot collect output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program = %self.program, status = %output.status, "forecaster failed");
            return Err(SimError::forecaster(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        sent.map_err(|e| SimError::forecaster(format!("cannot send request: {}", e)))?;

        let forecast = Self::parse(&String::from_utf8_lossy(&output.stdout))?;
        validate_forecast(&forecast)?;
        debug!(items = forecast.predictions.len(), "forecast received");
        Ok(forecast)
    }
}

/// Daily sales mean and spread per menu item
const HISTORICAL_SALES: &[(&str, f64, f64)] = &[
    ("burger", 37.0, 5.0),
    ("fries", 32.0, 4.5),
    ("wrap", 36.0, 5.0),
    ("bucket", 35.0, 4.8),
    ("drink", 27.0, 3.5),
];

const PROMOTION_LIFT: f64 = 1.15;

/// Share of daily sales falling into a given hour.
pub fn hourly_share(hour: u32) -> f64 {
    match hour {
        11..=14 => 0.10,
        18..=20 => 0.09,
        _ => 0.04,
    }
}

/// Demand dampening for bad weather.
pub fn weather_adjustment(temperature: f64, rainfall: f64) -> f64 {
    let mut adj = 1.0;
    if rainfall > 5.0 {
        adj *= 0.85;
    } else if rainfall > 0.0 {
        adj *= 0.95;
    }
    if !(5.0..=35.0).contains(&temperature) {
        adj *= 0.90;
    }
    adj
}

/// In-process stand-in for the trained model: samples daily sales from
/// historical distributions and scales them to the requested hour.
#[derive(Debug)]
pub struct HistoricalForecaster<R> {
    rng: R,
}

impl<R: Rng> HistoricalForecaster<R> {
    pub fn new(rng: R) -> Self {
        HistoricalForecaster { rng }
    }
}

impl<R: Rng> DemandForecaster for HistoricalForecaster<R> {
    fn forecast(&mut self, request: &ForecastRequest) -> Result<DemandForecast> {
        let share = hourly_share(request.hour);
        let lift = if request.event_flag != 0 { PROMOTION_LIFT } else { 1.0 };
        let weather = weather_adjustment(request.temperature, request.rainfall);

        let mut predictions = BTreeMap::new();
        let mut uncertainty = BTreeMap::new();
        let mut lower = BTreeMap::new();
        let mut upper = BTreeMap::new();

        for (item, mean, std_dev) in HISTORICAL_SALES {
            let normal = Normal::new(*mean, *std_dev)
                .map_err(|e| SimError::forecaster(format!("bad distribution for {}: {}", item, e)))?;
            let daily = normal.sample(&mut self.rng).max(0.0);
            let hourly = (daily * share * lift * weather).max(0.0);
            let spread = round_dp((std_dev * share * 1.5).max(0.5), 2);

            predictions.insert(item.to_string(), round_dp(hourly, 1));
            uncertainty.insert(item.to_string(), spread);
            lower.insert(item.to_string(), round_dp((hourly - 1.96 * spread).max(0.0), 1));
            upper.insert(item.to_string(), round_dp(hourly + 1.96 * spread, 1));
        }

        Ok(DemandForecast {
            predictions,
            uncertainty,
            lower_bound: Some(lower),
            upper_bound: Some(upper),
            model_version: Some("historical".to_string()),
        })
    }
}

/// Replays a fixed forecast for every request
#[derive(Debug, Clone)]
pub struct StaticForecaster {
    forecast: DemandForecast,
}

impl StaticForecaster {
    pub fn new(forecast: DemandForecast) -> Self {
        StaticForecaster { forecast }
    }
}

impl DemandForecaster for StaticForecaster {
    fn forecast(&mut self, _request: &ForecastRequest) -> Result<DemandForecast> {
        validate_forecast(&self.forecast)?;
        Ok(self.forecast.clone())
    }
}
