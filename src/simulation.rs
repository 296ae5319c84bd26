/// Multi-day simulation of the adaptive kitchen against the baseline
/// Days run strictly in order: each day's cooking factor comes out of the
/// previous day's feedback step and inventory is a running total.

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use tracing::{debug, info};

use crate::baseline::BaselineStrategy;
use crate::config::EngineConfig;
use crate::controller::AdaptiveController;
use crate::decision::{make_decision, Action, DecisionInputs, ShelterState};
use crate::demand::{as_quantities, realize_demand, total_units};
use crate::error::{Result, SimError};
use crate::forecast::{validate_forecast, DemandForecaster};
use crate::inventory::{compute_surplus, compute_surplus_risk, compute_usage, Inventory};
use crate::models::{
    round_dp, ComparisonSummary, DayRecord, DaySnapshot, DemandForecast, ForecastRequest, ItemQuantities,
    MetricsSnapshot, PredictResult, RunSummary, SimulationRun, WeatherReport,
};
use crate::weather::WeatherSource;

/// Running totals of the adaptive side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptiveTotals {
    pub waste_reduced_kg: f64,
    pub meals_donated: u32,
    pub revenue_loss: f64,
    pub total_revenue: f64,
}

/// All state one run mutates. Nothing outside it changes between days.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub inventory: Inventory,
    pub shelter: ShelterState,
    pub controller: AdaptiveController,
    pub totals: AdaptiveTotals,
    pub days: Vec<DayRecord>,
}

impl SimulationContext {
    pub fn new(config: &EngineConfig) -> Self {
        SimulationContext {
            inventory: Inventory::default(),
            shelter: ShelterState::new(&config.shelter),
            controller: AdaptiveController::new(&config.controller),
            totals: AdaptiveTotals::default(),
            days: Vec::new(),
        }
    }

    pub fn metrics(&self, config: &EngineConfig) -> MetricsSnapshot {
        let totals = &self.totals;
        let reference = config.simulation.reference_baseline_waste_kg;
        let avg_surplus_risk = if self.days.is_empty() {
            0.0
        } else {
            self.days.iter().map(|d| d.surplus_risk).sum::<f64>() / self.days.len() as f64
        };

        MetricsSnapshot {
            waste_reduction_kg: round_dp(totals.waste_reduced_kg, 1),
            meals_donated: totals.meals_donated,
            revenue_loss: totals.revenue_loss.round(),
            total_revenue: totals.total_revenue.round(),
            waste_reduction_percent: if reference > 0.0 {
                round_dp(totals.waste_reduced_kg / reference * 100.0, 1)
            } else {
                0.0
            },
            avg_surplus_risk: round_dp(avg_surplus_risk, 3),
            days_simulated: self.days.len(),
            final_cooking_factor: round_dp(self.controller.factor(), 2),
            adaptation_count: self.controller.adaptation_count(),
            carbon_saved_kg: round_dp(totals.waste_reduced_kg * config.simulation.carbon_kg_per_kg_food, 1),
            shelter: self.shelter.clone(),
        }
    }
}

/// Collaborator outputs for one day, resolved before any computation
#[derive(Debug, Clone)]
pub struct DayInputs {
    pub day: u32,
    pub date: NaiveDate,
    pub weather: WeatherReport,
    pub forecast: DemandForecast,
    pub event_flag: bool,
}

/// Advance the context by one day: plan production, decide, realize demand,
/// adapt the cooking factor, consume stock and book the metrics.
pub fn advance_day<R: Rng + ?Sized>(
    context: &mut SimulationContext,
    config: &EngineConfig,
    inputs: DayInputs,
    rng: &mut R,
) -> DayRecord {
    let DayInputs {
        day,
        date,
        weather,
        forecast,
        event_flag,
    } = inputs;

    let cooking_factor = context.controller.factor();
    let production: ItemQuantities = forecast
        .predictions
        .iter()
        .map(|(item, qty)| (item.clone(), qty * cooking_factor))
        .collect();

    let usage = compute_usage(&production);
    let surplus = compute_surplus(&usage, &context.inventory);
    let surplus_risk = compute_surplus_risk(&surplus, &context.inventory);

    let decision = make_decision(
        DecisionInputs {
            surplus_risk,
            predictions: &production,
            surplus: &surplus,
            uncertainty: &forecast.uncertainty,
            weather: Some(&weather),
            event_flag,
        },
        config,
        &mut context.shelter,
    );

    let actual_demand = realize_demand(&forecast.predictions, config.simulation.noise_amplitude, rng);

    // Feedback compares against the raw forecast, not the adjusted plan.
    let prediction_error = total_units(&actual_demand) as f64 - forecast.total_predicted();
    context.controller.observe(day, prediction_error, &config.controller);

    context
        .inventory
        .consume(&compute_usage(&as_quantities(&actual_demand)));

    let totals = &mut context.totals;
    totals.waste_reduced_kg += decision.redistribution_amount as f64 * config.simulation.waste_kg_per_meal;
    totals.meals_donated = totals.meals_donated.saturating_add(decision.redistribution_amount);

    let mut revenue = 0.0;
    for (item, actual) in &actual_demand {
        let produced = production.get(item).copied().unwrap_or(0.0);
        revenue += produced.min(*actual as f64) * config.price_of(item);
    }
    if decision.action == Action::Discount {
        let loss = revenue * config.costs.discount_rate;
        revenue -= loss;
        totals.revenue_loss += loss;
    }
    totals.total_revenue += revenue;

    debug!(
        day,
        surplus_risk,
        action = %decision.action,
        prediction_error,
        next_factor = context.controller.factor(),
        "day simulated"
    );

    let record = DayRecord {
        day,
        date,
        weather,
        predictions: forecast.predictions,
        adjusted_predictions: production,
        actual_demand,
        prediction_error: round_dp(prediction_error, 1),
        cooking_factor: round_dp(cooking_factor, 2),
        surplus_risk,
        decision,
        revenue,
        metrics_snapshot: DaySnapshot {
            waste_reduced: round_dp(totals.waste_reduced_kg, 1),
            meals_donated: totals.meals_donated,
            revenue_loss: totals.revenue_loss.round(),
            total_revenue: totals.total_revenue.round(),
        },
    };
    context.days.push(record.clone());
    record
}

/// Adaptive run measured against the baseline, on unrounded totals.
pub fn compare(totals: &AdaptiveTotals, baseline: &BaselineStrategy, config: &EngineConfig) -> ComparisonSummary {
    let food_saved = totals.waste_reduced_kg;
    let baseline_waste = baseline.total_waste_kg();
    let waste_reduction_percent = if baseline_waste > 0.0 {
        food_saved / baseline_waste * 100.0
    } else {
        0.0
    };

    // The baseline never donates.
    let meals_delta = totals.meals_donated as i64;
    let revenue_delta = totals.total_revenue - baseline.total_revenue();

    ComparisonSummary {
        food_saved_kg: round_dp(food_saved, 1),
        waste_reduction_percent: round_dp(waste_reduction_percent, 1),
        meals_donated_delta: meals_delta,
        revenue_delta: revenue_delta.round(),
        net_social_value: (meals_delta as f64 * config.costs.social_value_per_meal + revenue_delta).round(),
    }
}

/// Owns the collaborators, the random source and the run state. Taking
/// `&mut self` everywhere keeps runs strictly one at a time.
pub struct Simulator<F, W, R> {
    config: EngineConfig,
    forecaster: F,
    weather: W,
    rng: R,
    start_date: NaiveDate,
    context: SimulationContext,
}

impl<F, W, R> Simulator<F, W, R>
where
    F: DemandForecaster,
    W: WeatherSource,
    R: Rng,
{
    pub fn new(config: EngineConfig, forecaster: F, weather: W, rng: R, start_date: NaiveDate) -> Self {
        let context = SimulationContext::new(&config);
        Simulator {
            config,
            forecaster,
            weather,
            rng,
            start_date,
            context,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Single decision cycle for explicit conditions. Uses the starting
    /// inventory unless one is supplied.
    pub fn predict(&mut self, request: &ForecastRequest, inventory: Option<&Inventory>) -> Result<PredictResult> {
        let forecast = self.forecaster.forecast(request)?;
        validate_forecast(&forecast)?;

        let default_inventory = Inventory::default();
        let inventory = inventory.unwrap_or(&default_inventory);
        let usage = compute_usage(&forecast.predictions);
        let surplus = compute_surplus(&usage, inventory);
        let surplus_risk = compute_surplus_risk(&surplus, inventory);

        let weather = WeatherReport {
            temperature: request.temperature,
            rainfall: request.rainfall,
            description: String::new(),
            city: self.config.simulation.city.clone(),
            source: "request".to_string(),
        };
        let decision = make_decision(
            DecisionInputs {
                surplus_risk,
                predictions: &forecast.predictions,
                surplus: &surplus,
                uncertainty: &forecast.uncertainty,
                weather: Some(&weather),
                event_flag: request.event_flag != 0,
            },
            &self.config,
            &mut self.context.shelter,
        );

        Ok(PredictResult {
            forecast,
            ingredient_usage: usage,
            surplus,
            surplus_risk,
            decision,
        })
    }

    /// Fetch weather and forecast for `day`, then advance the run state.
    /// A collaborator failure leaves the state untouched.
    pub fn simulate_day(&mut self, day: u32, event_flag: bool) -> Result<DayRecord> {
        let date = self
            .start_date
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| SimError::invalid("day", "date out of range"))?;

        let weather = self.weather.current(&self.config.simulation.city)?;
        let request = ForecastRequest {
            hour: self.config.simulation.forecast_hour,
            day_of_week: date.weekday().num_days_from_sunday(),
            temperature: weather.temperature,
            rainfall: weather.rainfall,
            event_flag: u8::from(event_flag),
        };
        let forecast = self.forecaster.forecast(&request)?;
        validate_forecast(&forecast)?;

        Ok(advance_day(
            &mut self.context,
            &self.config,
            DayInputs {
                day,
                date,
                weather,
                forecast,
                event_flag,
            },
            &mut self.rng,
        ))
    }

    /// Reset, then run `num_days` adaptive days with the baseline in lockstep
    /// on the same realized demand.
    pub fn run(&mut self, num_days: u32, event_days: &[u32]) -> Result<SimulationRun> {
        if num_days == 0 {
            return Err(SimError::invalid("days", "must be at least 1"));
        }
        self.reset();
        info!(num_days, ?event_days, start = %self.start_date, "simulation started");

        let mut baseline = BaselineStrategy::new();
        let mut days = Vec::with_capacity(num_days as usize);

        for day in 0..num_days {
            let record = self.simulate_day(day, event_days.contains(&day))?;
            baseline.simulate_day(day, &record.actual_demand, &self.config);
            days.push(record);
        }

        let adaptive = self.metrics();
        let comparison = compare(&self.context.totals, &baseline, &self.config);
        info!(
            food_saved_kg = comparison.food_saved_kg,
            meals_donated = adaptive.meals_donated,
            revenue_delta = comparison.revenue_delta,
            "simulation finished"
        );

        Ok(SimulationRun {
            days,
            baseline_days: baseline.days().to_vec(),
            summary: RunSummary {
                total_days: num_days,
                adaptive,
                baseline: baseline.metrics(),
                comparison,
            },
            adaptation_history: self.context.controller.history().to_vec(),
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.context.metrics(&self.config)
    }

    /// Clear inventory, shelter, cooking factor, history and metrics.
    pub fn reset(&mut self) {
        self.context = SimulationContext::new(&self.config);
        debug!("simulation state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::StaticForecaster;
    use crate::models::items;
    use crate::weather::FixedWeather;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn forecast() -> DemandForecast {
        DemandForecast::new(
            items([("burger", 3.7), ("fries", 3.2), ("wrap", 3.6), ("bucket", 3.5), ("drink", 2.7)]),
            items([("burger", 0.75), ("fries", 0.68), ("wrap", 0.75), ("bucket", 0.72), ("drink", 0.53)]),
        )
    }

    fn simulator(temperature: f64) -> Simulator<StaticForecaster, FixedWeather, StdRng> {
        Simulator::new(
            EngineConfig::default(),
            StaticForecaster::new(forecast()),
            FixedWeather::new(temperature, 0.0),
            StdRng::seed_from_u64(99),
            start(),
        )
    }

    #[test]
    fn test_advance_day_consumes_inventory() {
        let config = EngineConfig::default();
        let mut context = SimulationContext::new(&config);
        let inputs = DayInputs {
            day: 0,
            date: start(),
            weather: FixedWeather::new(18.0, 0.0).current("Delhi").unwrap(),
            forecast: DemandForecast::new(items([("bucket", 10.0)]), ItemQuantities::new()),
            event_flag: false,
        };
        let mut config = config;
        config.simulation.noise_amplitude = 0.0;

        let record = advance_day(&mut context, &config, inputs, &mut StdRng::seed_from_u64(0));

        assert_eq!(record.actual_demand["bucket"], 10);
        assert_eq!(record.prediction_error, 0.0);
        assert_eq!(context.inventory.quantity("chicken"), 24_000.0);
        assert_eq!(context.controller.history().len(), 1);
        // 10 buckets sold at 350, minus the discount if one fired
        let gross = 3500.0;
        let expected = if record.decision.action == Action::Discount { gross * 0.8 } else { gross };
        assert!((record.revenue - expected).abs() < 1e-6);
    }

    #[test]
    fn test_discount_day_books_revenue_loss() {
        let mut config = EngineConfig::default();
        config.simulation.noise_amplitude = 0.0;
        let mut context = SimulationContext::new(&config);
        // potato is all surplus: 3 kg to waste (150) against a 120 discount
        context.inventory = Inventory::from_stock(items([("potato", 3_000.0)]));
        let inputs = DayInputs {
            day: 0,
            date: start(),
            weather: FixedWeather::new(18.0, 0.0).current("Delhi").unwrap(),
            forecast: DemandForecast::new(items([("drink", 4.0)]), ItemQuantities::new()),
            event_flag: false,
        };

        let record = advance_day(&mut context, &config, inputs, &mut StdRng::seed_from_u64(0));

        assert_eq!(record.decision.action, Action::Discount);
        assert_eq!(record.actual_demand["drink"], 4);
        // 4 drinks at 40, less 20%
        assert!((record.revenue - 128.0).abs() < 1e-9);
        assert!((context.totals.revenue_loss - 32.0).abs() < 1e-9);
        assert!((context.totals.total_revenue - 128.0).abs() < 1e-9);
        assert_eq!(record.metrics_snapshot.revenue_loss, 32.0);
        assert_eq!(context.totals.meals_donated, 0);
        assert_eq!(context.shelter, ShelterState::new(&config.shelter));
    }

    #[test]
    fn test_cooking_factor_scales_production() {
        let config = EngineConfig::default();
        let mut context = SimulationContext::new(&config);
        // 40 predicted, 0 realized: over-prediction pushes the factor down
        context.controller.observe(0, -40.0, &config.controller);
        let inputs = DayInputs {
            day: 1,
            date: start(),
            weather: FixedWeather::new(18.0, 0.0).current("Delhi").unwrap(),
            forecast: DemandForecast::new(items([("burger", 20.0)]), ItemQuantities::new()),
            event_flag: false,
        };

        let record = advance_day(&mut context, &config, inputs, &mut StdRng::seed_from_u64(5));
        assert_eq!(record.cooking_factor, 0.95);
        assert!((record.adjusted_predictions["burger"] - 19.0).abs() < 1e-9);
        assert_eq!(record.predictions["burger"], 20.0);
    }

    #[test]
    fn test_run_produces_paired_days() {
        let mut sim = simulator(22.0);
        let run = sim.run(5, &[2]).unwrap();

        assert_eq!(run.days.len(), 5);
        assert_eq!(run.baseline_days.len(), 5);
        assert_eq!(run.adaptation_history.len(), 5);
        for (adaptive, baseline) in run.days.iter().zip(&run.baseline_days) {
            assert_eq!(adaptive.actual_demand, baseline.actual_demand);
            assert_eq!(baseline.meals_donated, 0);
        }
        // 2026-03-01 is a Sunday
        assert_eq!(run.days[0].date.weekday().num_days_from_sunday(), 0);
        assert_eq!(run.summary.baseline.total_meals_donated, 0);
        assert_eq!(
            run.summary.comparison.meals_donated_delta,
            run.summary.adaptive.meals_donated as i64
        );
    }

    #[test]
    fn test_run_resets_between_runs() {
        let mut sim = simulator(22.0);
        sim.run(3, &[]).unwrap();
        let second = sim.run(2, &[]).unwrap();
        assert_eq!(second.days.len(), 2);
        assert_eq!(sim.context().days.len(), 2);
        assert_eq!(second.adaptation_history[0].old_factor, 1.0);
    }

    #[test]
    fn test_zero_days_rejected() {
        let err = simulator(22.0).run(0, &[]).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput { .. }));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut sim = simulator(22.0);
        sim.run(4, &[1]).unwrap();
        sim.reset();

        let metrics = sim.metrics();
        assert_eq!(metrics.days_simulated, 0);
        assert_eq!(metrics.meals_donated, 0);
        assert_eq!(metrics.total_revenue, 0.0);
        assert_eq!(metrics.final_cooking_factor, 1.0);
        assert_eq!(metrics.shelter, ShelterState::new(&EngineConfig::default().shelter));
        assert_eq!(sim.context().inventory, Inventory::default());
        assert!(sim.context().controller.history().is_empty());
    }

    #[test]
    fn test_predict_uses_request_weather() {
        let mut sim = simulator(22.0);
        let request = ForecastRequest {
            hour: 14,
            day_of_week: 4,
            temperature: 40.0,
            rainfall: 0.0,
            event_flag: 0,
        };
        let result = sim.predict(&request, None).unwrap();
        assert_eq!(result.decision.food_safety.ambient_temp, 40.0);
        assert!(result.decision.action.sends_to_shelter());
        assert!((0.0..=1.0).contains(&result.surplus_risk));
    }

    #[test]
    fn test_compare_against_baseline_waste() {
        let config = EngineConfig::default();
        let mut baseline = BaselineStrategy::new();
        // nothing sells: 78 items at 0.1 kg
        baseline.simulate_day(0, &std::collections::BTreeMap::new(), &config);

        let totals = AdaptiveTotals {
            waste_reduced_kg: 3.9,
            meals_donated: 13,
            revenue_loss: 0.0,
            total_revenue: 1000.0,
        };
        let summary = compare(&totals, &baseline, &config);
        assert_eq!(summary.food_saved_kg, 3.9);
        assert_eq!(summary.waste_reduction_percent, 50.0);
        assert_eq!(summary.meals_donated_delta, 13);
        assert_eq!(summary.revenue_delta, 1000.0);
        assert_eq!(summary.net_social_value, 2300.0);
    }

    #[test]
    fn test_compare_with_empty_baseline() {
        let totals = AdaptiveTotals {
            waste_reduced_kg: 3.0,
            meals_donated: 10,
            revenue_loss: 0.0,
            total_revenue: 1000.0,
        };
        let summary = compare(&totals, &BaselineStrategy::new(), &EngineConfig::default());
        assert_eq!(summary.waste_reduction_percent, 0.0);
        assert_eq!(summary.meals_donated_delta, 10);
        assert_eq!(summary.revenue_delta, 1000.0);
        assert_eq!(summary.net_social_value, 2000.0);
    }
}
