/// Baseline strategy
/// A non-adaptive producer that always cooks its historical averages, never
/// discounts and never donates. It exists only as the counterfactual the
/// adaptive run is measured against.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::models::{round_dp, BaselineDay, BaselineMetrics};

#[derive(Debug, Clone, Default)]
pub struct BaselineStrategy {
    total_waste_kg: f64,
    total_revenue: f64,
    days: Vec<BaselineDay>,
}

impl BaselineStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the historical averages against the day's realized demand.
    pub fn simulate_day(
        &mut self,
        day: u32,
        actual_demand: &BTreeMap<String, u32>,
        config: &EngineConfig,
    ) -> BaselineDay {
        let production = config.baseline.historical_averages.clone();

        let mut waste = BTreeMap::new();
        let mut waste_kg = 0.0;
        let mut revenue = 0.0;

        for (item, produced) in &production {
            let actual = actual_demand.get(item).copied().unwrap_or(0);
            let unsold = produced.saturating_sub(actual);
            waste.insert(item.clone(), unsold);
            waste_kg += unsold as f64 * config.baseline.mass_per_item_kg;

            let sold = (*produced).min(actual);
            revenue += sold as f64 * config.price_of(item);
        }

        self.total_waste_kg += waste_kg;
        self.total_revenue += revenue;

        let record = BaselineDay {
            day,
            production,
            actual_demand: actual_demand.clone(),
            waste,
            waste_kg,
            meals_donated: 0,
            discount_revenue_loss: 0.0,
            revenue,
        };
        self.days.push(record.clone());
        record
    }

    pub fn days(&self) -> &[BaselineDay] {
        &self.days
    }

    pub fn metrics(&self) -> BaselineMetrics {
        let avg_daily_waste = if self.days.is_empty() {
            0.0
        } else {
            round_dp(self.total_waste_kg / self.days.len() as f64, 1)
        };
        BaselineMetrics {
            total_waste_kg: round_dp(self.total_waste_kg, 1),
            total_meals_donated: 0,
            revenue_loss: 0.0,
            total_revenue: self.total_revenue.round(),
            avg_daily_waste,
        }
    }

    /// Unrounded cumulative waste, for comparisons.
    pub fn total_waste_kg(&self) -> f64 {
        self.total_waste_kg
    }

    pub fn total_revenue(&self) -> f64 {
        self.total_revenue
    }
}
