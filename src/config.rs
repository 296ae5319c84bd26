/// Engine configuration
/// Every constant the decision engine and the simulator depend on lives here,
/// with defaults matching the documented operating values.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::spoilage::ShelfLifeTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub costs: CostConfig,
    pub shelter: ShelterConfig,
    pub cascade: CascadeConfig,
    pub uncertainty: UncertaintyConfig,
    pub controller: ControllerConfig,
    pub spoilage: SpoilageConfig,
    pub baseline: BaselineConfig,
    pub simulation: SimulationConfig,
}

impl EngineConfig {
    /// Load a JSON config file; sections or fields it omits keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot operate on: inverted factor bounds,
    /// tier shares that overcommit the surplus, rates outside [0, 1], and
    /// negative or non-finite amounts.
    pub fn validate(&self) -> Result<()> {
        let costs = &self.costs;
        non_negative("costs.wasteDisposalPerKg", costs.waste_disposal_per_kg)?;
        non_negative("costs.avgMealPrice", costs.avg_meal_price)?;
        non_negative("costs.transportCost", costs.transport_cost)?;
        non_negative("costs.socialValuePerMeal", costs.social_value_per_meal)?;
        rate("costs.discountRate", costs.discount_rate)?;

        let shelter = &self.shelter;
        rate("shelter.baseNeedScore", shelter.base_need_score)?;
        non_negative("shelter.rainThresholdMm", shelter.rain_threshold_mm)?;
        rate("shelter.rainBonus", shelter.rain_bonus)?;
        rate("shelter.eventBonus", shelter.event_bonus)?;
        rate("shelter.occupancyThreshold", shelter.occupancy_threshold)?;
        rate("shelter.occupancyBonus", shelter.occupancy_bonus)?;

        let cascade = &self.cascade;
        rate("cascade.revenueShare", cascade.revenue_share)?;
        rate("cascade.redistributionShare", cascade.redistribution_share)?;
        rate("cascade.discountRate", cascade.discount_rate)?;
        if cascade.revenue_share + cascade.redistribution_share > 1.0 {
            return Err(SimError::Config(format!(
                "`cascade.revenueShare` + `cascade.redistributionShare` is {}, must not exceed 1",
                cascade.revenue_share + cascade.redistribution_share
            )));
        }

        let uncertainty = &self.uncertainty;
        positive("uncertainty.ceiling", uncertainty.ceiling)?;
        rate("uncertainty.maxBatchReduction", uncertainty.max_batch_reduction)?;
        non_negative("uncertainty.maxBufferIncrease", uncertainty.max_buffer_increase)?;
        rate("uncertainty.baseDiscountThreshold", uncertainty.base_discount_threshold)?;
        rate("uncertainty.discountThresholdDrop", uncertainty.discount_threshold_drop)?;
        rate("uncertainty.mediumLevel", uncertainty.medium_level)?;
        rate("uncertainty.highLevel", uncertainty.high_level)?;
        if uncertainty.medium_level > uncertainty.high_level {
            return Err(SimError::Config(
                "`uncertainty.mediumLevel` must not exceed `uncertainty.highLevel`".to_string(),
            ));
        }

        let controller = &self.controller;
        positive("controller.minFactor", controller.min_factor)?;
        positive("controller.maxFactor", controller.max_factor)?;
        non_negative("controller.initialFactor", controller.initial_factor)?;
        non_negative("controller.deadBand", controller.dead_band)?;
        non_negative("controller.step", controller.step)?;
        if controller.min_factor > controller.max_factor {
            return Err(SimError::Config(format!(
                "`controller.minFactor` ({}) exceeds `controller.maxFactor` ({})",
                controller.min_factor, controller.max_factor
            )));
        }

        let shelf_life = &self.spoilage.shelf_life;
        positive("spoilage.shelfLife.meat", shelf_life.meat)?;
        positive("spoilage.shelfLife.dairy", shelf_life.dairy)?;
        positive("spoilage.shelfLife.vegetables", shelf_life.vegetables)?;
        positive("spoilage.shelfLife.bread", shelf_life.bread)?;

        non_negative("baseline.massPerItemKg", self.baseline.mass_per_item_kg)?;

        let sim = &self.simulation;
        if sim.forecast_hour > 23 {
            return Err(SimError::Config(format!(
                "`simulation.forecastHour` must be 0-23, got {}",
                sim.forecast_hour
            )));
        }
        if !sim.fallback_temperature.is_finite() {
            return Err(SimError::Config("`simulation.fallbackTemperature` must be finite".to_string()));
        }
        non_negative("simulation.noiseAmplitude", sim.noise_amplitude)?;
        non_negative("simulation.wasteKgPerMeal", sim.waste_kg_per_meal)?;
        non_negative("simulation.referenceBaselineWasteKg", sim.reference_baseline_waste_kg)?;
        non_negative("simulation.carbonKgPerKgFood", sim.carbon_kg_per_kg_food)?;
        non_negative("simulation.defaultPrice", sim.default_price)?;
        for (item, price) in &sim.prices {
            non_negative(&format!("simulation.prices.{}", item), *price)?;
        }
        Ok(())
    }

    /// Selling price of a menu item, falling back to the default price.
    pub fn price_of(&self, item: &str) -> f64 {
        self.simulation
            .prices
            .get(item)
            .copied()
            .unwrap_or(self.simulation.default_price)
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::Config(format!("`{}` must be a finite non-negative number, got {}", field, value)))
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::Config(format!("`{}` must be positive, got {}", field, value)))
    }
}

fn rate(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::Config(format!("`{}` must lie in [0, 1], got {}", field, value)))
    }
}

/// Economic parameters, in whole currency units (INR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostConfig {
    pub waste_disposal_per_kg: f64,
    pub avg_meal_price: f64,
    pub transport_cost: f64,
    pub social_value_per_meal: f64,
    pub discount_rate: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            waste_disposal_per_kg: 50.0,
            avg_meal_price: 150.0,
            transport_cost: 500.0,
            social_value_per_meal: 100.0,
            discount_rate: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelterConfig {
    /// Meals per day the partner shelter can take.
    pub capacity: u32,
    pub base_need_score: f64,
    pub occupancy: u32,
    /// Meals dispatched when a redistribution fires with no computed amount.
    pub fallback_meals: u32,
    pub rain_threshold_mm: f64,
    pub rain_bonus: f64,
    pub event_bonus: f64,
    pub occupancy_threshold: f64,
    pub occupancy_bonus: f64,
}

impl Default for ShelterConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            base_need_score: 0.7,
            occupancy: 65,
            fallback_meals: 50,
            rain_threshold_mm: 2.0,
            rain_bonus: 0.1,
            event_bonus: 0.05,
            occupancy_threshold: 0.8,
            occupancy_bonus: 0.1,
        }
    }
}

/// Fixed tier ratios of the cascading disposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CascadeConfig {
    pub revenue_share: f64,
    pub redistribution_share: f64,
    pub discount_rate: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            revenue_share: 0.40,
            redistribution_share: 0.50,
            discount_rate: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UncertaintyConfig {
    /// Mean spread at or above which the normalized factor saturates at 1.
    pub ceiling: f64,
    pub max_batch_reduction: f64,
    pub max_buffer_increase: f64,
    pub base_discount_threshold: f64,
    pub discount_threshold_drop: f64,
    pub medium_level: f64,
    pub high_level: f64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            ceiling: 2.0,
            max_batch_reduction: 0.15,
            max_buffer_increase: 0.25,
            base_discount_threshold: 0.3,
            discount_threshold_drop: 0.1,
            medium_level: 0.3,
            high_level: 0.6,
        }
    }
}

/// Dead-band step controller for the cooking factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    pub initial_factor: f64,
    pub dead_band: f64,
    pub step: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_factor: 1.0,
            dead_band: 3.0,
            step: 0.05,
            min_factor: 0.8,
            max_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpoilageConfig {
    pub shelf_life: ShelfLifeTable,
    /// Ingredient assessed each cycle as the perishable worst case.
    pub representative_ingredient: String,
}

impl Default for SpoilageConfig {
    fn default() -> Self {
        Self {
            shelf_life: ShelfLifeTable::default(),
            representative_ingredient: "chicken".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaselineConfig {
    pub historical_averages: BTreeMap<String, u32>,
    pub mass_per_item_kg: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        let historical_averages = [("burger", 15), ("fries", 20), ("wrap", 10), ("bucket", 8), ("drink", 25)]
            .into_iter()
            .map(|(item, qty)| (item.to_string(), qty))
            .collect();
        Self {
            historical_averages,
            mass_per_item_kg: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Peak hour requested from the forecaster for every simulated day.
    pub forecast_hour: u32,
    pub city: String,
    /// Ambient temperature assumed when a cycle carries no weather record.
    pub fallback_temperature: f64,
    /// Realized demand deviates from forecast by up to ±amplitude/2 of the quantity.
    pub noise_amplitude: f64,
    pub waste_kg_per_meal: f64,
    pub reference_baseline_waste_kg: f64,
    pub carbon_kg_per_kg_food: f64,
    pub prices: BTreeMap<String, f64>,
    pub default_price: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let prices = [("burger", 150.0), ("fries", 80.0), ("wrap", 120.0), ("bucket", 350.0), ("drink", 40.0)]
            .into_iter()
            .map(|(item, price)| (item.to_string(), price))
            .collect();
        Self {
            forecast_hour: 14,
            city: "Delhi".to_string(),
            fallback_temperature: 25.0,
            noise_amplitude: 0.2,
            waste_kg_per_meal: 0.3,
            reference_baseline_waste_kg: 500.0,
            carbon_kg_per_kg_food: 2.5,
            prices,
            default_price: 100.0,
        }
    }
}
