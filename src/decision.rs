/// Decision engine
/// Scores the candidate dispositions of the current surplus on expected value,
/// picks one, lets the spoilage model override it, and records any shelter
/// donation in the shared shelter counters.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cascade::{plan_cascade, CascadePlan};
use crate::config::{CostConfig, EngineConfig, ShelterConfig, UncertaintyConfig};
use crate::inventory::surplus_mass_kg;
use crate::models::{round_dp, ItemQuantities, WeatherReport};
use crate::recommendations::build_recommendations;
use crate::spoilage::{RiskLevel, SpoilageAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Normal,
    Discount,
    Redistribute,
    Cascading,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Normal => "Normal Operation",
            Action::Discount => "Apply Discount",
            Action::Redistribute => "Redistribute to Shelter",
            Action::Cascading => "Cascading Value Extraction",
        }
    }

    pub fn sends_to_shelter(&self) -> bool {
        matches!(self, Action::Redistribute | Action::Cascading)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Normal => "normal",
            Action::Discount => "discount",
            Action::Redistribute => "redistribute",
            Action::Cascading => "cascading",
        };
        f.write_str(name)
    }
}

/// Cumulative interaction with the partner shelter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterState {
    pub capacity: u32,
    pub base_need_score: f64,
    pub current_occupancy: u32,
    pub meals_provided: u32,
    pub waste_reduced: f64,
}

impl ShelterState {
    pub fn new(cfg: &ShelterConfig) -> Self {
        ShelterState {
            capacity: cfg.capacity,
            base_need_score: cfg.base_need_score,
            current_occupancy: cfg.occupancy,
            meals_provided: 0,
            waste_reduced: 0.0,
        }
    }

    pub fn occupancy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.current_occupancy as f64 / self.capacity as f64
    }

    /// Contextual demand for donated meals, in [0, 1].
    pub fn need_score(&self, weather: Option<&WeatherReport>, event_flag: bool, cfg: &ShelterConfig) -> f64 {
        let mut need = self.base_need_score;

        if weather.is_some_and(|w| w.rainfall > cfg.rain_threshold_mm) {
            need += cfg.rain_bonus;
        }
        if event_flag {
            need += cfg.event_bonus;
        }
        if self.occupancy_ratio() > cfg.occupancy_threshold {
            need += cfg.occupancy_bonus;
        }

        need.clamp(0.0, 1.0)
    }

    pub fn record_donation(&mut self, meals: u32, waste_kg_per_meal: f64) {
        self.meals_provided = self.meals_provided.saturating_add(meals);
        self.waste_reduced += meals as f64 * waste_kg_per_meal;
    }
}

/// Expected cost of each pure action; smaller is better for all three
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedCosts {
    pub waste: f64,
    pub discount: f64,
    /// Negated net benefit of a shelter redistribution.
    pub redistribute: f64,
    pub details: CostDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDetails {
    pub surplus_kg: f64,
    pub redistribute_amount: u32,
    pub avg_uncertainty: f64,
}

impl ExpectedCosts {
    fn rounded(&self) -> Self {
        ExpectedCosts {
            waste: self.waste.round(),
            discount: self.discount.round(),
            redistribute: self.redistribute.round(),
            details: CostDetails {
                surplus_kg: round_dp(self.details.surplus_kg, 1),
                redistribute_amount: self.details.redistribute_amount,
                avg_uncertainty: round_dp(self.details.avg_uncertainty, 2),
            },
        }
    }
}

/// Mean per-item spread; an empty map counts as no uncertainty.
pub fn mean_uncertainty(uncertainty: &ItemQuantities) -> f64 {
    if uncertainty.is_empty() {
        return 0.0;
    }
    uncertainty.values().sum::<f64>() / uncertainty.len() as f64
}

pub fn expected_costs(
    surplus_risk: f64,
    predictions: &ItemQuantities,
    surplus: &ItemQuantities,
    uncertainty: &ItemQuantities,
    shelter_capacity: u32,
    costs: &CostConfig,
) -> ExpectedCosts {
    let total_demand: f64 = predictions.values().sum();
    let surplus_kg = surplus_mass_kg(surplus);

    let waste = surplus_kg * costs.waste_disposal_per_kg;
    let discount = total_demand * costs.avg_meal_price * costs.discount_rate;

    let redistribute_amount = ((total_demand * surplus_risk).round().max(0.0) as u32).min(shelter_capacity);
    let redistribute_net = redistribute_amount as f64 * costs.social_value_per_meal - costs.transport_cost;

    ExpectedCosts {
        waste,
        discount,
        redistribute: -redistribute_net,
        details: CostDetails {
            surplus_kg,
            redistribute_amount,
            avg_uncertainty: mean_uncertainty(uncertainty),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyLevel {
    Low,
    Medium,
    High,
}

/// Advisory production tweaks; they never change the chosen action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyAdjustment {
    pub batch_multiplier: f64,
    pub redistribution_buffer: f64,
    pub discount_threshold: f64,
    pub reason: String,
    pub uncertainty_level: UncertaintyLevel,
}

pub fn uncertainty_adjustment(uncertainty: &ItemQuantities, cfg: &UncertaintyConfig) -> UncertaintyAdjustment {
    let avg = mean_uncertainty(uncertainty);
    let factor = if cfg.ceiling > 0.0 {
        (avg / cfg.ceiling).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let level = if factor > cfg.high_level {
        UncertaintyLevel::High
    } else if factor > cfg.medium_level {
        UncertaintyLevel::Medium
    } else {
        UncertaintyLevel::Low
    };

    let reason = if level == UncertaintyLevel::High {
        format!("High uncertainty (σ={:.1}) → conservative approach", avg)
    } else {
        format!("Normal uncertainty (σ={:.1}) → standard operations", avg)
    };

    UncertaintyAdjustment {
        batch_multiplier: round_dp(1.0 - factor * cfg.max_batch_reduction, 2),
        redistribution_buffer: round_dp(1.0 + factor * cfg.max_buffer_increase, 2),
        discount_threshold: round_dp(cfg.base_discount_threshold - factor * cfg.discount_threshold_drop, 2),
        reason,
        uncertainty_level: level,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialImpact {
    High,
    Medium,
    Low,
}

impl SocialImpact {
    fn from_priority(priority: f64) -> Self {
        if priority > 0.5 {
            SocialImpact::High
        } else if priority > 0.3 {
            SocialImpact::Medium
        } else {
            SocialImpact::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityMetrics {
    pub shelter_need: f64,
    pub priority_score: f64,
    pub social_impact: SocialImpact,
    /// Set from the unrounded priority score.
    pub high_priority: bool,
}

/// Priority above which a redistribution is flagged as urgent.
pub const HIGH_PRIORITY_SCORE: f64 = 0.6;

/// Economic choice, compared on unrounded figures.
pub fn select_action(costs: &ExpectedCosts, cascade: &CascadePlan) -> Action {
    let waste_value = -costs.waste;
    let redistribute_value = -costs.redistribute;

    if cascade.net_value > redistribute_value && cascade.net_value > waste_value {
        Action::Cascading
    } else if costs.redistribute < costs.waste && costs.redistribute < costs.discount {
        Action::Redistribute
    } else if costs.discount < costs.waste {
        Action::Discount
    } else {
        Action::Normal
    }
}

/// Spoilage risk has the last word over the economic choice.
pub fn apply_safety_override(action: Action, risk: RiskLevel) -> Action {
    match risk {
        RiskLevel::Critical => Action::Redistribute,
        RiskLevel::High if !action.sends_to_shelter() => Action::Cascading,
        _ => action,
    }
}

/// Everything the engine looks at for one cycle
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub surplus_risk: f64,
    pub predictions: &'a ItemQuantities,
    pub surplus: &'a ItemQuantities,
    pub uncertainty: &'a ItemQuantities,
    pub weather: Option<&'a WeatherReport>,
    pub event_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub action: Action,
    pub action_label: String,
    pub discount_percent: u32,
    pub redistribution_amount: u32,
    pub reason: String,
    pub chosen_strategy: String,
    pub safety_override: bool,
    pub surplus_risk: f64,
    pub expected_costs: ExpectedCosts,
    pub uncertainty_adjustment: UncertaintyAdjustment,
    pub equity_metrics: EquityMetrics,
    pub food_safety: SpoilageAssessment,
    pub csve: CascadePlan,
    pub recommendations: Vec<String>,
}

/// Run one decision cycle. The shelter counters are only touched when the
/// final action hands meals to the shelter.
pub fn make_decision(inputs: DecisionInputs<'_>, config: &EngineConfig, shelter: &mut ShelterState) -> Decision {
    let shelter_need = shelter.need_score(inputs.weather, inputs.event_flag, &config.shelter);
    let priority_score = (inputs.surplus_risk * shelter_need).clamp(0.0, 1.0);

    let costs = expected_costs(
        inputs.surplus_risk,
        inputs.predictions,
        inputs.surplus,
        inputs.uncertainty,
        shelter.capacity,
        &config.costs,
    );
    let adjustment = uncertainty_adjustment(inputs.uncertainty, &config.uncertainty);

    let ambient_temp = inputs
        .weather
        .map(|w| w.temperature)
        .unwrap_or(config.simulation.fallback_temperature);
    let food_safety = config
        .spoilage
        .shelf_life
        .assess(&config.spoilage.representative_ingredient, ambient_temp);

    let total_demand: f64 = inputs.predictions.values().sum();
    let cascade = plan_cascade(total_demand, inputs.surplus_risk, &config.costs, &config.cascade);

    let economic = select_action(&costs, &cascade);
    let action = apply_safety_override(economic, food_safety.risk_level);
    let safety_override = action != economic;

    debug!(
        waste = costs.waste,
        discount = costs.discount,
        redistribute = costs.redistribute,
        cascade_net = cascade.net_value,
        %economic,
        "expected costs"
    );
    if safety_override {
        warn!(
            risk = %food_safety.risk_level,
            ambient_temp,
            from = %economic,
            to = %action,
            "spoilage risk overrode economic choice"
        );
    }

    let rounded_costs = costs.rounded();
    let rounded_cascade = rounded_plan(&cascade);
    let heat_risk = matches!(food_safety.risk_level, RiskLevel::Critical | RiskLevel::High);

    let (redistribution_amount, discount_percent, reason, chosen_strategy) = match action {
        Action::Cascading => {
            let reason = if safety_override {
                format!(
                    "SAFETY ALERT: Heat index {}x at {}°C; cascade surplus before it spoils. Recover INR {} revenue + donate {} meals.",
                    food_safety.stress_index,
                    ambient_temp,
                    rounded_cascade.tiers.revenue.value,
                    rounded_cascade.tiers.redistribution.count
                )
            } else {
                format!(
                    "CSVE Optimization: Recover INR {} revenue + donate {} meals.",
                    rounded_cascade.tiers.revenue.value, rounded_cascade.tiers.redistribution.count
                )
            };
            (
                cascade.tiers.redistribution.count,
                0,
                reason,
                "Multi-tier approach maximizes economic & social returns.".to_string(),
            )
        }
        Action::Redistribute => {
            let amount = if costs.details.redistribute_amount > 0 {
                costs.details.redistribute_amount
            } else {
                config.shelter.fallback_meals
            };
            let (reason, strategy) = if heat_risk {
                (
                    format!("SAFETY ALERT: High heat ({}°C) requires immediate redistribution.", ambient_temp),
                    format!("Heat Index {}x forces Cold Chain protocol.", food_safety.stress_index),
                )
            } else {
                (
                    format!(
                        "Expected value optimization: Redistribution provides best outcome (net benefit INR {}).",
                        rounded_costs.redistribute.abs()
                    ),
                    format!(
                        "Waste cost (INR {}) > Redistribution benefit. Priority score: {:.2}",
                        rounded_costs.waste, priority_score
                    ),
                )
            };
            (amount, 0, reason, strategy)
        }
        Action::Discount => (
            0,
            (config.costs.discount_rate * 100.0).round() as u32,
            format!(
                "Expected value optimization: {:.0}% discount minimizes loss (INR {}).",
                config.costs.discount_rate * 100.0,
                rounded_costs.discount
            ),
            format!(
                "Discount loss (INR {}) < Waste cost (INR {})",
                rounded_costs.discount, rounded_costs.waste
            ),
        ),
        Action::Normal => (
            0,
            0,
            "Low surplus risk and costs justify normal operations.".to_string(),
            "All scenarios have minimal expected cost. Continue normal pricing.".to_string(),
        ),
    };

    if action.sends_to_shelter() && redistribution_amount > 0 {
        shelter.record_donation(redistribution_amount, config.simulation.waste_kg_per_meal);
        info!(
            meals = redistribution_amount,
            total_meals = shelter.meals_provided,
            "shelter donation recorded"
        );
    }

    let mut decision = Decision {
        action,
        action_label: action.label().to_string(),
        discount_percent,
        redistribution_amount,
        reason,
        chosen_strategy,
        safety_override,
        surplus_risk: round_dp(inputs.surplus_risk, 3),
        expected_costs: rounded_costs,
        uncertainty_adjustment: adjustment,
        equity_metrics: EquityMetrics {
            shelter_need: round_dp(shelter_need, 2),
            priority_score: round_dp(priority_score, 2),
            social_impact: SocialImpact::from_priority(priority_score),
            high_priority: priority_score > HIGH_PRIORITY_SCORE,
        },
        food_safety,
        csve: rounded_cascade,
        recommendations: Vec::new(),
    };
    decision.recommendations = build_recommendations(&decision, &config.costs);

    decision
}

fn rounded_plan(plan: &CascadePlan) -> CascadePlan {
    let mut rounded = plan.clone();
    rounded.net_value = plan.net_value.round();
    rounded.tiers.revenue.value = plan.tiers.revenue.value.round();
    rounded.tiers.redistribution.value = plan.tiers.redistribution.value.round();
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{compute_surplus, compute_surplus_risk, compute_usage, Inventory};
    use crate::models::items;
    use crate::spoilage::ShelfLifeTable;
    use pretty_assertions::assert_eq;

    fn weather(temperature: f64, rainfall: f64) -> WeatherReport {
        WeatherReport {
            temperature,
            rainfall,
            description: "test".to_string(),
            city: "Delhi".to_string(),
            source: "fixed".to_string(),
        }
    }

    struct Cycle {
        predictions: ItemQuantities,
        surplus: ItemQuantities,
        uncertainty: ItemQuantities,
        risk: f64,
        weather: WeatherReport,
    }

    impl Cycle {
        fn new(predictions: ItemQuantities, inventory: &Inventory, temperature: f64) -> Self {
            let usage = compute_usage(&predictions);
            let surplus = compute_surplus(&usage, inventory);
            let risk = compute_surplus_risk(&surplus, inventory);
            let uncertainty = predictions.keys().map(|k| (k.clone(), 0.1)).collect();
            Cycle {
                predictions,
                surplus,
                uncertainty,
                risk,
                weather: weather(temperature, 0.0),
            }
        }

        fn inputs(&self) -> DecisionInputs<'_> {
            DecisionInputs {
                surplus_risk: self.risk,
                predictions: &self.predictions,
                surplus: &self.surplus,
                uncertainty: &self.uncertainty,
                weather: Some(&self.weather),
                event_flag: false,
            }
        }
    }

    fn fresh_shelter() -> ShelterState {
        ShelterState::new(&ShelterConfig::default())
    }

    #[test]
    fn test_shelter_need() {
        let cfg = ShelterConfig::default();
        let shelter = fresh_shelter();
        assert!((shelter.need_score(None, false, &cfg) - 0.7).abs() < 1e-12);
        assert!((shelter.need_score(Some(&weather(20.0, 3.0)), true, &cfg) - 0.85).abs() < 1e-12);

        let crowded = ShelterState {
            current_occupancy: 95,
            base_need_score: 0.95,
            ..fresh_shelter()
        };
        assert_eq!(crowded.need_score(Some(&weather(20.0, 3.0)), true, &cfg), 1.0);
    }

    #[test]
    fn test_expected_costs_default_inventory() {
        let predictions = items([("burger", 10.0)]);
        let inventory = Inventory::default();
        let surplus = compute_surplus(&compute_usage(&predictions), &inventory);
        let risk = compute_surplus_risk(&surplus, &inventory);

        let costs = expected_costs(risk, &predictions, &surplus, &ItemQuantities::new(), 100, &CostConfig::default());
        assert!((costs.waste - 4024.5).abs() < 1e-6);
        assert!((costs.discount - 300.0).abs() < 1e-6);
        assert_eq!(costs.details.redistribute_amount, 5);
        assert!(costs.redistribute.abs() < 1e-6);
        assert_eq!(costs.details.avg_uncertainty, 0.0);
    }

    #[test]
    fn test_redistribute_amount_capped_by_capacity() {
        let predictions = items([("burger", 500.0)]);
        let costs = expected_costs(0.9, &predictions, &ItemQuantities::new(), &ItemQuantities::new(), 100, &CostConfig::default());
        assert_eq!(costs.details.redistribute_amount, 100);
        assert!((costs.redistribute + 9500.0).abs() < 1e-6);
    }

    #[test]
    fn test_uncertainty_adjustment() {
        let cfg = UncertaintyConfig::default();

        let none = uncertainty_adjustment(&ItemQuantities::new(), &cfg);
        assert_eq!(none.uncertainty_level, UncertaintyLevel::Low);
        assert_eq!(none.batch_multiplier, 1.0);
        assert_eq!(none.discount_threshold, 0.3);

        let medium = uncertainty_adjustment(&items([("burger", 0.8), ("fries", 1.0)]), &cfg);
        assert_eq!(medium.uncertainty_level, UncertaintyLevel::Medium);

        let high = uncertainty_adjustment(&items([("burger", 5.0)]), &cfg);
        assert_eq!(high.uncertainty_level, UncertaintyLevel::High);
        assert_eq!(high.batch_multiplier, 0.85);
        assert_eq!(high.redistribution_buffer, 1.25);
        assert_eq!(high.discount_threshold, 0.2);
    }

    #[test]
    fn test_selection_order() {
        let details = CostDetails {
            surplus_kg: 0.0,
            redistribute_amount: 0,
            avg_uncertainty: 0.0,
        };
        let costs = |waste: f64, discount: f64, redistribute: f64| ExpectedCosts {
            waste,
            discount,
            redistribute,
            details: details.clone(),
        };
        let cascade = |net_value: f64| CascadePlan {
            net_value,
            ..plan_cascade(0.0, 0.0, &CostConfig::default(), &Default::default())
        };

        assert_eq!(select_action(&costs(100.0, 50.0, 10.0), &cascade(200.0)), Action::Cascading);
        // cascade beaten by pure redistribution
        assert_eq!(select_action(&costs(100.0, 50.0, -300.0), &cascade(200.0)), Action::Redistribute);
        assert_eq!(select_action(&costs(100.0, 50.0, 500.0), &cascade(-1000.0)), Action::Discount);
        assert_eq!(select_action(&costs(0.0, 300.0, 500.0), &cascade(0.0)), Action::Normal);
    }

    #[test]
    fn test_safety_override_table() {
        for action in [Action::Normal, Action::Discount, Action::Redistribute, Action::Cascading] {
            assert_eq!(apply_safety_override(action, RiskLevel::Critical), Action::Redistribute);
            assert_eq!(apply_safety_override(action, RiskLevel::Low), action);
            assert_eq!(apply_safety_override(action, RiskLevel::Medium), action);
        }
        assert_eq!(apply_safety_override(Action::Normal, RiskLevel::High), Action::Cascading);
        assert_eq!(apply_safety_override(Action::Discount, RiskLevel::High), Action::Cascading);
        assert_eq!(apply_safety_override(Action::Redistribute, RiskLevel::High), Action::Redistribute);
    }

    #[test]
    fn test_tight_inventory_stays_normal() {
        let inventory = Inventory::from_stock(items([("bun", 10.0), ("patty", 10.0), ("lettuce", 200.0), ("tomato", 150.0)]));
        let cycle = Cycle::new(items([("burger", 10.0)]), &inventory, 22.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(cycle.inputs(), &EngineConfig::default(), &mut shelter);
        assert_eq!(decision.action, Action::Normal);
        assert_eq!(decision.surplus_risk, 0.0);
        assert!(!decision.safety_override);
        assert_eq!(shelter, fresh_shelter());
        assert_eq!(decision.recommendations[0], "Continue standard operations");
    }

    #[test]
    fn test_ample_inventory_redistributes() {
        let cycle = Cycle::new(items([("burger", 10.0)]), &Inventory::default(), 22.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(cycle.inputs(), &EngineConfig::default(), &mut shelter);
        assert_eq!(decision.action, Action::Redistribute);
        assert_eq!(decision.redistribution_amount, 5);
        assert_eq!(shelter.meals_provided, 5);
        assert!((shelter.waste_reduced - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_heat_forces_cascading() {
        let inventory = Inventory::from_stock(items([("bun", 10.0), ("patty", 10.0), ("lettuce", 200.0), ("tomato", 150.0)]));
        let cycle = Cycle::new(items([("burger", 10.0)]), &inventory, 40.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(cycle.inputs(), &EngineConfig::default(), &mut shelter);
        assert_eq!(decision.food_safety.risk_level, RiskLevel::High);
        assert_eq!(decision.action, Action::Cascading);
        assert!(decision.safety_override);
        assert!(decision.reason.starts_with("SAFETY ALERT"));
        // nothing to donate, so the shelter is untouched
        assert_eq!(decision.redistribution_amount, 0);
        assert_eq!(shelter.meals_provided, 0);
    }

    #[test]
    fn test_critical_forces_redistribute() {
        let mut config = EngineConfig::default();
        config.spoilage.shelf_life = ShelfLifeTable {
            meat: 24.0,
            ..ShelfLifeTable::default()
        };
        let inventory = Inventory::from_stock(items([("bun", 10.0), ("patty", 10.0), ("lettuce", 200.0), ("tomato", 150.0)]));
        let cycle = Cycle::new(items([("burger", 10.0)]), &inventory, 45.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(cycle.inputs(), &config, &mut shelter);
        assert_eq!(decision.food_safety.risk_level, RiskLevel::Critical);
        assert_eq!(decision.action, Action::Redistribute);
        assert_eq!(decision.redistribution_amount, config.shelter.fallback_meals);
        assert_eq!(shelter.meals_provided, 50);
        assert!(decision.recommendations.iter().any(|r| r.starts_with("CRITICAL")));
    }

    #[test]
    fn test_cascading_donation_updates_shelter() {
        let predictions = items([("burger", 500.0)]);
        let surplus = items([("chicken", 10_000.0)]);
        let uncertainty = ItemQuantities::new();
        let mild = weather(15.0, 0.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(
            DecisionInputs {
                surplus_risk: 0.5,
                predictions: &predictions,
                surplus: &surplus,
                uncertainty: &uncertainty,
                weather: Some(&mild),
                event_flag: false,
            },
            &EngineConfig::default(),
            &mut shelter,
        );

        assert_eq!(decision.action, Action::Cascading);
        assert!(!decision.safety_override);
        assert_eq!(decision.csve.tiers.redistribution.count, 125);
        assert_eq!(shelter.meals_provided, 125);
        assert!((shelter.waste_reduced - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_discount_leaves_shelter_alone() {
        let predictions = items([("drink", 4.0)]);
        let surplus = items([("potato", 3_000.0)]);
        let uncertainty = ItemQuantities::new();
        let cold = weather(2.0, 0.0);
        let mut shelter = fresh_shelter();

        let decision = make_decision(
            DecisionInputs {
                surplus_risk: 0.75,
                predictions: &predictions,
                surplus: &surplus,
                uncertainty: &uncertainty,
                weather: Some(&cold),
                event_flag: false,
            },
            &EngineConfig::default(),
            &mut shelter,
        );

        assert_eq!(decision.action, Action::Discount);
        assert_eq!(decision.redistribution_amount, 0);
        assert_eq!(shelter, fresh_shelter());
    }

    #[test]
    fn test_donation_counter_saturates() {
        let mut shelter = ShelterState {
            meals_provided: u32::MAX - 1,
            ..fresh_shelter()
        };
        shelter.record_donation(5, 0.3);
        assert_eq!(shelter.meals_provided, u32::MAX);
    }

    #[test]
    fn test_identical_inputs_identical_decision() {
        let cycle = Cycle::new(items([("burger", 12.0), ("wrap", 4.0), ("drink", 9.0)]), &Inventory::default(), 28.0);
        let config = EngineConfig::default();
        let mut shelter = fresh_shelter();

        let first = make_decision(cycle.inputs(), &config, &mut shelter);
        let second = make_decision(cycle.inputs(), &config, &mut fresh_shelter());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_weather_uses_fallback_temperature() {
        let cycle = Cycle::new(items([("fries", 3.0)]), &Inventory::default(), 0.0);
        let inputs = DecisionInputs {
            weather: None,
            ..cycle.inputs()
        };
        let decision = make_decision(inputs, &EngineConfig::default(), &mut fresh_shelter());
        assert_eq!(decision.food_safety.ambient_temp, 25.0);
        assert_eq!(decision.food_safety.stress_index, 1.2);
    }
}
