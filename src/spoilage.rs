/// Temperature-driven spoilage model
/// Shelf life shrinks as ambient heat rises; the shortened life is bucketed
/// into a risk level that can override the economic decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::round_dp;

const DANGER_ZONE_MIN_C: f64 = 5.0;
const DANGER_ZONE_MAX_C: f64 = 60.0;
const FREEZER_TARGET_C: f64 = -18.0;
const THERMAL_INGRESS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Meat,
    Dairy,
    Vegetables,
    Bread,
}

impl FoodCategory {
    /// Unknown ingredients are treated as vegetables.
    pub fn of(ingredient: &str) -> Self {
        match ingredient {
            "chicken" | "meat" | "patty" => FoodCategory::Meat,
            "cheese" | "milk" | "sauce" => FoodCategory::Dairy,
            "bun" | "tortilla" => FoodCategory::Bread,
            _ => FoodCategory::Vegetables,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_effective_hours(hours: f64) -> Self {
        if hours < 12.0 {
            RiskLevel::Critical
        } else if hours < 24.0 {
            RiskLevel::High
        } else if hours < 48.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Shelf life in hours at refrigeration temperature, per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelfLifeTable {
    pub meat: f64,
    pub dairy: f64,
    pub vegetables: f64,
    pub bread: f64,
}

impl Default for ShelfLifeTable {
    fn default() -> Self {
        Self {
            meat: 48.0,
            dairy: 72.0,
            vegetables: 120.0,
            bread: 120.0,
        }
    }
}

impl ShelfLifeTable {
    pub fn hours_for(&self, category: FoodCategory) -> f64 {
        match category {
            FoodCategory::Meat => self.meat,
            FoodCategory::Dairy => self.dairy,
            FoodCategory::Vegetables => self.vegetables,
            FoodCategory::Bread => self.bread,
        }
    }

    /// Assess the thermal risk of one ingredient at an ambient temperature.
    pub fn assess(&self, ingredient: &str, ambient_temp: f64) -> SpoilageAssessment {
        let category = FoodCategory::of(ingredient);
        let original_hours = self.hours_for(category);
        let stress_index = stress_index(ambient_temp);
        let effective_hours = (original_hours / stress_index).round();

        SpoilageAssessment {
            ambient_temp,
            estimated_frozen_temp: estimated_frozen_temp(ambient_temp),
            original_hours,
            effective_hours,
            stress_index,
            risk_level: RiskLevel::from_effective_hours(effective_hours),
            is_danger_zone: is_danger_zone(ambient_temp),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoilageAssessment {
    pub ambient_temp: f64,
    /// Display only; plays no part in the risk level.
    pub estimated_frozen_temp: f64,
    pub original_hours: f64,
    pub effective_hours: f64,
    pub stress_index: f64,
    pub risk_level: RiskLevel,
    pub is_danger_zone: bool,
    pub category: FoodCategory,
}

/// Heat multiplier on spoilage speed.
pub fn stress_index(ambient_temp: f64) -> f64 {
    if ambient_temp > 35.0 {
        2.5
    } else if ambient_temp > 30.0 {
        2.0
    } else if ambient_temp > 25.0 {
        1.5
    } else if ambient_temp > 20.0 {
        1.2
    } else {
        1.0
    }
}

pub fn is_danger_zone(ambient_temp: f64) -> bool {
    (DANGER_ZONE_MIN_C..=DANGER_ZONE_MAX_C).contains(&ambient_temp)
}

/// Freezer temperature after thermal ingress from the ambient air, 1 dp.
pub fn estimated_frozen_temp(ambient_temp: f64) -> f64 {
    let mut temp = FREEZER_TARGET_C;
    if ambient_temp > FREEZER_TARGET_C {
        temp += (ambient_temp - FREEZER_TARGET_C) * THERMAL_INGRESS;
    }
    round_dp(temp, 1)
}

/// Cold-chain alerts triggered by the assessment, most urgent last.
pub fn logistics_alerts(assessment: &SpoilageAssessment) -> Vec<String> {
    let mut alerts = Vec::new();

    if assessment.is_danger_zone {
        alerts.push(format!(
            "WARNING: Ambient temp {}°C is in the Danger Zone.",
            assessment.ambient_temp
        ));
    }

    match assessment.risk_level {
        RiskLevel::Critical => {
            alerts.push(format!(
                "CRITICAL: Effective shelf life dropped to {}h.",
                assessment.effective_hours
            ));
            alerts.push("Action: Cold chain dispatch required within 2 hours.".to_string());
        }
        RiskLevel::High => {
            let reduction = 100.0 * (1.0 - 1.0 / assessment.stress_index);
            alerts.push(format!(
                "HIGH RISK: Heat stress reduces life by {:.0}%. Expedite.",
                reduction
            ));
        }
        RiskLevel::Medium | RiskLevel::Low => {}
    }

    alerts
}
