/// Cascading surplus value extraction
/// Splits the estimated surplus into a discounted-sale tier, a shelter
/// donation tier and a retained buffer, and values the split.

use serde::{Deserialize, Serialize};

use crate::config::{CascadeConfig, CostConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub count: u32,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeTiers {
    pub revenue: Tier,
    pub redistribution: Tier,
    pub buffer: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadePlan {
    pub total_surplus: u32,
    /// Unrounded; the decision compares on this.
    pub net_value: f64,
    pub tiers: CascadeTiers,
}

impl CascadePlan {
    pub fn tier_total(&self) -> u32 {
        self.tiers
            .revenue
            .count
            .saturating_add(self.tiers.redistribution.count)
            .saturating_add(self.tiers.buffer.count)
    }
}

/// Estimated surplus item count for a demand total and risk score.
pub fn estimated_surplus_items(total_demand: f64, surplus_risk: f64) -> u32 {
    (total_demand * surplus_risk).round().max(0.0) as u32
}

pub fn plan_cascade(
    total_demand: f64,
    surplus_risk: f64,
    costs: &CostConfig,
    cascade: &CascadeConfig,
) -> CascadePlan {
    let total = estimated_surplus_items(total_demand, surplus_risk);

    let revenue_items = ((total as f64 * cascade.revenue_share).floor() as u32).min(total);
    let discounted_price = costs.avg_meal_price * (1.0 - cascade.discount_rate);
    let revenue_value = revenue_items as f64 * discounted_price;

    let redistribution_items =
        ((total as f64 * cascade.redistribution_share).floor() as u32).min(total.saturating_sub(revenue_items));
    let social_value = redistribution_items as f64 * costs.social_value_per_meal;

    let buffer_items = total.saturating_sub(revenue_items + redistribution_items);

    let transport_cost = if redistribution_items > 0 {
        costs.transport_cost
    } else {
        0.0
    };

    CascadePlan {
        total_surplus: total,
        net_value: revenue_value + social_value - transport_cost,
        tiers: CascadeTiers {
            revenue: Tier {
                count: revenue_items,
                value: revenue_value,
                label: "Flash Discount".to_string(),
            },
            redistribution: Tier {
                count: redistribution_items,
                value: social_value,
                label: "Shelter Commit".to_string(),
            },
            buffer: Tier {
                count: buffer_items,
                value: 0.0,
                label: "Safety Stock".to_string(),
            },
        },
    }
}
