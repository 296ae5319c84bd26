/// Operational recommendations attached to a decision

use crate::config::CostConfig;
use crate::decision::{Action, Decision, UncertaintyLevel};
use crate::spoilage::logistics_alerts;

/// Ordered instructions: action-specific steps, then uncertainty warnings,
/// then cold-chain alerts.
pub fn build_recommendations(decision: &Decision, costs: &CostConfig) -> Vec<String> {
    let mut recs = Vec::new();

    match decision.action {
        Action::Cascading => {
            let tiers = &decision.csve.tiers;
            recs.push(format!(
                "Revenue: Sell {} items @ {:.0}% off",
                tiers.revenue.count,
                costs.discount_rate * 100.0
            ));
            recs.push(format!(
                "Redistribute: {} meals (Pickup 2PM)",
                tiers.redistribution.count
            ));
            recs.push(format!("Buffer: Keep {} items for late rush", tiers.buffer.count));
            recs.push(format!(
                "Net Value: INR {} (vs INR {} if wasted)",
                decision.csve.net_value, -decision.expected_costs.waste
            ));
        }
        Action::Redistribute => {
            recs.push(format!(
                "Contact shelter for immediate pickup of {} meals",
                decision.redistribution_amount
            ));
            recs.push(format!(
                "Estimated social value: INR {}",
                decision.redistribution_amount as f64 * costs.social_value_per_meal
            ));
            if decision.equity_metrics.high_priority {
                recs.push(format!(
                    "High priority: Shelter need score is {}",
                    decision.equity_metrics.shelter_need
                ));
            }
        }
        Action::Discount => {
            recs.push(format!(
                "Apply {}% discount to accelerate sales",
                decision.discount_percent
            ));
            recs.push("Monitor sales velocity for next 2 hours".to_string());
        }
        Action::Normal => {
            recs.push("Continue standard operations".to_string());
            recs.push("Stock levels optimal for predicted demand".to_string());
        }
    }

    let adjustment = &decision.uncertainty_adjustment;
    if adjustment.uncertainty_level == UncertaintyLevel::High {
        recs.push(format!(
            "High uncertainty: Reduce batch size to {:.0}%",
            adjustment.batch_multiplier * 100.0
        ));
    }

    recs.extend(logistics_alerts(&decision.food_safety));
    recs
}
