/// Reporting and output formatting module
/// Handles all console output for predictions, simulated days and runs

use crate::controller::AdaptationRecord;
use crate::models::{DayRecord, MetricsSnapshot, PredictResult, SimulationRun};

fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║ {:<76} ║", title);
    println!("╚══════════════════════════════════════════════════════════════════════════════╝\n");
}

/// Display a single decision cycle with its forecast and costs
pub fn display_prediction(result: &PredictResult) {
    banner("SURPLUS DECISION");

    println!("Forecast (units):");
    for (item, qty) in &result.forecast.predictions {
        let spread = result.forecast.uncertainty.get(item).copied().unwrap_or(0.0);
        println!("  {:<8} {:>7.1} ± {:.2}", item, qty, spread);
    }
    println!("  Surplus risk: {:.3}\n", result.surplus_risk);

    let decision = &result.decision;
    println!("Action: {}", decision.action_label);
    if decision.safety_override {
        println!("  (spoilage override)");
    }
    println!("Reason: {}", decision.reason);
    println!("Strategy: {}", decision.chosen_strategy);
    println!(
        "Expected costs: waste INR {} | discount INR {} | redistribute INR {}",
        decision.expected_costs.waste, decision.expected_costs.discount, decision.expected_costs.redistribute
    );
    println!(
        "Food safety: {} at {}°C ({}h of {}h shelf life)",
        decision.food_safety.risk_level,
        decision.food_safety.ambient_temp,
        decision.food_safety.effective_hours,
        decision.food_safety.original_hours
    );

    if !decision.recommendations.is_empty() {
        println!("\nRecommendations:");
        for line in &decision.recommendations {
            println!("  - {}", line);
        }
    }
}

/// Display one simulated day on a single line
pub fn display_day(day: &DayRecord) {
    let predicted: f64 = day.predictions.values().sum();
    let actual: u32 = day.actual_demand.values().sum();
    println!(
        "Day {:>2} {} | {:>5.1}°C | factor {:.2} | forecast {:>6.1} actual {:>4} | risk {:.3} | {:<12} | INR {:.0}",
        day.day + 1,
        day.date,
        day.weather.temperature,
        day.cooking_factor,
        predicted,
        actual,
        day.surplus_risk,
        day.decision.action_label,
        day.revenue
    );
}

/// Display cumulative adaptive metrics
pub fn display_metrics(metrics: &MetricsSnapshot) {
    banner("ADAPTIVE METRICS");

    println!("Days simulated:     {}", metrics.days_simulated);
    println!(
        "Waste reduced:      {} kg ({}% of reference)",
        metrics.waste_reduction_kg, metrics.waste_reduction_percent
    );
    println!("Meals donated:      {}", metrics.meals_donated);
    println!("Revenue:            INR {}", metrics.total_revenue);
    println!("Discount loss:      INR {}", metrics.revenue_loss);
    println!("Avg surplus risk:   {}", metrics.avg_surplus_risk);
    println!("CO2 avoided:        {} kg", metrics.carbon_saved_kg);
    println!(
        "Cooking factor:     {} after {} adjustments",
        metrics.final_cooking_factor, metrics.adaptation_count
    );
    println!(
        "Shelter:            {} meals received, {}/{} occupied",
        metrics.shelter.meals_provided, metrics.shelter.current_occupancy, metrics.shelter.capacity
    );
}

/// Display the days where the cooking factor moved
pub fn display_adaptations(history: &[AdaptationRecord]) {
    let changes: Vec<_> = history.iter().filter(|r| r.changed()).collect();
    if changes.is_empty() {
        println!("\nCooking factor never moved.");
        return;
    }
    println!("\nCooking factor adjustments:");
    for record in changes {
        println!(
            "  Day {:>2}: error {:+.1}, factor {:.2} -> {:.2}",
            record.day + 1,
            record.prediction_error,
            record.old_factor,
            record.new_factor
        );
    }
}

/// Display a full run: daily lines, both strategies and the comparison
pub fn display_run(run: &SimulationRun) {
    banner("ADAPTIVE RUN");
    for day in &run.days {
        display_day(day);
    }
    display_adaptations(&run.adaptation_history);

    display_metrics(&run.summary.adaptive);

    let baseline = &run.summary.baseline;
    banner("BASELINE (FIXED PRODUCTION)");
    println!("Total waste:        {} kg", baseline.total_waste_kg);
    println!("Avg daily waste:    {} kg", baseline.avg_daily_waste);
    println!("Meals donated:      {}", baseline.total_meals_donated);
    println!("Revenue:            INR {}", baseline.total_revenue);

    let comparison = &run.summary.comparison;
    banner("ADAPTIVE vs BASELINE");
    println!("Food saved:         {} kg ({}% of baseline waste)", comparison.food_saved_kg, comparison.waste_reduction_percent);
    println!("Extra meals:        {}", comparison.meals_donated_delta);
    println!("Revenue delta:      INR {}", comparison.revenue_delta);
    println!("Net social value:   INR {}", comparison.net_social_value);
}
