/// Ingredient inventory and surplus risk
/// Converts item-level demand into ingredient usage, compares it with stock on
/// hand and condenses the leftover into a single 0-1 risk score.

use std::collections::BTreeMap;

use crate::models::ItemQuantities;

/// Per-unit ingredient requirements of each menu item (units or grams)
const RECIPES: &[(&str, &[(&str, f64)])] = &[
    ("burger", &[("bun", 1.0), ("patty", 1.0), ("lettuce", 20.0), ("tomato", 15.0)]),
    ("fries", &[("potato", 150.0)]),
    ("wrap", &[("tortilla", 1.0), ("chicken", 80.0), ("lettuce", 30.0), ("sauce", 20.0)]),
    ("bucket", &[("chicken", 600.0)]),
    ("drink", &[("syrup", 50.0), ("water", 300.0), ("ice", 100.0)]),
];

/// Stock on hand at the start of every run
const DEFAULT_STOCK: &[(&str, f64)] = &[
    ("bun", 500.0),
    ("patty", 500.0),
    ("lettuce", 10_000.0),
    ("tomato", 5_000.0),
    ("potato", 50_000.0),
    ("tortilla", 300.0),
    ("chicken", 30_000.0),
    ("sauce", 5_000.0),
    ("syrup", 10_000.0),
    ("water", 100_000.0),
    ("ice", 20_000.0),
];

/// How urgently unused stock of an ingredient expires (0-1)
const EXPIRY_WEIGHTS: &[(&str, f64)] = &[
    ("bun", 0.8),
    ("patty", 0.9),
    ("lettuce", 0.7),
    ("tomato", 0.6),
    ("potato", 0.5),
    ("tortilla", 0.7),
    ("chicken", 0.9),
    ("sauce", 0.3),
    ("syrup", 0.2),
    ("water", 0.1),
    ("ice", 0.1),
];

const UNKNOWN_EXPIRY_WEIGHT: f64 = 0.5;

/// Ingredients whose leftover counts towards surplus mass
pub const MASS_INGREDIENTS: &[&str] = &["chicken", "potato", "patty"];

pub fn recipe_for(item: &str) -> Option<&'static [(&'static str, f64)]> {
    RECIPES
        .iter()
        .find(|(name, _)| *name == item)
        .map(|(_, ingredients)| *ingredients)
}

pub fn expiry_weight(ingredient: &str) -> f64 {
    EXPIRY_WEIGHTS
        .iter()
        .find(|(name, _)| *name == ingredient)
        .map(|(_, weight)| *weight)
        .unwrap_or(UNKNOWN_EXPIRY_WEIGHT)
}

/// Ingredient stock on hand; quantities never go negative
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    stock: ItemQuantities,
}

impl Default for Inventory {
    fn default() -> Self {
        Inventory {
            stock: DEFAULT_STOCK
                .iter()
                .map(|(name, qty)| (name.to_string(), *qty))
                .collect(),
        }
    }
}

impl Inventory {
    pub fn from_stock(stock: ItemQuantities) -> Self {
        Inventory {
            stock: stock
                .into_iter()
                .map(|(name, qty)| (name, qty.max(0.0)))
                .collect(),
        }
    }

    pub fn stock(&self) -> &ItemQuantities {
        &self.stock
    }

    pub fn quantity(&self, ingredient: &str) -> f64 {
        self.stock.get(ingredient).copied().unwrap_or(0.0)
    }

    /// Remove realized usage from stock, flooring every ingredient at zero.
    /// Usage of ingredients not stocked is ignored.
    pub fn consume(&mut self, usage: &ItemQuantities) {
        for (ingredient, used) in usage {
            if let Some(qty) = self.stock.get_mut(ingredient) {
                *qty = (*qty - used).max(0.0);
            }
        }
    }
}

/// Ingredient consumption implied by a set of item quantities.
/// Items without a recipe and non-positive quantities contribute nothing.
pub fn compute_usage(predictions: &ItemQuantities) -> ItemQuantities {
    let mut usage = BTreeMap::new();

    for (item, quantity) in predictions {
        if *quantity <= 0.0 {
            continue;
        }
        let Some(ingredients) = recipe_for(item) else {
            continue;
        };
        for (ingredient, per_unit) in ingredients {
            *usage.entry(ingredient.to_string()).or_insert(0.0) += quantity * per_unit;
        }
    }

    usage
}

/// Leftover stock per ingredient after the predicted usage.
pub fn compute_surplus(usage: &ItemQuantities, inventory: &Inventory) -> ItemQuantities {
    inventory
        .stock()
        .iter()
        .map(|(ingredient, qty)| {
            let predicted = usage.get(ingredient).copied().unwrap_or(0.0);
            (ingredient.clone(), (qty - predicted).max(0.0))
        })
        .collect()
}

/// Mean over stocked ingredients of `surplus ratio x expiry weight`.
pub fn compute_surplus_risk(surplus: &ItemQuantities, inventory: &Inventory) -> f64 {
    let mut total_risk = 0.0;
    let mut count = 0usize;

    for ingredient in inventory.stock().keys() {
        let surplus_qty = surplus.get(ingredient).copied().unwrap_or(0.0);
        // Empty stock divides by one instead of zero.
        let stocked = inventory.quantity(ingredient);
        let base = if stocked > 0.0 { stocked } else { 1.0 };
        let ratio = (surplus_qty / base).clamp(0.0, 1.0);

        total_risk += ratio * expiry_weight(ingredient);
        count += 1;
    }

    if count > 0 {
        total_risk / count as f64
    } else {
        0.0
    }
}

/// Surplus mass (kg) of the ingredients that dominate disposal weight.
pub fn surplus_mass_kg(surplus: &ItemQuantities) -> f64 {
    MASS_INGREDIENTS
        .iter()
        .map(|ingredient| surplus.get(*ingredient).copied().unwrap_or(0.0))
        .sum::<f64>()
        / 1000.0
}
