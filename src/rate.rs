//! Per-node throughput arithmetic

use crate::catalog::{normalize_name, output_rate_per_min};
use crate::models::{NodeInput, NodeOutput, Recipe};

/// Throughput of one node at a required output rate
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRates {
    pub runs_per_min: f64,
    pub inputs: Vec<NodeInput>,
    pub outputs: Vec<NodeOutput>,
}

/// Scale `recipe` so that it yields `required_rate` units/min of `product`.
///
/// A recipe that doesn't produce `product` clamps to zero runs.
pub fn compute_rates(recipe: &Recipe, product: &str, required_rate: f64) -> NodeRates {
    let per_run = output_rate_per_min(recipe, product);
    let runs_per_min = if per_run > 0.0 {
        required_rate / per_run
    } else {
        0.0
    };

    let inputs = recipe
        .inputs
        .iter()
        .map(|i| NodeInput {
            name: i.name.trim().to_string(),
            rate_per_min: runs_per_min * i.qty_per_cycle,
        })
        .collect();

    let key = normalize_name(product);
    let mut flagged = false;
    let outputs = recipe
        .outputs
        .iter()
        .map(|o| {
            let is_target = !flagged && normalize_name(&o.name) == key;
            flagged |= is_target;
            NodeOutput {
                name: o.name.trim().to_string(),
                rate_per_min: runs_per_min * (o.qty_per_cycle / recipe.time_sec) * 60.0,
                is_target,
            }
        })
        .collect();

    NodeRates {
        runs_per_min,
        inputs,
        outputs,
    }
}

impl NodeRates {
    /// Combined input rate for every entry matching `name`
    pub fn input_rate(&self, name: &str) -> f64 {
        let key = normalize_name(name);
        self.inputs
            .iter()
            .filter(|i| normalize_name(&i.name) == key)
            .map(|i| i.rate_per_min)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_from_iron_rates() {
        let recipe = Recipe::new("R1", "Assembler", 2.0)
            .with_input("Iron", 2.0)
            .with_output("Gear", 1.0);
        let rates = compute_rates(&recipe, "Gear", 60.0);

        assert_eq!(rates.runs_per_min, 2.0);
        assert_eq!(rates.inputs[0].rate_per_min, 4.0);
        assert_eq!(rates.outputs[0].rate_per_min, 60.0);
        assert!(rates.outputs[0].is_target);
    }

    #[test]
    fn test_byproducts_are_not_flagged() {
        let recipe = Recipe::new("R2", "Foundry", 4.0)
            .with_input("Iron", 3.0)
            .with_output("Gear", 2.0)
            .with_output("Slag", 1.0);
        let rates = compute_rates(&recipe, "gear", 15.0);

        // 2 per 4s = 30/min, so half a run per minute
        assert_eq!(rates.runs_per_min, 0.5);
        assert_eq!(rates.input_rate("IRON"), 1.5);
        assert_eq!(rates.outputs[0].rate_per_min, 15.0);
        assert!(rates.outputs[0].is_target);
        assert_eq!(rates.outputs[1].rate_per_min, 7.5);
        assert!(!rates.outputs[1].is_target);
    }

    #[test]
    fn test_zero_output_rate_clamps_to_zero() {
        let recipe = Recipe::new("R3", "Mixer", 1.0)
            .with_input("Water", 5.0)
            .with_output("Mud", 0.0);
        let rates = compute_rates(&recipe, "Mud", 10.0);

        assert_eq!(rates.runs_per_min, 0.0);
        assert_eq!(rates.inputs[0].rate_per_min, 0.0);
        assert!(rates.outputs.iter().all(|o| o.rate_per_min == 0.0));
    }

    #[test]
    fn test_product_not_produced_flags_nothing() {
        let recipe = Recipe::new("R1", "Assembler", 2.0).with_output("Gear", 1.0);
        let rates = compute_rates(&recipe, "Plate", 10.0);
        assert_eq!(rates.runs_per_min, 0.0);
        assert!(rates.outputs.iter().all(|o| !o.is_target));
    }
}
