//! Roll-ups over a resolved chain

use std::collections::{BTreeMap, HashSet};

use crate::catalog::RecipeCatalog;
use crate::models::{GraphEdge, GraphNode, Totals};

/// Round half away from zero to `precision` decimals
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// Raw-material draw and byproduct output across every node
pub fn totals(catalog: &RecipeCatalog, nodes: &[GraphNode], precision: u32) -> Totals {
    let mut raw: BTreeMap<String, f64> = BTreeMap::new();
    let mut byproducts: BTreeMap<String, f64> = BTreeMap::new();

    for node in nodes {
        for input in node.inputs.iter().filter(|i| !catalog.is_craftable(&i.name)) {
            *raw.entry(catalog.display_name(&input.name)).or_default() += input.rate_per_min;
        }
        for output in node.outputs.iter().filter(|o| !o.is_target) {
            *byproducts
                .entry(catalog.display_name(&output.name))
                .or_default() += output.rate_per_min;
        }
    }

    Totals {
        raw: rounded(raw, precision),
        byproducts: rounded(byproducts, precision),
    }
}

/// Inputs of the current leaf nodes, craftable or not: what has to be
/// supplied by hand at the visible frontier
pub fn frontier_needs(
    catalog: &RecipeCatalog,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    precision: u32,
) -> BTreeMap<String, f64> {
    let with_children: HashSet<&str> = edges.iter().map(|e| e.source.as_str()).collect();
    let mut needs: BTreeMap<String, f64> = BTreeMap::new();

    for node in nodes.iter().filter(|n| !with_children.contains(n.id.as_str())) {
        for input in &node.inputs {
            *needs.entry(catalog.display_name(&input.name)).or_default() += input.rate_per_min;
        }
    }

    rounded(needs, precision)
}

fn rounded(sums: BTreeMap<String, f64>, precision: u32) -> BTreeMap<String, f64> {
    sums.into_iter()
        .map(|(name, total)| (name, round_to(total, precision)))
        .collect()
}
