//! Plain-text rendering of a snapshot for the terminal

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::aggregate::round_to;
use crate::models::{GraphNode, Snapshot};

/// Indented chain, depth-first from each root over the current edges
pub fn format_chain(snapshot: &Snapshot) -> String {
    let nodes: HashMap<&str, &GraphNode> = snapshot
        .graph_nodes
        .iter()
        .map(|n| (n.id.as_str(), n))
        .collect();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &snapshot.graph_edges {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut output = String::new();
    for root in snapshot.graph_nodes.iter().filter(|n| n.depth == 0) {
        let mut path = HashSet::new();
        write_node(&mut output, root, &nodes, &children, &mut path, 0);
    }
    output
}

fn write_node<'a>(
    output: &mut String,
    node: &'a GraphNode,
    nodes: &HashMap<&str, &'a GraphNode>,
    children: &HashMap<&str, Vec<&'a str>>,
    path: &mut HashSet<&'a str>,
    indent: usize,
) {
    let prefix = "  ".repeat(indent);
    output.push_str(&format!(
        "{}{:.2}x {} [{}] -> {}\n",
        prefix, node.runs_per_min, node.building, node.recipe_id, node.product
    ));
    for input in &node.inputs {
        output.push_str(&format!(
            "{}  needs {} @ {:.3}/min\n",
            prefix, input.name, input.rate_per_min
        ));
    }

    if !path.insert(node.id.as_str()) {
        output.push_str(&format!("{}  (cycle back to {})\n", prefix, node.id));
        return;
    }
    for child in children.get(node.id.as_str()).into_iter().flatten() {
        if let Some(&child) = nodes.get(child) {
            write_node(output, child, nodes, children, path, indent + 2);
        }
    }
    path.remove(node.id.as_str());
}

/// Runs per minute summed per building
pub fn building_counts(snapshot: &Snapshot) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for node in &snapshot.graph_nodes {
        *counts.entry(node.building.clone()).or_default() += node.runs_per_min;
    }
    counts
        .into_iter()
        .map(|(building, runs)| (building, round_to(runs, 2)))
        .collect()
}

/// Summary of a resolved chain
#[derive(Debug)]
pub struct ChainSummary<'a> {
    pub snapshot: &'a Snapshot,
}

impl std::fmt::Display for ChainSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot;
        writeln!(f, "=== Production Summary ===")?;
        for root in snapshot.graph_nodes.iter().filter(|n| n.depth == 0) {
            if let Some(out) = root.outputs.iter().find(|o| o.is_target) {
                writeln!(f, "Target: {} @ {:.3}/min", root.product, out.rate_per_min)?;
            }
        }
        writeln!(
            f,
            "Steps: {}  Links: {}",
            snapshot.graph_nodes.len(),
            snapshot.graph_edges.len()
        )?;
        writeln!(f)?;

        writeln!(f, "Runs per minute by building:")?;
        for (building, runs) in building_counts(snapshot) {
            writeln!(f, "  {:.2}x {}", runs, building)?;
        }
        writeln!(f)?;

        write_section(f, "Raw inputs required:", &snapshot.totals.raw)?;
        write_section(f, "Byproducts:", &snapshot.totals.byproducts)?;
        write_section(f, "Supply at current frontier:", &snapshot.frontier_needs)?;
        Ok(())
    }
}

fn write_section(
    f: &mut std::fmt::Formatter<'_>,
    title: &str,
    rates: &BTreeMap<String, f64>,
) -> std::fmt::Result {
    writeln!(f, "{}", title)?;
    if rates.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for (name, rate) in rates {
        writeln!(f, "  {} @ {:.2}/min", name, rate)?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RecipeCatalog;
    use crate::models::{Recipe, Target};
    use crate::planner::Planner;

    fn snapshot() -> Snapshot {
        let catalog = RecipeCatalog::from_recipes(vec![
            Recipe::new("gear", "Assembler", 2.0)
                .with_input("Plate", 2.0)
                .with_output("Gear", 1.0),
            Recipe::new("plate", "Furnace", 3.0)
                .with_input("Ore", 1.0)
                .with_output("Plate", 1.0)
                .with_output("Slag", 1.0),
        ])
        .unwrap();
        let mut planner = Planner::new(&catalog);
        planner.set_target(Target::new("Gear", 60.0).unwrap()).unwrap();
        planner.snapshot().clone()
    }

    #[test]
    fn test_format_chain_indents_children() {
        let text = format_chain(&snapshot());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "2.00x Assembler [gear] -> Gear");
        assert_eq!(lines[1], "  needs Plate @ 4.000/min");
        assert!(lines[2].starts_with("    ") && lines[2].contains("[plate] -> Plate"));
    }

    #[test]
    fn test_summary_lists_sections() {
        let snapshot = snapshot();
        let text = ChainSummary {
            snapshot: &snapshot,
        }
        .to_string();
        assert!(text.contains("Target: Gear @ 60.000/min"));
        assert!(text.contains("Raw inputs required:\n  Ore @"));
        assert!(text.contains("Byproducts:\n  Slag @"));
        assert!(text.contains("Supply at current frontier:\n  Ore @"));
    }
}
