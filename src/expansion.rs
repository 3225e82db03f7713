//! Per-node expansion budgets
//!
//! A budget is the number of extra upstream hops the user asked to see
//! starting from one exact node. Budgets are keyed by node id; a product-wide
//! budget is simply the same value on every node of that product.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::models::GraphEdge;

/// `expandBranchAll` hop count
pub const EXPAND_ALL_HOPS: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionBudgets {
    by_node: BTreeMap<String, u32>,
}

impl ExpansionBudgets {
    pub fn get(&self, node_id: &str) -> u32 {
        self.by_node.get(node_id).copied().unwrap_or(0)
    }

    /// Non-zero budgets in node-id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_node.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    pub fn set(&mut self, node_id: &str, hops: u32) {
        if hops == 0 {
            self.by_node.remove(node_id);
        } else {
            self.by_node.insert(node_id.to_string(), hops);
        }
    }

    pub fn expand_once(&mut self, node_id: &str) {
        self.expand_by(node_id, 1);
    }

    /// Adds at least one hop
    pub fn expand_by(&mut self, node_id: &str, hops: u32) {
        let next = self.get(node_id).saturating_add(hops.max(1));
        self.set(node_id, next);
    }

    pub fn reset(&mut self) {
        self.by_node.clear();
    }

    /// Zero `node_id` and every ancestor reachable over reversed `edges`.
    /// Returns the ids that were visited.
    pub fn collapse_branch(&mut self, node_id: &str, edges: &[GraphEdge]) -> Vec<String> {
        let ancestors = ancestors_of(node_id, edges);
        for id in &ancestors {
            self.by_node.remove(id);
        }
        ancestors
    }

    /// Move the budget from `old_id` to `new_id`, merging by max
    pub fn migrate(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id {
            return;
        }
        if let Some(moved) = self.by_node.remove(old_id) {
            let merged = self.get(new_id).max(moved);
            self.set(new_id, merged);
        }
    }
}

/// Breadth-first walk from `node_id` towards its consumers, including itself
pub fn ancestors_of(node_id: &str, edges: &[GraphEdge]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([node_id]);
    seen.insert(node_id);

    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());
        for edge in edges.iter().filter(|e| e.target == current) {
            if seen.insert(edge.source.as_str()) {
                queue.push_back(edge.source.as_str());
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_once_and_by() {
        let mut budgets = ExpansionBudgets::default();
        budgets.expand_once("Gear::R1");
        budgets.expand_once("Gear::R1");
        assert_eq!(budgets.get("Gear::R1"), 2);

        budgets.expand_by("Gear::R1", 0);
        assert_eq!(budgets.get("Gear::R1"), 3);

        budgets.expand_by("Plate::P1", 4);
        assert_eq!(budgets.get("Plate::P1"), 4);
    }

    #[test]
    fn test_reset() {
        let mut budgets = ExpansionBudgets::default();
        budgets.expand_by("a", 3);
        budgets.reset();
        assert!(budgets.is_empty());
    }

    #[test]
    fn test_migrate_merges_by_max() {
        let mut budgets = ExpansionBudgets::default();
        budgets.set("Plate::old", 2);
        budgets.set("Plate::new", 5);
        budgets.migrate("Plate::old", "Plate::new");
        assert_eq!(budgets.get("Plate::old"), 0);
        assert_eq!(budgets.get("Plate::new"), 5);

        budgets.set("Plate::old", 7);
        budgets.migrate("Plate::old", "Plate::new");
        assert_eq!(budgets.get("Plate::new"), 7);
    }

    #[test]
    fn test_collapse_walks_reversed_edges() {
        let edges = vec![
            GraphEdge::new("root", "mid", "Mid"),
            GraphEdge::new("mid", "leaf", "Leaf"),
            GraphEdge::new("other", "leaf", "Leaf"),
            GraphEdge::new("root", "side", "Side"),
        ];
        let mut budgets = ExpansionBudgets::default();
        for id in ["root", "mid", "leaf", "other", "side"] {
            budgets.set(id, 3);
        }

        let visited = budgets.collapse_branch("leaf", &edges);
        assert_eq!(visited, vec!["leaf", "mid", "other", "root"]);
        assert_eq!(budgets.get("root"), 0);
        assert_eq!(budgets.get("other"), 0);
        assert_eq!(budgets.get("side"), 3);
    }
}
