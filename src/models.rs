//! Data models for recipes, targets and the resolved production graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One `{name, qtyPerCycle}` entry of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeItem {
    pub name: String,
    pub qty_per_cycle: f64,
}

impl RecipeItem {
    pub fn new(name: impl Into<String>, qty_per_cycle: f64) -> Self {
        Self {
            name: name.into(),
            qty_per_cycle,
        }
    }
}

/// A conversion rule run by a building, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_id: String,
    pub building: String,
    pub time_sec: f64,
    #[serde(default)]
    pub inputs: Vec<RecipeItem>,
    #[serde(default)]
    pub outputs: Vec<RecipeItem>,
}

impl Recipe {
    pub fn new(recipe_id: impl Into<String>, building: impl Into<String>, time_sec: f64) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            building: building.into(),
            time_sec,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, qty: f64) -> Self {
        self.inputs.push(RecipeItem::new(name, qty));
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, qty: f64) -> Self {
        self.outputs.push(RecipeItem::new(name, qty));
        self
    }
}

/// On-disk catalog shape: `{ "recipes": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub recipes: Vec<Recipe>,
}

/// A product the user wants produced at a sustained rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub product: String,
    pub rate_per_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_recipe_id: Option<String>,
}

/// Node ids are exactly `product::recipeId`
pub fn node_id(product: &str, recipe_id: &str) -> String {
    format!("{}::{}", product, recipe_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub name: String,
    pub rate_per_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub name: String,
    pub rate_per_min: f64,
    pub is_target: bool,
}

/// One instantiated production step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub product: String,
    pub recipe_id: String,
    pub building: String,
    pub time_sec: f64,
    pub runs_per_min: f64,
    pub inputs: Vec<NodeInput>,
    pub outputs: Vec<NodeOutput>,
    /// Hop distance from the root that first materialized this node
    pub depth: u32,
}

/// Parent (consumer) to child (supplier), labelled with the consumed product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, label: &str) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Draw of products no recipe produces
    pub raw: BTreeMap<String, f64>,
    /// Non-target outputs
    pub byproducts: BTreeMap<String, f64>,
}

/// Read-only result of one rebuild, handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub graph_nodes: Vec<GraphNode>,
    pub graph_edges: Vec<GraphEdge>,
    pub totals: Totals,
    pub frontier_needs: BTreeMap<String, f64>,
}

impl Snapshot {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph_nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Deepest depth among visible nodes
    pub fn max_depth(&self) -> u32 {
        self.graph_nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}
