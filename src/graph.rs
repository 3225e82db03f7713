//! Chain resolution
//!
//! [`resolve`] is a pure projection of (targets, preferences, budgets) onto a
//! node/edge set. It runs in two passes:
//!
//! 1. **Baseline**: every target gets a root node plus one hop of craftable
//!    inputs, regardless of budgets.
//! 2. **Relaxation**: nodes with a budget seed a FIFO queue of
//!    `(node, remaining hops)`. Each dequeued node materializes its craftable
//!    inputs and hands each child `max(remaining - 1, child's own budget)`.
//!    A child is re-queued only when that allowance beats the best one seen
//!    so far, so the queue drains once no allowance can grow.
//!
//! Nodes are identified by `(product, recipe)`. When several consumers need
//! the same node, [`FanInPolicy`] decides how its demand is accounted.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::aggregate;
use crate::catalog::{RecipeCatalog, normalize_name};
use crate::expansion::ExpansionBudgets;
use crate::models::{GraphEdge, GraphNode, Recipe, Snapshot, Target, node_id};
use crate::preferences::{Preferences, pick_recipe};
use crate::rate::compute_rates;

/// How demand is counted for a node reached by more than one consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanInPolicy {
    /// Rates come from whichever path materialized the node first; later
    /// consumers add nothing
    FirstWins,
    /// Demand from every consumer (and every target rooted on the node) is
    /// summed and propagated in topological order. Nodes on a cycle keep
    /// their first-path rates.
    #[default]
    Summed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    pub fan_in: FanInPolicy,
    /// Decimal places kept in totals
    pub precision: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fan_in: FanInPolicy::default(),
            precision: 2,
        }
    }
}

/// Everything the user can change between rebuilds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainState {
    pub targets: Vec<Target>,
    pub preferences: Preferences,
    pub budgets: ExpansionBudgets,
}

/// Build the visible chain for `state` from scratch
pub fn resolve(catalog: &RecipeCatalog, state: &ChainState, config: &PlannerConfig) -> Snapshot {
    let mut builder = Builder::new(catalog, state);
    builder.baseline();
    builder.relax();
    if config.fan_in == FanInPolicy::Summed {
        builder.sum_fan_in();
    }

    debug!(
        nodes = builder.nodes.len(),
        edges = builder.edges.len(),
        "chain resolved"
    );

    let totals = aggregate::totals(catalog, &builder.nodes, config.precision);
    let frontier_needs = aggregate::frontier_needs(
        catalog,
        &builder.nodes,
        &builder.edges,
        config.precision,
    );

    Snapshot {
        graph_nodes: builder.nodes,
        graph_edges: builder.edges,
        totals,
        frontier_needs,
    }
}

struct Builder<'c, 's> {
    catalog: &'c RecipeCatalog,
    state: &'s ChainState,
    nodes: Vec<GraphNode>,
    recipes: Vec<&'c Recipe>,
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    /// (parent, child, label) per edge, for demand propagation
    links: Vec<(usize, usize, String)>,
    connected: HashSet<(usize, usize)>,
    /// Target demand rooted directly on each node
    external: Vec<f64>,
}

impl<'c, 's> Builder<'c, 's> {
    fn new(catalog: &'c RecipeCatalog, state: &'s ChainState) -> Self {
        Self {
            catalog,
            state,
            nodes: Vec::new(),
            recipes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            links: Vec::new(),
            connected: HashSet::new(),
            external: Vec::new(),
        }
    }

    fn baseline(&mut self) {
        let catalog = self.catalog;
        let state = self.state;
        let prefs = &state.preferences;

        for target in &state.targets {
            let explicit = target
                .preferred_recipe_id
                .as_deref()
                .or_else(|| prefs.recipe_for(&target.product));
            let Some(recipe) = pick_recipe(
                catalog,
                &target.product,
                explicit,
                prefs.building_for(&target.product),
                None,
            ) else {
                warn!(product = %target.product, "target has no producing recipe, treating as raw");
                continue;
            };

            let product = catalog.display_name(&target.product);
            let root = self.materialize(&product, recipe, target.rate_per_min, 0);
            self.external[root] += target.rate_per_min;

            for input in self.input_names(root) {
                self.child_of(root, &input);
            }
        }
    }

    fn relax(&mut self) {
        let state = self.state;
        let budgets = &state.budgets;
        let mut best: HashMap<usize, u32> = HashMap::new();
        let mut queue: VecDeque<(usize, u32)> = VecDeque::new();

        for (idx, node) in self.nodes.iter().enumerate() {
            let budget = budgets.get(&node.id);
            if budget > 0 {
                best.insert(idx, budget);
                queue.push_back((idx, budget));
            }
        }

        while let Some((idx, remaining)) = queue.pop_front() {
            if remaining == 0 || best.get(&idx).is_some_and(|&b| remaining < b) {
                continue;
            }
            let effective = remaining.max(budgets.get(&self.nodes[idx].id));

            for input in self.input_names(idx) {
                let Some(child) = self.child_of(idx, &input) else {
                    continue;
                };
                let allowance = (effective - 1).max(budgets.get(&self.nodes[child].id));
                if allowance > 0 && allowance > best.get(&child).copied().unwrap_or(0) {
                    debug!(node = %self.nodes[child].id, allowance, "relaxed");
                    best.insert(child, allowance);
                    queue.push_back((child, allowance));
                }
            }
        }
    }

    /// Recompute rates with demand summed over every consumer
    fn sum_fan_in(&mut self) {
        let count = self.nodes.len();
        let mut indegree = vec![0usize; count];
        let mut outgoing: Vec<Vec<(usize, &str)>> = vec![Vec::new(); count];
        for (parent, child, label) in &self.links {
            indegree[*child] += 1;
            outgoing[*parent].push((*child, label.as_str()));
        }

        let mut demand = self.external.clone();
        let mut ready: VecDeque<usize> = (0..count).filter(|&i| indegree[i] == 0).collect();
        let mut settled = 0usize;

        while let Some(idx) = ready.pop_front() {
            settled += 1;
            let rates = compute_rates(self.recipes[idx], &self.nodes[idx].product, demand[idx]);
            for &(child, label) in &outgoing[idx] {
                demand[child] += rates.input_rate(label);
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    ready.push_back(child);
                }
            }
            let node = &mut self.nodes[idx];
            node.runs_per_min = rates.runs_per_min;
            node.inputs = rates.inputs;
            node.outputs = rates.outputs;
        }

        if settled < count {
            debug!(
                unsettled = count - settled,
                "cycle in chain, keeping first-path rates"
            );
        }
    }

    /// Reuse the node for `(product, recipe)` or create it
    fn materialize(&mut self, product: &str, recipe: &'c Recipe, demand: f64, depth: u32) -> usize {
        let id = node_id(product, &recipe.recipe_id);
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }

        let rates = compute_rates(recipe, product, demand);
        debug!(node = %id, depth, runs_per_min = rates.runs_per_min, "materialized");

        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(GraphNode {
            id,
            product: product.to_string(),
            recipe_id: recipe.recipe_id.clone(),
            building: recipe.building.clone(),
            time_sec: recipe.time_sec,
            runs_per_min: rates.runs_per_min,
            inputs: rates.inputs,
            outputs: rates.outputs,
            depth,
        });
        self.recipes.push(recipe);
        self.external.push(0.0);
        idx
    }

    /// Materialize and connect the supplier of `input` for `parent`.
    /// `None` for raw inputs and for inputs resolving back to `parent`.
    fn child_of(&mut self, parent: usize, input: &str) -> Option<usize> {
        let catalog = self.catalog;
        let state = self.state;
        let prefs = &state.preferences;
        if !catalog.is_craftable(input) {
            return None;
        }

        let recipe = pick_recipe(
            catalog,
            input,
            prefs.recipe_for(input),
            prefs.building_for(input),
            Some(self.nodes[parent].building.as_str()),
        )?;
        let product = catalog.display_name(input);
        if node_id(&product, &recipe.recipe_id) == self.nodes[parent].id {
            debug!(node = %self.nodes[parent].id, "input resolves to its own consumer, skipping");
            return None;
        }

        let demand = self.demand_from(parent, input);
        let depth = self.nodes[parent].depth + 1;
        let child = self.materialize(&product, recipe, demand, depth);

        if self.connected.insert((parent, child)) {
            let edge = GraphEdge::new(&self.nodes[parent].id, &self.nodes[child].id, &product);
            self.edges.push(edge);
            self.links.push((parent, child, product));
        }
        Some(child)
    }

    fn demand_from(&self, parent: usize, input: &str) -> f64 {
        let key = normalize_name(input);
        self.nodes[parent]
            .inputs
            .iter()
            .filter(|i| normalize_name(&i.name) == key)
            .map(|i| i.rate_per_min)
            .sum()
    }

    /// Distinct input names of a node, in recipe order
    fn input_names(&self, idx: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.recipes[idx]
            .inputs
            .iter()
            .filter(|i| seen.insert(normalize_name(&i.name)))
            .map(|i| i.name.trim().to_string())
            .collect()
    }
}
