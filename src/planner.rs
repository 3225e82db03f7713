//! Planner session: the state the user edits plus the last published snapshot
//!
//! Every mutating call rebuilds the whole chain. Operations naming a node id
//! that isn't in the current snapshot are no-ops.

use tracing::{debug, info, warn};

use crate::catalog::{RecipeCatalog, normalize_name};
use crate::error::PlannerError;
use crate::expansion::EXPAND_ALL_HOPS;
use crate::graph::{ChainState, PlannerConfig, resolve};
use crate::models::{Recipe, Snapshot, Target, node_id};

impl Target {
    /// Validated target; empty products and non-positive rates are rejected
    pub fn new(product: impl Into<String>, rate_per_min: f64) -> Result<Self, PlannerError> {
        let product = product.into();
        if product.trim().is_empty() {
            return Err(PlannerError::EmptyProduct);
        }
        if !(rate_per_min.is_finite() && rate_per_min > 0.0) {
            return Err(PlannerError::InvalidRate(rate_per_min));
        }
        Ok(Self {
            product,
            rate_per_min,
            preferred_recipe_id: None,
        })
    }

    pub fn with_recipe(mut self, recipe_id: impl Into<String>) -> Self {
        self.preferred_recipe_id = Some(recipe_id.into());
        self
    }

    fn validate(&self) -> Result<(), PlannerError> {
        Target::new(self.product.clone(), self.rate_per_min).map(|_| ())
    }
}

pub struct Planner<'c> {
    catalog: &'c RecipeCatalog,
    config: PlannerConfig,
    state: ChainState,
    snapshot: Snapshot,
}

impl<'c> Planner<'c> {
    pub fn new(catalog: &'c RecipeCatalog) -> Self {
        Self::with_config(catalog, PlannerConfig::default())
    }

    pub fn with_config(catalog: &'c RecipeCatalog, config: PlannerConfig) -> Self {
        Self {
            catalog,
            config,
            state: ChainState::default(),
            snapshot: Snapshot::default(),
        }
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        self.catalog
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Recompute the chain from the current state
    pub fn build(&mut self) -> &Snapshot {
        self.snapshot = resolve(self.catalog, &self.state, &self.config);
        debug!(
            nodes = self.snapshot.graph_nodes.len(),
            edges = self.snapshot.graph_edges.len(),
            "snapshot published"
        );
        &self.snapshot
    }

    /// Replace all targets with a single one
    pub fn set_target(&mut self, target: Target) -> Result<&Snapshot, PlannerError> {
        self.set_targets(vec![target])
    }

    pub fn set_targets(&mut self, targets: Vec<Target>) -> Result<&Snapshot, PlannerError> {
        targets.iter().try_for_each(Target::validate)?;
        info!(targets = targets.len(), "targets set");
        self.state.targets = targets;
        Ok(self.build())
    }

    pub fn add_target(&mut self, target: Target) -> Result<&Snapshot, PlannerError> {
        target.validate()?;
        self.state.targets.push(target);
        Ok(self.build())
    }

    /// Sticky recipe override for a product; `None` clears it
    pub fn set_choice_recipe(
        &mut self,
        product: &str,
        recipe_id: Option<&str>,
    ) -> Result<&Snapshot, PlannerError> {
        if let Some(id) = recipe_id {
            self.check_produces(id, product)?;
        }
        self.state.preferences.set_recipe(product, recipe_id);
        Ok(self.build())
    }

    pub fn set_choice_building(&mut self, product: &str, building: &str) -> &Snapshot {
        self.state.preferences.set_building(product, building);
        self.build()
    }

    pub fn expand_node_once(&mut self, node_id: &str) -> &Snapshot {
        if self.is_stale(node_id) {
            return &self.snapshot;
        }
        self.state.budgets.expand_once(node_id);
        self.build()
    }

    pub fn expand_branch_by(&mut self, node_id: &str, hops: u32) -> &Snapshot {
        if self.is_stale(node_id) {
            return &self.snapshot;
        }
        self.state.budgets.expand_by(node_id, hops);
        self.build()
    }

    pub fn expand_branch_all(&mut self, node_id: &str) -> &Snapshot {
        self.expand_branch_by(node_id, EXPAND_ALL_HOPS)
    }

    /// Zero the budgets of `node_id` and every node that consumes from it,
    /// transitively, in the current snapshot
    pub fn collapse_branch(&mut self, node_id: &str) -> &Snapshot {
        if self.is_stale(node_id) {
            return &self.snapshot;
        }
        let cleared = self
            .state
            .budgets
            .collapse_branch(node_id, &self.snapshot.graph_edges);
        debug!(node = node_id, cleared = cleared.len(), "branch collapsed");
        self.build()
    }

    pub fn reset_expansions(&mut self) -> &Snapshot {
        self.state.budgets.reset();
        self.build()
    }

    /// Run `node_id`'s product with another recipe. The node's budget moves
    /// to the new id and the product remembers the choice.
    pub fn swap_node_recipe(
        &mut self,
        node_id_old: &str,
        recipe_id: &str,
    ) -> Result<&Snapshot, PlannerError> {
        let Some(node) = self.snapshot.node(node_id_old) else {
            warn!(node = node_id_old, "swap on a node that is not in the current graph");
            return Ok(&self.snapshot);
        };
        let product = node.product.clone();
        let old_recipe_id = node.recipe_id.clone();
        let recipe = self.check_produces(recipe_id, &product)?;
        let building = recipe.building.clone();

        let new_id = node_id(&product, recipe_id);
        self.state.budgets.migrate(node_id_old, &new_id);
        // A target pinned to the old recipe would keep rooting the old node
        let product_key = normalize_name(&product);
        for target in &mut self.state.targets {
            if normalize_name(&target.product) == product_key
                && target.preferred_recipe_id.as_deref() == Some(old_recipe_id.as_str())
            {
                target.preferred_recipe_id = Some(recipe_id.to_string());
            }
        }
        self.state.preferences.set_recipe(&product, Some(recipe_id));
        self.state.preferences.set_building(&product, &building);
        info!(from = node_id_old, to = %new_id, "recipe swapped");
        Ok(self.build())
    }

    fn check_produces(&self, recipe_id: &str, product: &str) -> Result<&'c Recipe, PlannerError> {
        let catalog = self.catalog;
        let recipe = catalog
            .recipe(recipe_id)
            .ok_or_else(|| PlannerError::UnknownRecipe(recipe_id.to_string()))?;
        if !catalog
            .producers(product)
            .iter()
            .any(|r| r.recipe_id == recipe_id)
        {
            return Err(PlannerError::RecipeDoesNotProduce {
                recipe_id: recipe_id.to_string(),
                product: product.to_string(),
            });
        }
        Ok(recipe)
    }

    fn is_stale(&self, node_id: &str) -> bool {
        let stale = !self.snapshot.contains_node(node_id);
        if stale {
            warn!(node = node_id, "ignoring operation on unknown node");
        }
        stale
    }
}
