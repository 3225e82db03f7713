//! Recipe catalog and product index
//!
//! Built once from the loaded recipe list and never mutated afterwards.
//! All product-name lookups go through [`normalize_name`].

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::error::CatalogError;
use crate::models::{CatalogFile, Recipe, RecipeItem};

/// Trim, collapse whitespace runs to one space, and casefold
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Units of `product` one recipe produces per minute, or 0 when it doesn't produce it
pub fn output_rate_per_min(recipe: &Recipe, product: &str) -> f64 {
    let key = normalize_name(product);
    recipe
        .outputs
        .iter()
        .find(|o| normalize_name(&o.name) == key)
        .map(|o| (o.qty_per_cycle / recipe.time_sec) * 60.0)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    by_id: HashMap<String, usize>,
    /// normalized product -> producing recipes, in load order
    producers: HashMap<String, Vec<usize>>,
    /// normalized product -> first-seen spelling
    products: BTreeMap<String, String>,
}

impl RecipeCatalog {
    /// Validate and index a recipe list
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        let mut catalog = RecipeCatalog::default();

        for (index, recipe) in recipes.into_iter().enumerate() {
            validate_recipe(index, &recipe)?;
            if catalog.by_id.contains_key(&recipe.recipe_id) {
                return Err(CatalogError::DuplicateRecipeId(recipe.recipe_id));
            }

            let slot = catalog.recipes.len();
            catalog.by_id.insert(recipe.recipe_id.clone(), slot);

            for item in recipe.inputs.iter().chain(recipe.outputs.iter()) {
                catalog
                    .products
                    .entry(normalize_name(&item.name))
                    .or_insert_with(|| item.name.trim().to_string());
            }

            let mut seen = Vec::new();
            for output in &recipe.outputs {
                let key = normalize_name(&output.name);
                if seen.contains(&key) {
                    continue;
                }
                catalog.producers.entry(key.clone()).or_default().push(slot);
                seen.push(key);
            }

            catalog.recipes.push(recipe);
        }

        info!(
            recipes = catalog.recipes.len(),
            products = catalog.products.len(),
            "recipe catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a `{ "recipes": [...] }` document
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_recipes(file.recipes)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.by_id.get(recipe_id).map(|&i| &self.recipes[i])
    }

    /// Recipes producing `product`, in catalog order
    pub fn producers(&self, product: &str) -> Vec<&Recipe> {
        self.producers
            .get(&normalize_name(product))
            .map(|slots| slots.iter().map(|&i| &self.recipes[i]).collect())
            .unwrap_or_default()
    }

    /// A product outside the index is a raw material
    pub fn is_craftable(&self, product: &str) -> bool {
        self.producers.contains_key(&normalize_name(product))
    }

    /// Catalog spelling of a product, falling back to the trimmed input
    pub fn display_name(&self, product: &str) -> String {
        self.products
            .get(&normalize_name(product))
            .cloned()
            .unwrap_or_else(|| product.trim().to_string())
    }

    /// Every known product name, sorted by normalized name
    pub fn products(&self) -> Vec<&str> {
        self.products.values().map(String::as_str).collect()
    }

    /// Known products that no recipe produces
    pub fn raw_materials(&self) -> Vec<&str> {
        self.products
            .iter()
            .filter(|(key, _)| !self.producers.contains_key(*key))
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub fn output_rate_per_min(&self, recipe: &Recipe, product: &str) -> f64 {
        output_rate_per_min(recipe, product)
    }
}

fn validate_recipe(index: usize, recipe: &Recipe) -> Result<(), CatalogError> {
    if recipe.recipe_id.trim().is_empty() {
        return Err(CatalogError::EmptyRecipeId { index });
    }
    if !(recipe.time_sec.is_finite() && recipe.time_sec > 0.0) {
        return Err(CatalogError::InvalidCycleTime {
            recipe_id: recipe.recipe_id.clone(),
            time_sec: recipe.time_sec,
        });
    }
    recipe
        .inputs
        .iter()
        .chain(recipe.outputs.iter())
        .try_for_each(|item| validate_item(&recipe.recipe_id, item))
}

fn validate_item(recipe_id: &str, item: &RecipeItem) -> Result<(), CatalogError> {
    if item.name.trim().is_empty() {
        return Err(CatalogError::EmptyItemName {
            recipe_id: recipe_id.to_string(),
        });
    }
    if !(item.qty_per_cycle.is_finite() && item.qty_per_cycle >= 0.0) {
        return Err(CatalogError::InvalidQuantity {
            recipe_id: recipe_id.to_string(),
            item: item.name.clone(),
            qty: item.qty_per_cycle,
        });
    }
    Ok(())
}
