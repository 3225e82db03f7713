//! Error types for catalog loading and planner boundary checks

use thiserror::Error;

/// Errors raised while building a recipe catalog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("failed to parse recipe catalog: {0}")]
    Parse(String),

    #[error("recipe #{index} has an empty recipeId")]
    EmptyRecipeId { index: usize },

    #[error("duplicate recipeId: {0}")]
    DuplicateRecipeId(String),

    #[error("recipe {recipe_id}: timeSec must be > 0 (got {time_sec})")]
    InvalidCycleTime { recipe_id: String, time_sec: f64 },

    #[error("recipe {recipe_id}: {item} has invalid qtyPerCycle {qty}")]
    InvalidQuantity {
        recipe_id: String,
        item: String,
        qty: f64,
    },

    #[error("recipe {recipe_id}: item with empty name")]
    EmptyItemName { recipe_id: String },
}

/// Errors raised at the planner API boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("target product must not be empty")]
    EmptyProduct,

    #[error("target rate must be positive and finite (got {0})")]
    InvalidRate(f64),

    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    #[error("recipe {recipe_id} does not produce {product}")]
    RecipeDoesNotProduce { recipe_id: String, product: String },
}
