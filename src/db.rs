//! SQLite catalog store
//!
//! Caches validated recipe catalogs so the planner can start without the
//! original JSON files. Catalog order is kept through the insertion sequence.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::catalog::RecipeCatalog;
use crate::models::{Recipe, RecipeItem};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per recipe; seq preserves catalog order
        CREATE TABLE IF NOT EXISTS recipes (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id TEXT NOT NULL UNIQUE,
            building TEXT NOT NULL,
            time_sec REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipe_inputs (
            recipe_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            qty_per_cycle REAL NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE TABLE IF NOT EXISTS recipe_outputs (
            recipe_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            qty_per_cycle REAL NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_recipe_outputs_name ON recipe_outputs(name);
        "#,
    )?;
    Ok(())
}

/// Insert a recipe with its inputs and outputs, or overwrite the stored one
/// in place. Returns `true` when a recipe with the same id already existed;
/// an overwrite keeps the original catalog position.
pub fn insert_recipe(conn: &Connection, recipe: &Recipe) -> Result<bool> {
    let existed: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM recipes WHERE recipe_id = ?1)",
        [&recipe.recipe_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "DELETE FROM recipe_inputs WHERE recipe_id = ?1",
        [&recipe.recipe_id],
    )?;
    conn.execute(
        "DELETE FROM recipe_outputs WHERE recipe_id = ?1",
        [&recipe.recipe_id],
    )?;
    conn.execute(
        "INSERT INTO recipes (recipe_id, building, time_sec)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(recipe_id) DO UPDATE SET
             building = excluded.building,
             time_sec = excluded.time_sec",
        (&recipe.recipe_id, &recipe.building, recipe.time_sec),
    )?;

    for (position, item) in recipe.inputs.iter().enumerate() {
        conn.execute(
            "INSERT INTO recipe_inputs (recipe_id, position, name, qty_per_cycle)
             VALUES (?1, ?2, ?3, ?4)",
            (&recipe.recipe_id, position as i64, &item.name, item.qty_per_cycle),
        )?;
    }
    for (position, item) in recipe.outputs.iter().enumerate() {
        conn.execute(
            "INSERT INTO recipe_outputs (recipe_id, position, name, qty_per_cycle)
             VALUES (?1, ?2, ?3, ?4)",
            (&recipe.recipe_id, position as i64, &item.name, item.qty_per_cycle),
        )?;
    }
    Ok(existed)
}

/// Clear all stored recipes (for re-import)
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_outputs;
        DELETE FROM recipe_inputs;
        DELETE FROM recipes;
        "#,
    )?;
    Ok(())
}

/// Load every stored recipe in catalog order
pub fn load_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt =
        conn.prepare("SELECT recipe_id, building, time_sec FROM recipes ORDER BY seq")?;
    let rows = stmt.query_map([], |row| {
        Ok(Recipe::new(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    let mut recipes = Vec::new();
    for row in rows {
        let mut recipe = row?;
        recipe.inputs = load_items(conn, "recipe_inputs", &recipe.recipe_id)?;
        recipe.outputs = load_items(conn, "recipe_outputs", &recipe.recipe_id)?;
        recipes.push(recipe);
    }
    Ok(recipes)
}

/// Build a validated catalog from the store
pub fn load_catalog(conn: &Connection) -> Result<RecipeCatalog> {
    let recipes = load_recipes(conn)?;
    RecipeCatalog::from_recipes(recipes).context("stored catalog failed validation")
}

/// List stored recipe ids in catalog order
pub fn list_recipe_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT recipe_id FROM recipes ORDER BY seq")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn load_items(conn: &Connection, table: &str, recipe_id: &str) -> Result<Vec<RecipeItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name, qty_per_cycle FROM {} WHERE recipe_id = ?1 ORDER BY position",
        table
    ))?;
    let rows = stmt.query_map([recipe_id], |row| {
        Ok(RecipeItem::new(row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
