//! Catalog import from JSON files
//!
//! Accepts one catalog file or a directory tree of them. Each file is parsed
//! and validated on its own before any of its recipes reach the store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::catalog::RecipeCatalog;
use crate::db;

/// Find all `*.json` files under `dir`, sorted by path
pub fn find_catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Read and validate a single catalog file
pub fn read_catalog_file(path: &Path) -> Result<RecipeCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    RecipeCatalog::from_json_str(&content)
        .with_context(|| format!("Invalid catalog {}", path.display()))
}

/// Import a catalog file, or every catalog file under a directory, into the store
pub fn import_to_database(conn: &Connection, source: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    let files = if source.is_dir() {
        info!(dir = %source.display(), "scanning for catalog files");
        find_catalog_files(source)?
    } else {
        vec![source.to_path_buf()]
    };

    for path in &files {
        match read_catalog_file(path) {
            Ok(catalog) => match store_catalog(conn, &catalog) {
                Ok(replaced) => {
                    stats.files += 1;
                    stats.recipes += catalog.len() - replaced;
                    stats.replaced += replaced;
                    info!(file = %path.display(), recipes = catalog.len(), replaced, "imported");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %format!("{:#}", e), "store rejected file");
                    stats.errors += 1;
                }
            },
            Err(e) => {
                warn!(file = %path.display(), error = %format!("{:#}", e), "skipped");
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

/// Write one file's recipes in a single transaction, returning how many
/// overwrote an already stored recipe id
fn store_catalog(conn: &Connection, catalog: &RecipeCatalog) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut replaced = 0;
    for recipe in catalog.recipes() {
        if db::insert_recipe(&tx, recipe)? {
            warn!(recipe = %recipe.recipe_id, "recipe id already stored, overwriting");
            replaced += 1;
        }
    }
    tx.commit()?;
    Ok(replaced)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    /// Recipes new to the store
    pub recipes: usize,
    /// Recipes that overwrote a stored recipe with the same id
    pub replaced: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} recipes from {} files. Replaced: {}. Errors: {}",
            self.recipes, self.files, self.replaced, self.errors
        )
    }
}
