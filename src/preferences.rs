//! Sticky recipe/building preferences and recipe selection

use std::collections::BTreeMap;

use crate::catalog::{RecipeCatalog, normalize_name};
use crate::models::Recipe;

/// Per-product choices, keyed by normalized product name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    choices_recipe: BTreeMap<String, String>,
    choices_building: BTreeMap<String, String>,
}

impl Preferences {
    /// `None` clears the override
    pub fn set_recipe(&mut self, product: &str, recipe_id: Option<&str>) {
        let key = normalize_name(product);
        match recipe_id {
            Some(id) => {
                self.choices_recipe.insert(key, id.to_string());
            }
            None => {
                self.choices_recipe.remove(&key);
            }
        }
    }

    pub fn set_building(&mut self, product: &str, building: &str) {
        self.choices_building
            .insert(normalize_name(product), building.to_string());
    }

    pub fn recipe_for(&self, product: &str) -> Option<&str> {
        self.choices_recipe
            .get(&normalize_name(product))
            .map(String::as_str)
    }

    pub fn building_for(&self, product: &str) -> Option<&str> {
        self.choices_building
            .get(&normalize_name(product))
            .map(String::as_str)
    }
}

/// Choose the recipe that satisfies `product`.
///
/// First match wins:
/// 1. `explicit_recipe_id`, if it names a producer of `product`
/// 2. the first producer run by `parent_building`
/// 3. the first producer run by `preferred_building`
/// 4. the first producer in catalog order
///
/// `None` means the product is raw.
pub fn pick_recipe<'c>(
    catalog: &'c RecipeCatalog,
    product: &str,
    explicit_recipe_id: Option<&str>,
    preferred_building: Option<&str>,
    parent_building: Option<&str>,
) -> Option<&'c Recipe> {
    let producers = catalog.producers(product);

    explicit_recipe_id
        .and_then(|id| producers.iter().find(|r| r.recipe_id == id))
        .or_else(|| first_in_building(&producers, parent_building))
        .or_else(|| first_in_building(&producers, preferred_building))
        .or_else(|| producers.first())
        .copied()
}

fn first_in_building<'a, 'c>(
    producers: &'a [&'c Recipe],
    building: Option<&str>,
) -> Option<&'a &'c Recipe> {
    let wanted = normalize_name(building?);
    producers
        .iter()
        .find(|r| normalize_name(&r.building) == wanted)
}
