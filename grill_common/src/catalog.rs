//! Recipe catalog and ingredient list.
//!
//! The catalog is immutable configuration supplied to the core at
//! startup: a built-in menu, optionally replaced by a TOML file. Every
//! recipe ingredient must resolve to a dispenser slot; `validate`
//! enforces that before a region is ever built from the catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{INGREDIENT_NAME_BYTES, MAX_INGREDIENTS, MAX_RECIPE_STEPS, RECIPE_NAME_BYTES};

/// Errors raised while loading or validating catalog/line configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File not found at the given path.
    #[error("configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// A named, ordered list of ingredients with a menu price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Menu name.
    pub name: String,
    /// Assembly order, bottom to top.
    pub ingredients: Vec<String>,
    /// Menu price.
    pub price: f32,
}

/// The full menu plus the ingredient list every station stocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// One dispenser slot per entry, same order on every station.
    pub ingredients: Vec<String>,
    /// Available recipes.
    pub recipes: Vec<Recipe>,
}

impl Catalog {
    /// The built-in menu: fifteen dispenser slots, six burgers.
    pub fn builtin() -> Self {
        let ingredients = [
            "bun_bottom",
            "bun_top",
            "patty",
            "cheese",
            "tomato",
            "lettuce",
            "onion",
            "pickles",
            "mayo",
            "ketchup",
            "mustard",
            "bacon",
            "mushrooms",
            "avocado",
            "jalapenos",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let recipes = vec![
            recipe(
                "classic",
                &["bun_bottom", "patty", "ketchup", "mustard", "onion", "pickles", "bun_top"],
                5.50,
            ),
            recipe(
                "cheeseburger",
                &["bun_bottom", "patty", "cheese", "ketchup", "onion", "bun_top"],
                6.25,
            ),
            recipe(
                "double_stack",
                &["bun_bottom", "patty", "cheese", "patty", "cheese", "bun_top"],
                8.75,
            ),
            recipe(
                "smoky_bacon",
                &["bun_bottom", "patty", "bacon", "cheese", "mayo", "bun_top"],
                7.95,
            ),
            recipe(
                "garden",
                &["bun_bottom", "patty", "lettuce", "tomato", "onion", "avocado", "mayo", "bun_top"],
                7.25,
            ),
            recipe(
                "the_works",
                &[
                    "bun_bottom",
                    "patty",
                    "cheese",
                    "bacon",
                    "lettuce",
                    "tomato",
                    "pickles",
                    "jalapenos",
                    "mustard",
                    "bun_top",
                ],
                9.95,
            ),
        ];

        Self {
            ingredients,
            recipes,
        }
    }

    /// Load a catalog from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::Parse(e.to_string())
            }
        })?;
        let catalog: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the catalog against the fixed region limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingredients.is_empty() || self.ingredients.len() > MAX_INGREDIENTS {
            return Err(ConfigError::Validation(format!(
                "ingredient count must be in 1..={MAX_INGREDIENTS}, got {}",
                self.ingredients.len()
            )));
        }
        for name in &self.ingredients {
            if name.is_empty() || name.len() >= INGREDIENT_NAME_BYTES {
                return Err(ConfigError::Validation(format!(
                    "ingredient name '{name}' must be 1..{INGREDIENT_NAME_BYTES} bytes"
                )));
            }
        }
        if self.recipes.is_empty() {
            return Err(ConfigError::Validation("menu has no recipes".to_string()));
        }
        for r in &self.recipes {
            if r.name.is_empty() || r.name.len() >= RECIPE_NAME_BYTES {
                return Err(ConfigError::Validation(format!(
                    "recipe name '{}' must be 1..{RECIPE_NAME_BYTES} bytes",
                    r.name
                )));
            }
            if r.ingredients.is_empty() || r.ingredients.len() > MAX_RECIPE_STEPS {
                return Err(ConfigError::Validation(format!(
                    "recipe '{}' must list 1..={MAX_RECIPE_STEPS} ingredients",
                    r.name
                )));
            }
            for ing in &r.ingredients {
                if !self.ingredients.contains(ing) {
                    return Err(ConfigError::Validation(format!(
                        "recipe '{}' uses unknown ingredient '{ing}'",
                        r.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Render the menu for `--menu` output.
    pub fn render_menu(&self) -> String {
        let mut out = String::from("Menu\n");
        for r in &self.recipes {
            out.push_str(&format!(
                "  {:<14} ${:>5.2}  [{}]\n",
                r.name,
                r.price,
                r.ingredients.join(", ")
            ));
        }
        out.push_str(&format!(
            "Stocked ingredients ({}): {}\n",
            self.ingredients.len(),
            self.ingredients.join(", ")
        ));
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn recipe(name: &str, ingredients: &[&str], price: f32) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        price,
    }
}
