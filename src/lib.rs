//! Recipe text detection: split pasted or uploaded text into individual
//! recipes, extract their ingredients, steps and metadata, and rate how
//! complete each extraction is.

pub mod config;
pub mod db;
pub mod parser;

pub use parser::{
    detect_recipes, detect_recipes_with, score_recipe, score_recipe_with, DetectorConfig,
    ExtractedRecipe, ParsedIngredient, ParsedInstruction, ScoreReport,
};
