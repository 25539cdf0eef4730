use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A contiguous run of normalized lines believed to hold one recipe.
/// `end_index` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeBlock {
    pub start_index: usize,
    pub end_index: usize,
    pub lines: Vec<String>,
}

impl RecipeBlock {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    pub raw_text: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub ingredient_name: String,
    pub preparation_note: Option<String>,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    pub text: String,
    pub step_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecipe {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<ParsedInstruction>,
    pub servings: Option<u32>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub total_time_minutes: Option<u32>,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub notes: String,
    pub is_complete: bool,
    pub source_raw_text: String,
}

impl ExtractedRecipe {
    /// Title, ingredients and instructions all present.
    pub fn completeness(&self) -> bool {
        !self.title.is_empty() && !self.ingredients.is_empty() && !self.instructions.is_empty()
    }

    /// Nothing usable came out of the block.
    pub fn is_empty_extraction(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }

    /// Title, description and ingredient names, lowercased. Input for
    /// category and tag detection.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        if let Some(desc) = &self.description {
            parts.push(desc);
        }
        parts.extend(self.ingredients.iter().map(|i| i.ingredient_name.as_str()));
        parts.join(" ").to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub score: u8,
    pub is_good_quality: bool,
    pub is_complete: bool,
    pub issues: Vec<String>,
}
