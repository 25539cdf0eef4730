pub mod blocks;
pub mod enrich;
pub mod extract;
pub mod lines;
pub mod recipe;
pub mod score;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use recipe::{ExtractedRecipe, ParsedIngredient, ParsedInstruction, RecipeBlock, ScoreReport};

/// Thresholds used by the detector and the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Blocks need more than this many lines to be extracted.
    pub min_block_lines: usize,
    /// A block past this many lines is treated as a finished recipe, so a
    /// title-like line starts the next one.
    pub complete_block_lines: usize,
    /// Lowest score that counts as good quality.
    pub good_quality_score: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            min_block_lines: 10,
            complete_block_lines: 15,
            good_quality_score: 70,
        }
    }
}

/// Four-pass pipeline: text → lines → blocks → recipes → enriched recipes.
pub fn detect_recipes(raw: &str) -> Vec<ExtractedRecipe> {
    detect_recipes_with(raw, &DetectorConfig::default())
}

pub fn detect_recipes_with(raw: &str, config: &DetectorConfig) -> Vec<ExtractedRecipe> {
    let lines = lines::normalize(raw);
    let blocks = blocks::partition(&lines, config);

    let recipes: Vec<ExtractedRecipe> = blocks
        .iter()
        .enumerate()
        .map(|(i, block)| extract::extract(block, i))
        .filter(|r| {
            if r.is_empty_extraction() {
                debug!(id = %r.id, title = %r.title, "discarding block without ingredients or instructions");
                false
            } else {
                true
            }
        })
        .map(enrich::enrich)
        .collect();

    debug!(lines = lines.len(), blocks = blocks.len(), recipes = recipes.len(), "recipe detection finished");
    recipes
}

pub fn score_recipe(recipe: &ExtractedRecipe) -> ScoreReport {
    score::score(recipe, DetectorConfig::default().good_quality_score)
}

pub fn score_recipe_with(recipe: &ExtractedRecipe, config: &DetectorConfig) -> ScoreReport {
    score::score(recipe, config.good_quality_score)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.txt", name)).unwrap()
    }

    #[test]
    fn tomato_soup() {
        let recipes = detect_recipes(&fixture("tomato_soup"));
        assert_eq!(recipes.len(), 1);
        let r = &recipes[0];
        assert_eq!(r.title, "Tomato Soup");
        assert_eq!(r.ingredients.len(), 3);
        assert_eq!(r.instructions.len(), 3);
        assert_eq!(r.servings, Some(4));
        assert_eq!(r.prep_time_minutes, Some(10));
        assert_eq!(r.cook_time_minutes, Some(20));
        assert_eq!(r.total_time_minutes, Some(30));
        assert!(r.is_complete);
        assert_eq!(r.category, "Soups");
        assert!(r.tags.contains("quick"));
        assert!(r.tags.contains("soups"));
    }

    #[test]
    fn two_recipes_split_on_dashes() {
        let recipes = detect_recipes(&fixture("two_recipes"));
        assert_eq!(recipes.len(), 2);
        assert!(recipes.iter().all(|r| r.is_complete));

        assert_eq!(recipes[0].title, "Garlic Butter Pasta");
        assert_eq!(recipes[0].category, "Pasta");
        assert_eq!(recipes[0].ingredients.len(), 4);
        assert_eq!(recipes[0].ingredients[2].unit.as_deref(), Some("cloves"));
        assert_eq!(recipes[0].servings, Some(2));

        assert_eq!(recipes[1].title, "Grilled Lemon Chicken");
        assert_eq!(recipes[1].category, "Poultry");
        assert_eq!(recipes[1].total_time_minutes, Some(27));
        assert!(recipes[1].tags.contains("grilled"));
        assert_ne!(recipes[0].id, recipes[1].id);
    }

    #[test]
    fn cookbook_blank_gap_and_prefix() {
        let recipes = detect_recipes(&fixture("cookbook"));
        assert_eq!(recipes.len(), 2);

        let pancakes = &recipes[0];
        assert_eq!(pancakes.title, "Classic Pancakes");
        assert_eq!(pancakes.category, "Breakfast");
        assert_eq!(
            pancakes.description.as_deref(),
            Some("Fluffy pancakes for a slow weekend breakfast.")
        );
        assert_eq!(pancakes.ingredients.len(), 5);
        assert_eq!(pancakes.instructions.len(), 3);

        let salad = &recipes[1];
        assert_eq!(salad.title, "Roasted Vegetable Salad");
        assert_eq!(salad.category, "Salads");
        assert!(salad.tags.contains("roasted"));
        assert_eq!(
            salad.notes,
            "Vegan and gluten-free as written. Keeps for two days in the fridge."
        );
    }

    #[test]
    fn headers_with_leading_words() {
        let recipes = detect_recipes(&fixture("prefixed_headers"));
        assert_eq!(recipes.len(), 1);
        let r = &recipes[0];
        assert_eq!(r.title, "Roasted Garlic Soup");
        assert_eq!(r.ingredients.len(), 3);
        assert_eq!(r.instructions.len(), 3);
        assert_eq!(r.servings, Some(4));
        assert_eq!(r.total_time_minutes, Some(45));
        assert!(r.is_complete);
        assert_eq!(r.category, "Soups");
        assert!(r.tags.contains("roasted"));
    }

    #[test]
    fn too_short_document_yields_nothing() {
        let text = "Toast\nIngredients:\n1 slice bread\n\nInstructions:\nToast the bread well.\n\nServes 1";
        assert_eq!(text.lines().count(), 8);
        assert!(detect_recipes(text).is_empty());
    }

    #[test]
    fn blocks_without_content_are_dropped() {
        let text = (1..=12)
            .map(|i| format!("This is line {} of a long story.", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(detect_recipes(&text).is_empty());
    }

    #[test]
    fn crlf_input_matches_lf_input() {
        let lf = fixture("two_recipes");
        let crlf = lf.replace('\n', "\r\n");
        assert_eq!(detect_recipes(&lf), detect_recipes(&crlf));
    }

    #[test]
    fn step_numbers_follow_position() {
        for name in ["tomato_soup", "two_recipes", "cookbook", "prefixed_headers"] {
            for r in detect_recipes(&fixture(name)) {
                for (i, step) in r.instructions.iter().enumerate() {
                    assert_eq!(step.step_number, i + 1);
                }
            }
        }
    }

    #[test]
    fn scoring_detected_recipe() {
        let recipes = detect_recipes(&fixture("tomato_soup"));
        let report = score_recipe(&recipes[0]);
        // 20 title + 18 for three ingredients + 30 steps + 15 metadata
        assert_eq!(report.score, 83);
        assert!(report.is_good_quality);
        assert_eq!(report.issues, vec!["Few ingredients (less than 5)"]);
    }

    #[test]
    fn json_uses_camel_case() {
        let recipes = detect_recipes(&fixture("tomato_soup"));
        let json = serde_json::to_value(&recipes[0]).unwrap();
        assert_eq!(json["prepTimeMinutes"], 10);
        assert_eq!(json["isComplete"], true);
        assert_eq!(json["ingredients"][0]["ingredientName"], "tomatoes");
        assert_eq!(json["instructions"][0]["stepNumber"], 1);
    }
}
