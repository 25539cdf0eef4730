use super::recipe::{ExtractedRecipe, ScoreReport};

const TITLE_POINTS: u32 = 20;
const MIN_TITLE_CHARS: usize = 5;
const FULL_INGREDIENT_COUNT: usize = 5;
const INGREDIENT_POINTS: u32 = 30;
const POINTS_PER_INGREDIENT: u32 = 6;
const FULL_INSTRUCTION_COUNT: usize = 3;
const INSTRUCTION_POINTS: u32 = 30;
const POINTS_PER_INSTRUCTION: u32 = 10;
const METADATA_POINTS: u32 = 5;
const MAX_SCORE: u32 = 100;

/// Rate how much of a recipe was recovered, 0 to 100. Scores at or above
/// `good_quality_score` count as good quality.
pub fn score(recipe: &ExtractedRecipe, good_quality_score: u8) -> ScoreReport {
    let mut points = 0;
    let mut issues = Vec::new();

    if recipe.title.chars().count() > MIN_TITLE_CHARS {
        points += TITLE_POINTS;
    } else {
        issues.push("Missing or weak title".to_string());
    }

    let ingredients = recipe.ingredients.len();
    if ingredients >= FULL_INGREDIENT_COUNT {
        points += INGREDIENT_POINTS;
    } else if ingredients > 0 {
        points += ingredients as u32 * POINTS_PER_INGREDIENT;
        issues.push("Few ingredients (less than 5)".to_string());
    } else {
        issues.push("No ingredients found".to_string());
    }

    let instructions = recipe.instructions.len();
    if instructions >= FULL_INSTRUCTION_COUNT {
        points += INSTRUCTION_POINTS;
    } else if instructions > 0 {
        points += instructions as u32 * POINTS_PER_INSTRUCTION;
        issues.push("Few instructions (less than 3)".to_string());
    } else {
        issues.push("No instructions found".to_string());
    }

    let metadata_present = [
        recipe.servings.is_some(),
        recipe.prep_time_minutes.is_some(),
        recipe.cook_time_minutes.is_some(),
        recipe.description.is_some(),
    ];
    points += metadata_present.iter().filter(|p| **p).count() as u32 * METADATA_POINTS;

    let score = points.min(MAX_SCORE) as u8;
    ScoreReport {
        score,
        is_good_quality: score >= good_quality_score,
        is_complete: recipe.is_complete,
        issues,
    }
}
