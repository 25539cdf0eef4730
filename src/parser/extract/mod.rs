pub mod ingredients;
pub mod instructions;
pub mod metadata;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::recipe::{ExtractedRecipe, ParsedIngredient, ParsedInstruction, RecipeBlock};
use metadata::LineMetadata;

static RECIPE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^recipe\s*:\s*").unwrap());
static NUMBERING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());
// Keyword leading the header ("Ingredients for the sauce") or closing it
// ("Main Ingredients", "Cooking Directions").
static INGREDIENT_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:ingredients?|what you(?:'ll| will)? need|you will need)\b|\b(?:ingredients?|what you(?:'ll| will)? need)$",
    )
    .unwrap()
});
static INSTRUCTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:instructions?|directions?|method|preparation|steps?|how to make it)(?:\s*$|\s+\D)|\b(?:instructions?|directions?|method|preparation|steps?)$",
    )
    .unwrap()
});
static NOTES_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bnotes?\b").unwrap());

/// Headers are short: "Ingredients for the sauce" is one, a sentence is not.
const MAX_HEADER_WORDS: usize = 4;
const MAX_NOTES_HEADER_CHARS: usize = 20;
const MIN_DESCRIPTION_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Title,
    Ingredients,
    Instructions,
    Notes,
}

/// Section a header line switches to, if the line is a header.
pub fn header_section(line: &str) -> Option<Section> {
    let cleaned = line
        .trim_matches(|c: char| matches!(c, '#' | '*' | '-' | '=' | ':') || c.is_whitespace())
        .to_lowercase();
    if cleaned.is_empty() {
        return None;
    }
    let short = cleaned.split_whitespace().count() <= MAX_HEADER_WORDS;

    if short && INGREDIENT_HEADER_RE.is_match(&cleaned) {
        Some(Section::Ingredients)
    } else if short && INSTRUCTION_HEADER_RE.is_match(&cleaned) {
        Some(Section::Instructions)
    } else if cleaned.chars().count() < MAX_NOTES_HEADER_CHARS && NOTES_HEADER_RE.is_match(&cleaned) {
        Some(Section::Notes)
    } else {
        None
    }
}

/// Strip a `Recipe:` prefix, list numbering and `-=*#` decoration.
pub fn clean_title(line: &str) -> String {
    let line = RECIPE_PREFIX_RE.replace(line.trim(), "");
    let line = NUMBERING_RE.replace(&line, "");
    line.trim_matches(|c: char| matches!(c, '-' | '=' | '*' | '#') || c.is_whitespace())
        .to_string()
}

/// Accumulator threaded through the fold over a block's lines.
#[derive(Debug)]
struct Draft {
    section: Section,
    title: Option<String>,
    description: Option<String>,
    ingredients: Vec<ParsedIngredient>,
    instructions: Vec<ParsedInstruction>,
    notes: Vec<String>,
    meta: LineMetadata,
}

impl Default for Draft {
    fn default() -> Self {
        Draft {
            section: Section::Title,
            title: None,
            description: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            notes: Vec::new(),
            meta: LineMetadata::default(),
        }
    }
}

impl Draft {
    fn merge_meta(&mut self, found: LineMetadata) {
        self.meta.prep_time_minutes = found.prep_time_minutes.or(self.meta.prep_time_minutes);
        self.meta.cook_time_minutes = found.cook_time_minutes.or(self.meta.cook_time_minutes);
        self.meta.total_time_minutes = found.total_time_minutes.or(self.meta.total_time_minutes);
        self.meta.servings = found.servings.or(self.meta.servings);
    }
}

fn step(mut draft: Draft, line: &str) -> Draft {
    let found = metadata::scan(line);
    if !found.is_empty() {
        draft.merge_meta(found);
        return draft;
    }

    if let Some(section) = header_section(line) {
        draft.section = section;
        return draft;
    }

    match draft.section {
        Section::Title => {
            let len = line.chars().count();
            if draft.title.is_none() {
                if len > 3 && len < 100 {
                    let title = clean_title(line);
                    if !title.is_empty() {
                        draft.title = Some(title);
                    }
                }
            } else if draft.description.is_none() && len > MIN_DESCRIPTION_CHARS {
                draft.description = Some(line.to_string());
            }
        }
        Section::Ingredients => {
            if let Some(ing) = ingredients::parse_line(line, draft.ingredients.len()) {
                draft.ingredients.push(ing);
            }
        }
        Section::Instructions => {
            if let Some(text) = instructions::clean_step(line) {
                let step_number = draft.instructions.len() + 1;
                draft.instructions.push(ParsedInstruction { text, step_number });
            }
        }
        Section::Notes => draft.notes.push(line.to_string()),
    }

    draft
}

/// Turn one block into a recipe. Category and tags are left for
/// enrichment; an empty title means none was found.
pub fn extract(block: &RecipeBlock, sequence_index: usize) -> ExtractedRecipe {
    let draft = block
        .lines
        .iter()
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .fold(Draft::default(), step);

    let meta = draft.meta;
    let total_time_minutes = meta.total_time_minutes.or_else(|| {
        meta.prep_time_minutes
            .zip(meta.cook_time_minutes)
            .map(|(prep, cook)| prep.saturating_add(cook))
    });

    let mut recipe = ExtractedRecipe {
        id: format!("recipe-{}", sequence_index + 1),
        title: draft.title.unwrap_or_default(),
        description: draft.description,
        ingredients: draft.ingredients,
        instructions: draft.instructions,
        servings: meta.servings,
        prep_time_minutes: meta.prep_time_minutes,
        cook_time_minutes: meta.cook_time_minutes,
        total_time_minutes,
        category: String::new(),
        tags: BTreeSet::new(),
        notes: draft.notes.join(" "),
        is_complete: false,
        source_raw_text: block.text(),
    };
    recipe.is_complete = recipe.completeness();

    debug!(
        id = %recipe.id,
        title = %recipe.title,
        ingredients = recipe.ingredients.len(),
        instructions = recipe.instructions.len(),
        "extracted recipe block"
    );
    recipe
}
