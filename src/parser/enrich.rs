use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::recipe::ExtractedRecipe;

pub const DEFAULT_CATEGORY: &str = "Main Dishes";

const QUICK_MAX_MINUTES: u32 = 30;
const SLOW_MIN_MINUTES: u32 = 120;

/// Checked in order; the first category with a keyword anywhere in the text
/// wins, so "cheesecake" is a dessert and "cornbread" a bread.
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("Appetizers", &["appetizer", "dip", "bruschetta", "crostini", "canape", "finger food", "hummus"]),
    ("Salads", &["salad", "slaw", "coleslaw", "vinaigrette"]),
    ("Soups", &["soup", "stew", "chowder", "bisque", "broth", "chili", "gazpacho"]),
    ("Pasta", &["pasta", "spaghetti", "linguine", "penne", "lasagna", "noodle", "macaroni", "fettuccine", "ravioli"]),
    ("Seafood", &["fish", "salmon", "shrimp", "tuna", "cod", "crab", "lobster", "scallop", "seafood", "mussel"]),
    ("Beef", &["beef", "steak", "brisket", "veal", "meatball"]),
    ("Poultry", &["chicken", "turkey", "duck", "poultry"]),
    ("Pork", &["pork", "bacon", "ham", "sausage", "prosciutto"]),
    ("Vegetarian", &["vegetarian", "vegan", "tofu", "tempeh", "lentil", "chickpea"]),
    ("Desserts", &["dessert", "cake", "cookie", "pie", "brownie", "pudding", "chocolate", "ice cream", "tart"]),
    ("Breads", &["bread", "loaf", "loaves", "roll", "bun", "muffin", "biscuit", "focaccia", "baguette"]),
    ("Breakfast", &["breakfast", "pancake", "waffle", "omelet", "omelette", "french toast", "granola"]),
];

/// Dishes whose names contain a keyword of an earlier category.
const CATEGORY_OVERRIDES: &[(&str, &str)] = &[("pancake", "Breakfast")];

/// Dietary and cooking-method vocabulary: tag and the phrases that imply it.
const TAG_VOCABULARY: &[(&str, &[&str])] = &[
    ("vegan", &["vegan"]),
    ("vegetarian", &["vegetarian"]),
    ("gluten-free", &["gluten-free", "gluten free"]),
    ("dairy-free", &["dairy-free", "dairy free"]),
    ("keto", &["keto"]),
    ("paleo", &["paleo"]),
    ("grilled", &["grilled", "grill"]),
    ("baked", &["baked", "bake"]),
    ("fried", &["fried", "fry"]),
    ("roasted", &["roasted", "roast"]),
    ("slow-cooked", &["slow-cooked", "slow cooked", "slow cooker"]),
];

fn word_matcher(words: &[&str]) -> Regex {
    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).unwrap()
}

static TAG_MATCHERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TAG_VOCABULARY
        .iter()
        .map(|(tag, words)| (*tag, word_matcher(words)))
        .collect()
});

/// Category for lowercased recipe text.
pub fn categorize(text: &str) -> &'static str {
    if let Some((_, category)) = CATEGORY_OVERRIDES.iter().find(|(dish, _)| text.contains(*dish)) {
        return *category;
    }
    CATEGORY_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(*kw)))
        .map_or(DEFAULT_CATEGORY, |(name, _)| *name)
}

pub fn tags_for(text: &str, total_time_minutes: Option<u32>, category: &str) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = TAG_MATCHERS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(tag, _)| tag.to_string())
        .collect();

    match total_time_minutes {
        Some(t) if t <= QUICK_MAX_MINUTES => {
            tags.insert("quick".to_string());
        }
        Some(t) if t >= SLOW_MIN_MINUTES => {
            tags.insert("slow".to_string());
        }
        _ => {}
    }

    tags.insert(category.to_lowercase());
    tags
}

/// Fill in category and tags from the already-extracted fields.
pub fn enrich(mut recipe: ExtractedRecipe) -> ExtractedRecipe {
    let text = recipe.searchable_text();
    let category = categorize(&text);
    recipe.tags = tags_for(&text, recipe.total_time_minutes, category);
    recipe.category = category.to_string();
    recipe
}
