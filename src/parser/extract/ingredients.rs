use std::sync::LazyLock;

use regex::Regex;

use crate::parser::recipe::ParsedIngredient;

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•·▪◦]+\s*|\d+[.)]\s+)").unwrap());

// One leading number (integer, decimal or simple fraction) and an optional
// unit. Ranges and mixed numbers are not recognized.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(\d+(?:[./]\d+)?|[½⅓⅔¼¾⅛])\s*",
        r"(?:(cups?|c|tablespoons?|tbsps?|tbs|teaspoons?|tsps?|ounces?|oz|pounds?|lbs?",
        r"|grams?|g|kilograms?|kg|milliliters?|ml|liters?|litres?|l|quarts?|qt|pints?|pt",
        r"|gallons?|pinch(?:es)?|dash(?:es)?|cloves?|cans?|slices?|pieces?|sticks?",
        r"|packages?|pkg|bunch(?:es)?|sprigs?|heads?)\.?(?:\s+|$))?",
        r"(.*)$",
    ))
    .unwrap()
});

/// Strip list decoration from an ingredient line.
pub fn clean_line(line: &str) -> &str {
    match BULLET_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Parse one ingredient line. `None` for lines too short to name anything.
pub fn parse_line(line: &str, order: usize) -> Option<ParsedIngredient> {
    let cleaned = clean_line(line);
    if cleaned.chars().count() < 2 {
        return None;
    }

    let (quantity, unit, rest) = match QUANTITY_RE.captures(cleaned) {
        Some(caps) if !caps[3].trim().is_empty() => (
            Some(caps[1].to_string()),
            caps.get(2).map(|m| m.as_str().to_string()),
            caps.get(3).map_or("", |m| m.as_str()).trim(),
        ),
        _ => (None, None, cleaned),
    };

    let (name, preparation_note) = match rest.split_once(',') {
        Some((name, note)) => {
            let note = note.trim();
            (name.trim(), (!note.is_empty()).then(|| note.to_string()))
        }
        None => (rest, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedIngredient {
        raw_text: line.to_string(),
        quantity,
        unit,
        ingredient_name: name.to_string(),
        preparation_note,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_unit_name() {
        let ing = parse_line("2 cups tomatoes", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("2"));
        assert_eq!(ing.unit.as_deref(), Some("cups"));
        assert_eq!(ing.ingredient_name, "tomatoes");
        assert_eq!(ing.preparation_note, None);
        assert_eq!(ing.raw_text, "2 cups tomatoes");
    }

    #[test]
    fn preparation_after_comma() {
        let ing = parse_line("1 onion, diced", 2).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("1"));
        assert_eq!(ing.unit, None);
        assert_eq!(ing.ingredient_name, "onion");
        assert_eq!(ing.preparation_note.as_deref(), Some("diced"));
        assert_eq!(ing.order, 2);
    }

    #[test]
    fn fractions_and_decimals() {
        let ing = parse_line("1/4 cup parmesan, grated", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("1/4"));
        assert_eq!(ing.unit.as_deref(), Some("cup"));
        assert_eq!(ing.ingredient_name, "parmesan");

        let ing = parse_line("1.5 lbs chicken thighs", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("1.5"));
        assert_eq!(ing.unit.as_deref(), Some("lbs"));
    }

    #[test]
    fn unit_glued_to_number() {
        let ing = parse_line("500g flour", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("500"));
        assert_eq!(ing.unit.as_deref(), Some("g"));
        assert_eq!(ing.ingredient_name, "flour");
    }

    #[test]
    fn unit_prefix_of_a_word_is_not_a_unit() {
        let ing = parse_line("2 large eggs", 0).unwrap();
        assert_eq!(ing.unit, None);
        assert_eq!(ing.ingredient_name, "large eggs");

        let ing = parse_line("3 green onions", 0).unwrap();
        assert_eq!(ing.unit, None);
        assert_eq!(ing.ingredient_name, "green onions");
    }

    #[test]
    fn bullets_and_numbering() {
        assert_eq!(parse_line("- 2 tbsp butter", 0).unwrap().ingredient_name, "butter");
        assert_eq!(parse_line("• salt", 0).unwrap().ingredient_name, "salt");
        let ing = parse_line("3. 1 tsp cumin", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("1"));
        assert_eq!(ing.ingredient_name, "cumin");
    }

    #[test]
    fn no_quantity() {
        let ing = parse_line("Salt and pepper to taste", 0).unwrap();
        assert_eq!(ing.quantity, None);
        assert_eq!(ing.ingredient_name, "Salt and pepper to taste");
    }

    #[test]
    fn mixed_numbers_and_ranges_stay_in_the_name() {
        let ing = parse_line("1 1/2 cups flour", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("1"));
        assert_eq!(ing.unit, None);
        assert_eq!(ing.ingredient_name, "1/2 cups flour");

        let ing = parse_line("2-3 cups stock", 0).unwrap();
        assert_eq!(ing.quantity.as_deref(), Some("2"));
        assert_eq!(ing.ingredient_name, "-3 cups stock");
    }

    #[test]
    fn too_short_or_nameless() {
        assert!(parse_line("-", 0).is_none());
        assert!(parse_line("x", 0).is_none());
        assert!(parse_line(", chopped", 0).is_none());
    }

    #[test]
    fn quantity_alone_is_the_name() {
        let ing = parse_line("2 cups", 0).unwrap();
        assert_eq!(ing.quantity, None);
        assert_eq!(ing.ingredient_name, "2 cups");
    }
}
