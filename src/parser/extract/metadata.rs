use std::sync::LazyLock;

use regex::Regex;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(prep|cook|total)(?:aration|ing)?\s*time\s*:?\s*(\d+)\s*(minutes?|mins?|m|hours?|hrs?|hr|h)\b")
        .unwrap()
});
// Mid-line servings need the colon form, so "This makes 2 loaves" is prose.
static SERVINGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:servings|serves|yields?|makes)\b\s*:?\s*(\d+)|\b(?:servings|serves|yields?|makes)\s*:\s*(\d+)")
        .unwrap()
});

/// Metadata found on a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineMetadata {
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub total_time_minutes: Option<u32>,
    pub servings: Option<u32>,
}

impl LineMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Times are reported in minutes; hour values are multiplied by 60.
pub fn scan(line: &str) -> LineMetadata {
    let mut found = LineMetadata::default();

    for caps in TIME_RE.captures_iter(line) {
        let Ok(value) = caps[2].parse::<u32>() else {
            continue;
        };
        let minutes = if caps[3].to_lowercase().starts_with('h') {
            value.saturating_mul(60)
        } else {
            value
        };
        match caps[1].to_lowercase().as_str() {
            "prep" => found.prep_time_minutes = Some(minutes),
            "cook" => found.cook_time_minutes = Some(minutes),
            _ => found.total_time_minutes = Some(minutes),
        }
    }

    if let Some(caps) = SERVINGS_RE.captures(line) {
        found.servings = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok());
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prep_and_cook() {
        assert_eq!(scan("Prep time: 10 min").prep_time_minutes, Some(10));
        assert_eq!(scan("Cook Time: 20 minutes").cook_time_minutes, Some(20));
        assert_eq!(scan("Total time 45 mins").total_time_minutes, Some(45));
        assert_eq!(scan("Preparation time: 5 min").prep_time_minutes, Some(5));
        assert_eq!(scan("Cooking time: 8 min").cook_time_minutes, Some(8));
    }

    #[test]
    fn hours_become_minutes() {
        assert_eq!(scan("Cook time: 2 hours").cook_time_minutes, Some(120));
        assert_eq!(scan("Total time: 1 hr").total_time_minutes, Some(60));
    }

    #[test]
    fn several_on_one_line() {
        let m = scan("Prep time: 15 min | Cook time: 30 min");
        assert_eq!(m.prep_time_minutes, Some(15));
        assert_eq!(m.cook_time_minutes, Some(30));
        assert_eq!(m.total_time_minutes, None);
    }

    #[test]
    fn servings_variants() {
        assert_eq!(scan("Servings: 4").servings, Some(4));
        assert_eq!(scan("Serves 6").servings, Some(6));
        assert_eq!(scan("Yield: 12 cookies").servings, Some(12));
        assert_eq!(scan("Makes 2 loaves").servings, Some(2));
    }

    #[test]
    fn servings_after_times_on_one_line() {
        let m = scan("Prep time: 10 min | Servings: 4");
        assert_eq!(m.prep_time_minutes, Some(10));
        assert_eq!(m.servings, Some(4));

        let m = scan("Cook time: 1 hour, serves: 6");
        assert_eq!(m.cook_time_minutes, Some(60));
        assert_eq!(m.servings, Some(6));
    }

    #[test]
    fn plain_lines_carry_nothing() {
        assert!(scan("Simmer for 20 minutes.").is_empty());
        assert!(scan("This makes 2 loaves").is_empty());
        assert!(scan("Each batch serves 8 people").is_empty());
        assert!(scan("2 cups flour").is_empty());
    }
}
