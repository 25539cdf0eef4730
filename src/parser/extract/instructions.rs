use std::sync::LazyLock;

use regex::Regex;

static STEP_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:step\s*\d+\s*[:.)-]?|\d+\s*[.)]|[-*•·▪◦]+)\s*").unwrap());

const MIN_STEP_CHARS: usize = 5;

/// Strip a leading step number or bullet. Returns `None` when what is
/// left is too short to be a step.
pub fn clean_step(line: &str) -> Option<String> {
    let text = match STEP_MARKER_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    };
    (text.chars().count() >= MIN_STEP_CHARS).then(|| text.to_string())
}
