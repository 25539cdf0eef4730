use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::recipe::RecipeBlock;
use super::DetectorConfig;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|={3,}|\*{3,}|_{3,}|(?i:recipe\s*:))").unwrap());
static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z'&,\- ]{4,59}$").unwrap());
static NUMBERED_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+[A-Z]").unwrap());
static RECIPE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^recipe\s*:\s*\S").unwrap());
static FLANKED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-=]{2,}.*[^-=\s].*[-=]{2,}$").unwrap());

/// Words that mark a section header rather than a recipe name.
pub const SECTION_KEYWORDS: &[&str] = &[
    "ingredient",
    "instruction",
    "direction",
    "method",
    "preparation",
    "steps",
    "notes",
    "what you need",
];

/// Why a line closed the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRule {
    /// `---`, `===`, `***`, `___` or a `Recipe:` prefix.
    Separator,
    /// Blank line in a full block, followed by a title-like line.
    BlankBeforeTitle,
    /// Second blank line in a row once the block has enough lines.
    BlankGap,
    /// Title-like line after the block already looks complete.
    TitleAfterFullBlock,
}

/// The lines around the one being classified.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub prev: &'a str,
    pub current: &'a str,
    pub next: &'a str,
    /// Everything after `current`.
    pub rest: &'a [String],
    /// Lines already collected for the open block.
    pub accumulated: usize,
}

impl Window<'_> {
    fn next_non_empty(&self) -> Option<&str> {
        self.rest.iter().map(String::as_str).find(|l| !l.is_empty())
    }
}

type RulePredicate = fn(&Window<'_>, &DetectorConfig) -> bool;

/// Evaluated top to bottom; the first hit wins.
const BOUNDARY_RULES: &[(BoundaryRule, RulePredicate)] = &[
    (BoundaryRule::Separator, is_separator),
    (BoundaryRule::BlankBeforeTitle, is_blank_before_title),
    (BoundaryRule::BlankGap, is_blank_gap),
    (BoundaryRule::TitleAfterFullBlock, is_title_after_full_block),
];

fn is_separator(w: &Window<'_>, _: &DetectorConfig) -> bool {
    SEPARATOR_RE.is_match(w.current)
}

fn is_blank_before_title(w: &Window<'_>, c: &DetectorConfig) -> bool {
    w.current.is_empty()
        && w.accumulated > c.complete_block_lines
        && w.next_non_empty().is_some_and(looks_like_title)
}

fn is_blank_gap(w: &Window<'_>, c: &DetectorConfig) -> bool {
    w.current.is_empty() && w.prev.is_empty() && !w.next.is_empty() && w.accumulated > c.min_block_lines
}

fn is_title_after_full_block(w: &Window<'_>, c: &DetectorConfig) -> bool {
    w.accumulated > c.complete_block_lines && looks_like_title(w.current)
}

pub fn boundary_rule(window: &Window<'_>, config: &DetectorConfig) -> Option<BoundaryRule> {
    BOUNDARY_RULES
        .iter()
        .find(|(_, matches)| matches(window, config))
        .map(|(rule, _)| *rule)
}

/// Heuristic for a line that names a recipe.
pub fn looks_like_title(line: &str) -> bool {
    let len = line.chars().count();
    if !(5..=80).contains(&len) {
        return false;
    }

    CAPITALIZED_RE.is_match(line)
        || NUMBERED_TITLE_RE.is_match(line)
        || RECIPE_PREFIX_RE.is_match(line)
        || FLANKED_RE.is_match(line)
        || looks_like_capitalized_name(line, len)
}

fn looks_like_capitalized_name(line: &str, len: usize) -> bool {
    let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper || len >= 60 {
        return false;
    }
    let lower = line.to_lowercase();
    !SECTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Split the line stream into candidate recipe blocks, in document order.
pub fn partition(lines: &[String], config: &DetectorConfig) -> Vec<RecipeBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut start = 0;

    for (i, line) in lines.iter().enumerate() {
        let window = Window {
            prev: i.checked_sub(1).map_or("", |p| lines[p].as_str()),
            current: line,
            next: lines.get(i + 1).map_or("", String::as_str),
            rest: &lines[i + 1..],
            accumulated: current.len(),
        };

        match boundary_rule(&window, config) {
            Some(rule) => {
                debug!(line = i, ?rule, accumulated = current.len(), "recipe boundary");
                flush(&mut blocks, &mut current, start, config);
                if looks_like_title(line) {
                    start = i;
                    current.push(line.clone());
                }
            }
            None => {
                if current.is_empty() {
                    start = i;
                }
                current.push(line.clone());
            }
        }
    }

    flush(&mut blocks, &mut current, start, config);
    blocks
}

fn flush(
    blocks: &mut Vec<RecipeBlock>,
    current: &mut Vec<String>,
    start: usize,
    config: &DetectorConfig,
) {
    if current.len() > config.min_block_lines {
        let lines = std::mem::take(current);
        blocks.push(RecipeBlock {
            start_index: start,
            end_index: start + lines.len() - 1,
            lines,
        });
    } else if !current.is_empty() {
        debug!(start, lines = current.len(), "dropping short block");
        current.clear();
    }
}
