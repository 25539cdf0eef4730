/// Split raw text into trimmed lines. `\r\n` and lone `\r` count as line
/// breaks. Empty lines are kept: the boundary pass reads them.
pub fn normalize(raw: &str) -> Vec<String> {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|l| l.trim().to_string())
        .collect()
}
