use similar::get_close_matches;

/// Minimum similarity ratio for a catalogue title to count as a match
pub const MATCH_CUTOFF: f32 = 0.6;

/// Finds the catalogue title closest to free-text input.
///
/// Titles are scored with the Ratcliff/Obershelp style ratio of
/// `similar::get_close_matches` (`2 * matches / total_len`), compared
/// case-insensitively on trimmed text. Returns the catalogue index of the best
/// title scoring at least [`MATCH_CUTOFF`]. Duplicate titles resolve to the
/// earliest entry.
pub fn find_closest_title<S: AsRef<str>>(query: &str, titles: &[S]) -> Option<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let normalized: Vec<String> = titles
        .iter()
        .map(|title| title.as_ref().trim().to_lowercase())
        .collect();
    let candidates: Vec<&str> = normalized.iter().map(String::as_str).collect();

    let best = get_close_matches(query.as_str(), &candidates, 1, MATCH_CUTOFF)
        .into_iter()
        .next()?;

    normalized.iter().position(|title| title == best)
}
