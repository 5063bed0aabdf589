//! Completion promise detection
//!
//! The agent signals that its task is done by emitting the literal text
//! `<promise>MARKER</promise>` anywhere in its output. Detection is a
//! case-insensitive literal-substring search: the marker is matched verbatim
//! inside the fixed delimiters, never compiled into a pattern, so characters
//! that are special in regex syntax carry no meaning here.

/// Build the literal tag the agent must emit for the given marker.
pub fn promise_tag(marker: &str) -> String {
    format!("<promise>{marker}</promise>")
}

/// Returns true if `transcript` contains the completion promise for `marker`.
///
/// Pure function: two calls with the same inputs always agree. An empty
/// transcript never matches.
pub fn contains_promise(transcript: &str, marker: &str) -> bool {
    if transcript.is_empty() {
        return false;
    }
    let needle = promise_tag(marker).to_lowercase();
    transcript.to_lowercase().contains(&needle)
}
