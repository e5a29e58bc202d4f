//! Topic-to-slug normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest slug produced; longer topics are cut at this many characters.
const MAX_SLUG_LEN: usize = 50;

/// Slug used when the topic contains no usable characters at all.
const EMPTY_SLUG: &str = "untitled";

static STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s_-]+").unwrap());
static JOIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Normalizes a free-text topic into a filesystem-safe slug: lowercase, words
/// joined by single hyphens, everything else stripped, capped at 50 characters.
///
/// Deterministic and idempotent on its own output. Distinct topics may collide
/// ("MCP servers" and "mcp_servers" map to the same slug); the store treats a
/// collision as the same entry and the last write wins. A topic with no usable
/// characters maps to `"untitled"`.
pub fn resolve_slug(topic: &str) -> String {
    let lower = topic.to_lowercase();
    let stripped = STRIP.replace_all(&lower, "");
    let joined = JOIN.replace_all(stripped.trim(), "-");
    let truncated: String = joined.chars().take(MAX_SLUG_LEN).collect();
    let slug = truncated.trim_matches('-');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
