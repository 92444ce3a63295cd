// src/checker/markdown.rs
// =============================================================================
// This module extracts candidate URLs from the text of a markdown cell.
//
// Two patterns are applied to the same text:
// 1. Markdown links:  [label](target)   -> we keep `target`
// 2. Bare URLs:       http(s)://...     -> runs of non-space, non-')' chars
//
// Markdown targets come first in the output, then bare URLs, and the combined
// list is deduplicated keeping the first occurrence. The extractor does NOT
// filter by scheme: relative paths and #anchors come out too, and the caller
// decides what is worth probing (see http::is_probeable).
//
// Rust concepts:
// - LazyLock: Compile each regex once, on first use
// - HashSet: O(1) "have we seen this?" checks
// - Iterators: captures_iter / find_iter walk matches in document order
// =============================================================================

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// [label](target) - label must be non-empty, target runs until the first ')'
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link pattern is valid")
});

// http:// or https:// followed by anything that isn't whitespace or ')'
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("bare url pattern is valid"));

// Extracts all link targets from markdown text
//
// Parameters:
//   markdown: the cell text (borrowed as &str, may be empty)
//
// Returns: Vec<String> of unique links in order of first appearance
//
// Example input:
//   "[a](http://x.com) see also http://x.com"
//
// Example output:
//   vec!["http://x.com"]
pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    let markdown_targets = MARKDOWN_LINK
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str());

    let bare_urls = BARE_URL.find_iter(markdown).map(|m| m.as_str());

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for link in markdown_targets.chain(bare_urls) {
        // insert() returns false when the value was already present
        if seen.insert(link) {
            links.push(link.to_string());
        }
    }

    links
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why regex instead of a full markdown parser?
//    - Notebook cells often contain half-valid markdown, HTML and raw URLs
//    - A pattern match picks up links wherever they appear, including bare
//      URLs that a CommonMark parser would only see as plain text
//
// 2. What is LazyLock?
//    - A static that is initialised the first time it is used
//    - Compiling a regex is relatively expensive, so we do it once
//
// 3. Why does seen hold &str and not String?
//    - The matches borrow from `markdown`, which outlives this function call
//    - We only allocate a String for links we actually keep
// -----------------------------------------------------------------------------
