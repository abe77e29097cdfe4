//! Markup sanitizer.
//!
//! Strips script/style/comment blocks and collapses whitespace, then
//! truncates to a fixed character budget. The truncation is a hard
//! token-budget control for the extraction call — it is blind to
//! tournament-entry boundaries and may cut mid-record.
//!
//! Stripping is regex-based and does not attempt balanced tag matching;
//! nested or malformed blocks are handled only as well as non-greedy
//! patterns allow.

use once_cell::sync::Lazy;
use regex::Regex;

/// Character budget for sanitized content, truncation marker included.
pub const MAX_CLEAN_LEN: usize = 8_000;

const TRUNCATION_MARKER: &str = "...";

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Clean raw markup down to a bounded piece of text fit for the
/// extraction prompt.
pub fn sanitize(markup: &str) -> String {
    let stripped = strip_blocks(markup);
    let collapsed = collapse_whitespace(&stripped);
    truncate(collapsed)
}

fn strip_blocks(markup: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(markup, "");
    let without_styles = STYLE_RE.replace_all(&without_scripts, "");
    COMMENT_RE.replace_all(&without_styles, "").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap at `MAX_CLEAN_LEN` characters. The marker fits inside the budget
/// so a second pass over already-truncated output is a no-op.
fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_CLEAN_LEN {
        return text;
    }

    let mut out: String = text
        .chars()
        .take(MAX_CLEAN_LEN - TRUNCATION_MARKER.len())
        .collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
