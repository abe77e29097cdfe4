//! Extraction prompt construction.
//!
//! The prompt embeds the sanitized page content, the target sport, the
//! current date as an explicit cutoff, and a literal JSON-array output
//! schema. The response parser depends on the model honoring this exact
//! shape, so the wording here is deliberately fixed.

use chrono::NaiveDate;

use crate::types::Level;

/// System instruction constraining the model to factual extraction.
pub const SYSTEM_PROMPT: &str = "You are a sports tournament data extraction expert.";

/// Probe sent by the connectivity self-check; the reply must contain
/// [`PROBE_ACK`].
pub const PROBE_PROMPT: &str = "Reply with exactly one word: OK";
pub const PROBE_ACK: &str = "OK";

/// Build the tournament extraction instruction for one source page.
pub fn build_extraction_prompt(
    clean_text: &str,
    sport: &str,
    source_url: &str,
    today: NaiveDate,
) -> String {
    let levels = Level::ALL.map(|l| l.as_str());
    let level_list = levels.join(", ");
    let level_alternatives = levels.join("|");
    let cutoff = today.format("%Y-%m-%d");

    format!(
        r#"Extract upcoming {sport} tournament information from this HTML content.

IMPORTANT RULES:
1. Only extract UPCOMING tournaments (starting after {cutoff})
2. Focus on tournaments, competitions, matches, series
3. Ignore news articles, player info, or irrelevant content
4. Classify each tournament level as: {level_list}

HTML Content:
{clean_text}

Return a JSON array with this exact format:
[
  {{
    "name": "Tournament Name",
    "level": "{level_alternatives}",
    "start_date": "YYYY-MM-DD",
    "end_date": "YYYY-MM-DD",
    "official_url": "{source_url}",
    "streaming_links": "Platform1, Platform2",
    "image_url": "image_url_if_found",
    "summary": "Brief description max 50 words",
    "location": "City, Country"
  }}
]

If no tournaments found, return empty array: []
"#
    )
}

/// Build the instruction for condensing a tournament into a short summary.
pub fn build_summary_prompt(tournament_text: &str) -> String {
    format!(
        r#"Summarize this tournament information in exactly 50 words or less:

{tournament_text}

Focus on: what type of tournament, who participates, when it happens, significance.
"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
