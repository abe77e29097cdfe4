//! Shared types for the tournament collector.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the pipeline, storage,
//! and CLI modules can depend on them without circular references.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Competitive tier of a tournament, from international down to district.
///
/// This is the exact vocabulary the extraction prompt instructs the model
/// to use; values outside it are coerced by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    International,
    National,
    State,
    Regional,
    College,
    School,
    Club,
    Corporate,
    District,
}

impl Level {
    /// All levels, in prompt vocabulary order.
    pub const ALL: [Level; 9] = [
        Level::International,
        Level::National,
        Level::State,
        Level::Regional,
        Level::College,
        Level::School,
        Level::Club,
        Level::Corporate,
        Level::District,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::International => "International",
            Level::National => "National",
            Level::State => "State",
            Level::Regional => "Regional",
            Level::College => "College",
            Level::School => "School",
            Level::Club => "Club",
            Level::Corporate => "Corporate",
            Level::District => "District",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or(())
    }
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

/// A validated tournament listing, ready to persist.
///
/// Instances are only produced by the validator; the sport is always
/// caller-supplied, never taken from the model's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub name: String,
    pub sport: String,
    pub level: Level,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Defaults to the source URL when the model does not supply one.
    pub official_url: String,
    /// Comma-separated platform names, free text.
    pub streaming_links: Option<String>,
    pub image_url: Option<String>,
    pub summary: Option<String>,
    /// Free text "City, Country".
    pub location: Option<String>,
}

impl fmt::Display for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}, starts {})",
            self.sport, self.name, self.level, self.start_date
        )
    }
}

impl Tournament {
    /// Helper to build a test tournament with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Tournament {
            name: "Sample Trophy 2099".to_string(),
            sport: "cricket".to_string(),
            level: Level::International,
            start_date: NaiveDate::from_ymd_opt(2099, 3, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2099, 3, 14).unwrap()),
            official_url: "https://example.com/series".to_string(),
            streaming_links: Some("Hotstar, YouTube".to_string()),
            image_url: None,
            summary: Some("A sample tournament for tests.".to_string()),
            location: Some("Mumbai, India".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
