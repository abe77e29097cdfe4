//! Record validator.
//!
//! Maps a loosely-typed object from the model reply into a
//! [`Tournament`], enforcing the schema: required fields, name length
//! bounds, strict date format, and the forward-looking date cutoff.
//!
//! Level policy (strict mode): a level outside the enumerated vocabulary
//! is coerced to [`DEFAULT_LEVEL`] and warn-logged rather than rejected.
//! The lenient keep-and-log variant is intentionally not implemented.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::types::{Level, Tournament};

pub const NAME_MIN_CHARS: usize = 5;
pub const NAME_MAX_CHARS: usize = 200;

/// Fallback for unrecognized level values.
pub const DEFAULT_LEVEL: Level = Level::Club;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate one raw object against the tournament schema.
///
/// `sport` is caller-supplied and never taken from the object.
/// `today` is the extraction run's reference date; only tournaments
/// starting strictly after it are accepted.
pub fn validate(
    raw: &Value,
    sport: &str,
    source_url: &str,
    today: NaiveDate,
) -> Result<Tournament, ValidationError> {
    let name = required_str(raw, "name")?;
    let name_len = name.chars().count();
    if name_len < NAME_MIN_CHARS || name_len > NAME_MAX_CHARS {
        return Err(ValidationError::NameLength(name_len));
    }

    let level_raw = required_str(raw, "level")?;
    let level = match level_raw.parse::<Level>() {
        Ok(level) => level,
        Err(()) => {
            warn!(
                name = %name,
                level = %level_raw,
                default = %DEFAULT_LEVEL,
                "Unrecognized level, coercing to default"
            );
            DEFAULT_LEVEL
        }
    };

    let start_raw = required_str(raw, "start_date")?;
    let start_date = NaiveDate::parse_from_str(&start_raw, DATE_FORMAT)
        .map_err(|_| ValidationError::BadStartDate(start_raw.clone()))?;
    if start_date <= today {
        return Err(ValidationError::NotUpcoming { start_date, today });
    }

    // end_date is optional; unparseable or before-start values are
    // normalized away, not fatal.
    let end_date = optional_str(raw, "end_date")
        .and_then(|s| match NaiveDate::parse_from_str(&s, DATE_FORMAT) {
            Ok(d) if d >= start_date => Some(d),
            Ok(d) => {
                debug!(name = %name, end_date = %d, "end_date precedes start_date, dropping");
                None
            }
            Err(_) => {
                debug!(name = %name, end_date = %s, "Unparseable end_date, dropping");
                None
            }
        });

    let official_url =
        optional_str(raw, "official_url").unwrap_or_else(|| source_url.to_string());

    Ok(Tournament {
        name,
        sport: sport.to_string(),
        level,
        start_date,
        end_date,
        official_url,
        streaming_links: optional_str(raw, "streaming_links"),
        image_url: optional_str(raw, "image_url"),
        summary: optional_str(raw, "summary"),
        location: optional_str(raw, "location"),
    })
}

fn required_str(raw: &Value, key: &'static str) -> Result<String, ValidationError> {
    optional_str(raw, key).ok_or(ValidationError::MissingField(key))
}

/// A present, non-empty string field; anything else is None.
fn optional_str(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn base_object() -> Value {
        json!({
            "name": "World Test Championship",
            "level": "International",
            "start_date": "2025-06-02",
            "end_date": "2025-06-20",
            "official_url": "https://official.test/wtc",
            "streaming_links": "Hotstar, YouTube",
            "image_url": "https://img.test/wtc.png",
            "summary": "The final of the championship cycle.",
            "location": "London, England"
        })
    }

    #[test]
    fn test_valid_record_maps_fully() {
        let t = validate(&base_object(), "cricket", "https://src.test", today()).unwrap();
        assert_eq!(t.name, "World Test Championship");
        assert_eq!(t.sport, "cricket");
        assert_eq!(t.level, Level::International);
        assert_eq!(t.start_date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(t.end_date, NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(t.official_url, "https://official.test/wtc");
        assert_eq!(t.location.as_deref(), Some("London, England"));
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        for field in ["name", "level", "start_date"] {
            let mut obj = base_object();
            obj.as_object_mut().unwrap().remove(field);
            let err = validate(&obj, "cricket", "https://src.test", today()).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(field));
        }
    }

    #[test]
    fn test_empty_name_counts_as_missing() {
        let mut obj = base_object();
        obj["name"] = json!("   ");
        let err = validate(&obj, "cricket", "https://src.test", today()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }

    #[test]
    fn test_non_string_name_counts_as_missing() {
        let mut obj = base_object();
        obj["name"] = json!(42);
        let err = validate(&obj, "cricket", "https://src.test", today()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }

    #[test]
    fn test_name_length_boundaries() {
        let check = |name: String| {
            let mut obj = base_object();
            obj["name"] = json!(name);
            validate(&obj, "cricket", "https://src.test", today())
        };

        assert_eq!(
            check("Quad".into()).unwrap_err(),
            ValidationError::NameLength(4)
        );
        assert!(check("Pents".into()).is_ok());
        assert!(check("N".repeat(200)).is_ok());
        assert_eq!(
            check("N".repeat(201)).unwrap_err(),
            ValidationError::NameLength(201)
        );
    }

    #[test]
    fn test_date_cutoff_is_strict() {
        let check = |date: &str| {
            let mut obj = base_object();
            obj["start_date"] = json!(date);
            obj.as_object_mut().unwrap().remove("end_date");
            validate(&obj, "cricket", "https://src.test", today())
        };

        assert!(matches!(
            check("2025-05-30").unwrap_err(),
            ValidationError::NotUpcoming { .. }
        ));
        // Starting today is not strictly after today.
        assert!(matches!(
            check("2025-06-01").unwrap_err(),
            ValidationError::NotUpcoming { .. }
        ));
        assert!(check("2025-06-02").is_ok());
    }

    #[test]
    fn test_malformed_start_date_rejected() {
        for bad in ["02-06-2025", "2025/06/02", "June 2nd", "2025-13-40", ""] {
            let mut obj = base_object();
            obj["start_date"] = json!(bad);
            let err = validate(&obj, "cricket", "https://src.test", today()).unwrap_err();
            match bad {
                "" => assert_eq!(err, ValidationError::MissingField("start_date")),
                _ => assert!(matches!(err, ValidationError::BadStartDate(_))),
            }
        }
    }

    #[test]
    fn test_unknown_level_coerced_to_default() {
        let mut obj = base_object();
        obj["level"] = json!("Intergalactic");
        let t = validate(&obj, "cricket", "https://src.test", today()).unwrap();
        assert_eq!(t.level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_end_date_before_start_dropped() {
        let mut obj = base_object();
        obj["end_date"] = json!("2025-06-01");
        let t = validate(&obj, "cricket", "https://src.test", today()).unwrap();
        assert_eq!(t.end_date, None);
    }

    #[test]
    fn test_unparseable_end_date_dropped() {
        let mut obj = base_object();
        obj["end_date"] = json!("TBD");
        let t = validate(&obj, "cricket", "https://src.test", today()).unwrap();
        assert_eq!(t.end_date, None);
    }

    #[test]
    fn test_official_url_defaults_to_source() {
        let mut obj = base_object();
        obj.as_object_mut().unwrap().remove("official_url");
        let t = validate(&obj, "cricket", "https://src.test/page", today()).unwrap();
        assert_eq!(t.official_url, "https://src.test/page");
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate(&json!(1), "cricket", "https://src.test", today()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }
}
