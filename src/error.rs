//! Error taxonomy for the extraction pipeline.
//!
//! Each pipeline stage has its own error type so callers can apply the
//! right degradation policy: fetch/extraction/parse errors degrade to
//! "zero records from this source", validation errors degrade per record,
//! and storage errors abort the run.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure to retrieve a source page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure at the extraction endpoint (transport or payload).
/// Transport errors are retried inside the client and surface as
/// `Exhausted` once the attempt budget is spent.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction endpoint returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed endpoint payload: {0}")]
    Payload(String),

    #[error("extraction failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// No usable JSON array in the model's reply.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON array found in model reply")]
    NoJsonArray,

    #[error("model reply contained invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A raw record that does not conform to the tournament schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("name length {0} outside 5..=200")]
    NameLength(usize),

    #[error("start_date `{0}` is not a valid YYYY-MM-DD date")]
    BadStartDate(String),

    #[error("start_date {start_date} is not after {today}")]
    NotUpcoming {
        start_date: NaiveDate,
        today: NaiveDate,
    },
}

/// Failure to write to or read from the tournament store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
