//! End-to-end pipeline tests.
//!
//! Drives real markup through sanitize → prompt → extract → parse →
//! validate → persist with a stub extraction endpoint and an in-memory
//! store. No network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use tourneycal::config::SourceSpec;
use tourneycal::engine::pipeline::ScrapePipeline;
use tourneycal::error::ExtractionError;
use tourneycal::fetch::PageFetcher;
use tourneycal::llm::TournamentExtractor;
use tourneycal::storage::TournamentStore;

const SOURCE_URL: &str = "https://fixtures.test/cricket/series";

const PAGE_MARKUP: &str = r#"
<html>
  <head>
    <style>.fixture { color: #333; }</style>
    <script>window.tracker = "noise";</script>
  </head>
  <body>
    <!-- fixtures table -->
    <h1>Cricket fixtures</h1>
    <div class="fixture">Global Championship Trophy — June 10, 2025, London</div>
    <div class="fixture">Heritage Cup — May 1, 2025, Chennai (concluded)</div>
  </body>
</html>
"#;

/// What the model would plausibly reply for [`PAGE_MARKUP`]: one
/// qualifying tournament, one already past, one missing its name.
const MODEL_REPLY: &str = r#"Here is the extracted data:
[
  {
    "name": "Global Championship Trophy",
    "level": "International",
    "start_date": "2025-06-10",
    "end_date": "2025-06-24",
    "streaming_links": "Hotstar, Sky Sports",
    "summary": "Biennial championship final series.",
    "location": "London, England"
  },
  {
    "name": "Heritage Cup",
    "level": "National",
    "start_date": "2025-05-01",
    "location": "Chennai, India"
  },
  {
    "level": "Club",
    "start_date": "2025-07-01"
  }
]
Let me know if you need anything else."#;

struct StubExtractor {
    reply: String,
}

#[async_trait]
impl TournamentExtractor for StubExtractor {
    async fn extract(&self, _prompt: &str) -> Result<String, ExtractionError> {
        Ok(self.reply.clone())
    }

    async fn summarize(&self, _tournament_text: &str) -> Result<String, ExtractionError> {
        Ok("A stub summary.".to_string())
    }

    async fn test_connection(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn source() -> SourceSpec {
    SourceSpec {
        url: SOURCE_URL.to_string(),
        bucket: None,
    }
}

async fn pipeline_with_reply(reply: &str) -> ScrapePipeline {
    let store = TournamentStore::in_memory().await.unwrap();
    store.init_schema().await.unwrap();
    ScrapePipeline::new(
        PageFetcher::new(Duration::from_secs(5)).unwrap(),
        Box::new(StubExtractor {
            reply: reply.to_string(),
        }),
        store,
        false,
    )
}

#[tokio::test]
async fn persists_only_the_upcoming_tournament() {
    let pipeline = pipeline_with_reply(MODEL_REPLY).await;

    let report = pipeline
        .process_markup("cricket", &source(), PAGE_MARKUP, today())
        .await
        .unwrap();

    assert!(!report.failed);
    assert_eq!(report.extracted, 3);
    assert_eq!(report.saved, 1);
    assert_eq!(report.rejected, 2);

    let store = pipeline.store();
    assert_eq!(store.count_for_sport("cricket").await.unwrap(), 1);

    let breakdown = store.breakdown_by_level("cricket").await.unwrap();
    assert_eq!(breakdown, vec![("International".to_string(), 1)]);

    let rows = store.list_by_sport("cricket").await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.name, "Global Championship Trophy");
    assert_eq!(row.level, "International");
    assert_eq!(row.start_date.as_deref(), Some("2025-06-10"));
    assert_eq!(row.end_date.as_deref(), Some("2025-06-24"));
    // No official_url in the model reply: defaults to the source URL.
    assert_eq!(row.official_url.as_deref(), Some(SOURCE_URL));
    assert_eq!(row.streaming_links.as_deref(), Some("Hotstar, Sky Sports"));
    assert_eq!(row.location.as_deref(), Some("London, England"));
}

#[tokio::test]
async fn empty_array_reply_is_a_clean_zero() {
    let pipeline = pipeline_with_reply("No qualifying tournaments.\n[]").await;

    let report = pipeline
        .process_markup("cricket", &source(), PAGE_MARKUP, today())
        .await
        .unwrap();

    assert!(!report.failed);
    assert_eq!(report.extracted, 0);
    assert_eq!(report.saved, 0);
    assert_eq!(pipeline.store().count_for_sport("cricket").await.unwrap(), 0);
}

#[tokio::test]
async fn repeated_runs_duplicate_rows() {
    // Documented gap: no dedup key, so re-scraping re-inserts.
    let pipeline = pipeline_with_reply(MODEL_REPLY).await;

    for _ in 0..2 {
        pipeline
            .process_markup("cricket", &source(), PAGE_MARKUP, today())
            .await
            .unwrap();
    }

    assert_eq!(pipeline.store().count_for_sport("cricket").await.unwrap(), 2);
    let breakdown = pipeline.store().breakdown_by_level("cricket").await.unwrap();
    assert_eq!(breakdown, vec![("International".to_string(), 2)]);
}
