//! Per-source scraping pipeline.
//!
//! Drives one source URL through the full stage chain and aggregates
//! per-sport reports. Failure policy: fetch, extraction, and parse
//! failures degrade to "zero records from this source" and the run
//! moves on; a rejected record never blocks its siblings; only storage
//! failures abort the run.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::config::{SourceSpec, SportSources};
use crate::error::StorageError;
use crate::fetch::PageFetcher;
use crate::llm::{TournamentExtractor, SUMMARY_FALLBACK};
use crate::parse::extract_tournament_objects;
use crate::prompt::build_extraction_prompt;
use crate::sanitize::sanitize;
use crate::storage::TournamentStore;
use crate::types::Tournament;
use crate::validate::validate;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of one source URL.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub url: String,
    /// True when fetch/extraction/parse failed and the source yielded
    /// nothing; the counts below are then all zero.
    pub failed: bool,
    pub extracted: usize,
    pub saved: usize,
    pub rejected: usize,
    pub filtered: usize,
}

impl SourceReport {
    fn new(url: &str) -> Self {
        SourceReport {
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn failed(url: &str) -> Self {
        SourceReport {
            url: url.to_string(),
            failed: true,
            ..Default::default()
        }
    }
}

/// Aggregated outcome of one sport's run across all its sources.
#[derive(Debug, Clone, Default)]
pub struct SportReport {
    pub sport: String,
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub extracted: usize,
    pub saved: usize,
    pub rejected: usize,
    pub filtered: usize,
}

impl SportReport {
    fn new(sport: &str) -> Self {
        SportReport {
            sport: sport.to_string(),
            ..Default::default()
        }
    }

    fn absorb(&mut self, source: &SourceReport) {
        if source.failed {
            self.sources_failed += 1;
            return;
        }
        self.sources_processed += 1;
        self.extracted += source.extracted;
        self.saved += source.saved;
        self.rejected += source.rejected;
        self.filtered += source.filtered;
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct ScrapePipeline {
    fetcher: PageFetcher,
    extractor: Box<dyn TournamentExtractor>,
    store: TournamentStore,
    fill_missing_summaries: bool,
}

impl ScrapePipeline {
    pub fn new(
        fetcher: PageFetcher,
        extractor: Box<dyn TournamentExtractor>,
        store: TournamentStore,
        fill_missing_summaries: bool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            fill_missing_summaries,
        }
    }

    pub fn store(&self) -> &TournamentStore {
        &self.store
    }

    /// Run the pipeline over every source configured for a sport.
    pub async fn run_sport(&self, sport: &SportSources) -> Result<SportReport, StorageError> {
        info!(
            sport = %sport.name,
            sources = sport.sources.len(),
            "Starting sport scrape"
        );

        let mut report = SportReport::new(&sport.name);
        for source in &sport.sources {
            let source_report = self.process_source(&sport.name, source).await?;
            if !source_report.failed {
                info!(
                    url = %source_report.url,
                    extracted = source_report.extracted,
                    saved = source_report.saved,
                    rejected = source_report.rejected,
                    filtered = source_report.filtered,
                    "Source complete"
                );
            }
            report.absorb(&source_report);
        }

        info!(
            sport = %report.sport,
            sources_processed = report.sources_processed,
            sources_failed = report.sources_failed,
            saved = report.saved,
            rejected = report.rejected,
            filtered = report.filtered,
            "Sport scrape complete"
        );
        Ok(report)
    }

    /// Fetch one source page and run it through the pipeline.
    pub async fn process_source(
        &self,
        sport: &str,
        source: &SourceSpec,
    ) -> Result<SourceReport, StorageError> {
        info!(url = %source.url, "Fetching source");
        let markup = match self.fetcher.fetch(&source.url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(url = %source.url, error = %e, "Fetch failed, skipping source");
                return Ok(SourceReport::failed(&source.url));
            }
        };

        let today = Utc::now().date_naive();
        self.process_markup(sport, source, &markup, today).await
    }

    /// Run already-fetched markup through sanitize → prompt → extract →
    /// parse → validate → persist. `today` is the run's reference date.
    pub async fn process_markup(
        &self,
        sport: &str,
        source: &SourceSpec,
        markup: &str,
        today: NaiveDate,
    ) -> Result<SourceReport, StorageError> {
        let mut report = SourceReport::new(&source.url);

        let clean = sanitize(markup);
        let prompt = build_extraction_prompt(&clean, sport, &source.url, today);

        let reply = match self.extractor.extract(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(url = %source.url, error = %e, "Extraction failed, skipping source");
                report.failed = true;
                return Ok(report);
            }
        };

        let objects = match extract_tournament_objects(&reply) {
            Ok(objects) => objects,
            Err(e) => {
                warn!(url = %source.url, error = %e, "No tournaments parsed from model reply");
                report.failed = true;
                return Ok(report);
            }
        };
        report.extracted = objects.len();

        for raw in &objects {
            let mut record = match validate(raw, sport, &source.url, today) {
                Ok(record) => record,
                Err(e) => {
                    debug!(url = %source.url, error = %e, "Rejected record");
                    report.rejected += 1;
                    continue;
                }
            };

            if let Some(bucket) = source.bucket {
                if !bucket.allows(record.level) {
                    debug!(
                        name = %record.name,
                        level = %record.level,
                        bucket = ?bucket,
                        "Outside source bucket, skipping"
                    );
                    report.filtered += 1;
                    continue;
                }
            }

            if self.fill_missing_summaries && record.summary.is_none() {
                record.summary = Some(self.backfill_summary(&record).await);
            }

            self.store.save(&record).await?;
            info!(tournament = %record, "Saved");
            report.saved += 1;
        }

        Ok(report)
    }

    async fn backfill_summary(&self, record: &Tournament) -> String {
        let text = format!(
            "{} ({} level {}) starting {} at {}",
            record.name,
            record.level,
            record.sport,
            record.start_date,
            record.location.as_deref().unwrap_or("unknown location"),
        );
        match self.extractor.summarize(&text).await {
            Ok(summary) if !summary.is_empty() => summary,
            Ok(_) => SUMMARY_FALLBACK.to_string(),
            Err(e) => {
                debug!(name = %record.name, error = %e, "Summary backfill failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
