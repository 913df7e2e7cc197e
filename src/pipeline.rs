use crate::config::Config;
use crate::engine::{KeywordMatcher, Pacer, RecencyFilter};
use crate::feed::types::{ListingRecord, RawListing, SearchQuery};
use crate::feed::ListingFeed;
use crate::notify::{NotificationEvent, Notifier, NO_LISTINGS_WARNING};
use crate::store::SeenStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// How one listing was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Passed every filter; announce it.
    New(NotificationEvent),
    /// Link was announced on an earlier run (or earlier in this batch).
    Duplicate,
    KeywordMismatch,
    TooOld,
    /// The card could not be turned into a listing.
    Malformed(String),
}

/// Tally of one completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub fetched: usize,
    pub new: usize,
    pub duplicate: usize,
    pub keyword_mismatch: usize,
    pub too_old: usize,
    pub malformed: usize,
    pub send_failures: usize,
    pub events: Vec<NotificationEvent>,
}

impl RunSummary {
    fn new(fetched: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            fetched,
            new: 0,
            duplicate: 0,
            keyword_mismatch: 0,
            too_old: 0,
            malformed: 0,
            send_failures: 0,
            events: Vec::new(),
        }
    }

    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::New(event) => {
                self.new += 1;
                self.events.push(event.clone());
            }
            Verdict::Duplicate => self.duplicate += 1,
            Verdict::KeywordMismatch => self.keyword_mismatch += 1,
            Verdict::TooOld => self.too_old += 1,
            Verdict::Malformed(_) => self.malformed += 1,
        }
    }
}

/// Result of a run. A source that produced nothing is a failed run, not an empty one.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    SourceFailed { reason: String },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::SourceFailed { .. })
    }

    pub fn new_listings(&self) -> usize {
        match self {
            RunOutcome::Completed(summary) => summary.new,
            RunOutcome::SourceFailed { .. } => 0,
        }
    }
}

/// Fetch → classify → notify → persist, once per invocation.
pub struct Pipeline {
    query: SearchQuery,
    keywords: KeywordMatcher,
    /// `None` when recency filtering is switched off.
    recency: Option<RecencyFilter>,
    send_pacer: Pacer,
}

impl Pipeline {
    pub fn new(
        query: SearchQuery,
        keywords: KeywordMatcher,
        recency: Option<RecencyFilter>,
        send_pacer: Pacer,
    ) -> Self {
        Self { query, keywords, recency, send_pacer }
    }

    pub fn from_config(config: &Config) -> Self {
        let recency = config
            .recency
            .enabled
            .then(|| RecencyFilter::new(&config.recency.markers));
        Self::new(
            SearchQuery::new(config.search.url.clone()),
            KeywordMatcher::new(&config.search.keywords),
            recency,
            Pacer::new(config.pacing.send_min_ms, config.pacing.send_max_ms),
        )
    }

    /// Classify one listing against the already-announced set.
    pub fn classify(&self, listing: &RawListing, seen: &HashSet<String>) -> Verdict {
        let record: &ListingRecord = match listing {
            RawListing::Parsed(record) => record,
            RawListing::Malformed { reason } => return Verdict::Malformed(reason.clone()),
        };

        if seen.contains(&record.link) {
            return Verdict::Duplicate;
        }
        if !self.keywords.matches(&record.title) {
            return Verdict::KeywordMismatch;
        }
        if let Some(recency) = &self.recency {
            if !recency.is_recent(record.age_text.as_deref()) {
                return Verdict::TooOld;
            }
        }

        Verdict::New(NotificationEvent {
            title: record.title.clone(),
            link: record.link.clone(),
        })
    }

    /// Classify every listing in order, announcing new ones and adding them to `seen`.
    pub async fn process(
        &mut self,
        listings: &[RawListing],
        seen: &mut HashSet<String>,
        notifier: &dyn Notifier,
    ) -> RunSummary {
        self.process_since(Utc::now(), listings, seen, notifier).await
    }

    async fn process_since(
        &mut self,
        started_at: DateTime<Utc>,
        listings: &[RawListing],
        seen: &mut HashSet<String>,
        notifier: &dyn Notifier,
    ) -> RunSummary {
        let mut summary = RunSummary::new(listings.len(), started_at);

        for listing in listings {
            let verdict = self.classify(listing, seen);
            summary.record(&verdict);

            match &verdict {
                Verdict::New(event) => {
                    if let Err(e) = notifier.send(&event.message()).await {
                        summary.send_failures += 1;
                        tracing::warn!(link = %event.link, error = %e, "alert send failed, dropping");
                    } else {
                        tracing::info!(
                            title = %event.title,
                            keyword = self.keywords.first_match(&event.title).unwrap_or(""),
                            "alert sent"
                        );
                    }
                    // Marked seen even when delivery failed; sends are never retried
                    seen.insert(event.link.clone());
                    self.send_pacer.pause().await;
                }
                Verdict::Malformed(reason) => {
                    tracing::debug!(reason = %reason, "skipping malformed listing");
                }
                Verdict::Duplicate | Verdict::KeywordMismatch | Verdict::TooOld => {}
            }
        }

        summary
    }

    /// One full run. Only a store save failure is returned as `Err`.
    pub async fn run(
        &mut self,
        feed: &mut dyn ListingFeed,
        notifier: &dyn Notifier,
        store: &SeenStore,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let listings = match feed.fetch_listings(&self.query).await {
            Ok(listings) if !listings.is_empty() => listings,
            Ok(_) => return Ok(source_failed(notifier, "no listings on page".to_string()).await),
            Err(e) => return Ok(source_failed(notifier, format!("{:#}", e)).await),
        };
        tracing::info!(count = listings.len(), "listings fetched");

        let mut seen = store.load();
        let before = seen.len();

        let summary = self.process_since(started_at, &listings, &mut seen, notifier).await;

        store.save(&seen)?;
        tracing::info!(
            fetched = summary.fetched,
            new = summary.new,
            duplicate = summary.duplicate,
            keyword_mismatch = summary.keyword_mismatch,
            too_old = summary.too_old,
            malformed = summary.malformed,
            send_failures = summary.send_failures,
            seen_before = before,
            seen_after = seen.len(),
            started_at = %summary.started_at,
            "run complete"
        );

        Ok(RunOutcome::Completed(summary))
    }
}

async fn source_failed(notifier: &dyn Notifier, reason: String) -> RunOutcome {
    tracing::error!(reason = %reason, "listing source produced nothing");
    if let Err(e) = notifier.send(NO_LISTINGS_WARNING).await {
        tracing::warn!(error = %e, "warning send failed, dropping");
    }
    RunOutcome::SourceFailed { reason }
}
