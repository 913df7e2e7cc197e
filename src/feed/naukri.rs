//! Naukri search results via a plain HTTP fetch plus CSS-selector extraction.
//!
//! The page is parsed with `scraper`. Card layouts have changed over time, so
//! several card selectors are tried in order and the first one that matches
//! anything is used for the whole page.

use super::types::*;
use super::ListingFeed;
use crate::config::{PacingConfig, SourceConfig};
use crate::engine::pacing::Pacer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Compiled selectors for one page layout.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub cards: Vec<Selector>,
    pub title: Selector,
    pub age: Selector,
}

impl PageSelectors {
    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        let cards = source
            .card_selectors
            .iter()
            .map(String::as_str)
            .map(compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            cards,
            title: compile(&source.title_selector)?,
            age: compile(&source.age_selector)?,
        })
    }
}

fn compile(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| anyhow::anyhow!("invalid CSS selector {:?}: {:?}", raw, e))
}

/// Join an element's text nodes and collapse runs of whitespace.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a card href into an absolute http(s) URL.
fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = match Url::parse(href) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(href).ok()?,
        Err(_) => return None,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn extract_card(card: ElementRef<'_>, base: Option<&Url>, selectors: &PageSelectors) -> RawListing {
    let Some(anchor) = card.select(&selectors.title).next() else {
        return RawListing::malformed("missing title element");
    };

    let title = element_text(anchor);
    if title.is_empty() {
        return RawListing::malformed("empty title");
    }

    let Some(href) = anchor.value().attr("href") else {
        return RawListing::malformed(format!("no link on '{}'", title));
    };
    let Some(link) = resolve_link(href, base) else {
        return RawListing::malformed(format!("unusable link {:?} on '{}'", href, title));
    };

    // Prefer the dedicated age badge; otherwise scan the whole card like a reader would.
    let age_text = card
        .select(&selectors.age)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| Some(element_text(card)).filter(|t| !t.is_empty()));

    RawListing::Parsed(ListingRecord { title, link, age_text })
}

/// Parse a rendered search results page into raw listings.
/// Public for unit testing with fixtures and for the snapshot feed.
pub fn parse_listing_page(html: &str, page_url: &str, selectors: &PageSelectors) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    for card_selector in &selectors.cards {
        let cards: Vec<ElementRef<'_>> = document.select(card_selector).collect();
        if cards.is_empty() {
            continue;
        }
        return cards
            .into_iter()
            .map(|card| extract_card(card, base.as_ref(), selectors))
            .collect();
    }

    Vec::new()
}

// ── ListingFeed implementation ───────────────────────────────────────

pub struct NaukriFeed {
    client: Client,
    selectors: PageSelectors,
    pacer: Pacer,
}

impl NaukriFeed {
    pub fn new(source: &SourceConfig, pacing: &PacingConfig) -> Result<Self> {
        let user_agent = source
            .user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(source.timeout_ms))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("failed to build HTTP client")?;

        tracing::debug!(user_agent, "listing feed client ready");

        Ok(Self {
            client,
            selectors: PageSelectors::from_config(source)?,
            pacer: Pacer::new(pacing.fetch_min_ms, pacing.fetch_max_ms),
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await
            .context("listing page request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("listing page HTTP {} for {}", status, url);
        }

        resp.text().await.context("listing page read failed")
    }
}

#[async_trait]
impl ListingFeed for NaukriFeed {
    async fn fetch_listings(&mut self, query: &SearchQuery) -> Result<Vec<RawListing>> {
        let html = self.fetch_html(&query.url).await?;
        // Settle before touching the page again, like a person scrolling
        self.pacer.pause().await;

        let listings = parse_listing_page(&html, &query.url, &self.selectors);
        tracing::info!(count = listings.len(), bytes = html.len(), "listing page parsed");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.naukri.com/ai-engineer-jobs?k=ai";

    fn selectors() -> PageSelectors {
        PageSelectors::from_config(&SourceConfig::default()).unwrap()
    }

    fn fixture_html() -> &'static str {
        r#"<html><body>
            <div class="list">
              <div class="cust-job-tuple">
                <a class="title" href="https://www.naukri.com/job-listings-ai-engineer-acme-1">AI Engineer</a>
                <span class="comp-name">Acme</span>
                <span class="job-post-day">2 Days Ago</span>
              </div>
              <div class="cust-job-tuple">
                <a class="title" href="/job-listings-ml-engineer-globex-2">
                   Senior   ML Engineer
                </a>
                <span class="job-post-day">Just Now</span>
              </div>
              <div class="cust-job-tuple">
                <a class="title" href="https://www.naukri.com/job-listings-data-scientist-3">Data Scientist</a>
                <span class="comp-name">Initech</span>
                <span class="footer">Posted today</span>
              </div>
              <div class="cust-job-tuple">
                <span class="comp-name">No title here</span>
              </div>
            </div>
        </body></html>"#
    }

    #[test]
    fn test_parse_listing_page_count() {
        let listings = parse_listing_page(fixture_html(), PAGE_URL, &selectors());
        assert_eq!(listings.len(), 4);
    }

    #[test]
    fn test_parse_listing_page_absolute_link() {
        let listings = parse_listing_page(fixture_html(), PAGE_URL, &selectors());
        let RawListing::Parsed(first) = &listings[0] else { panic!("expected parsed") };
        assert_eq!(first.title, "AI Engineer");
        assert_eq!(first.link, "https://www.naukri.com/job-listings-ai-engineer-acme-1");
        assert_eq!(first.age_text.as_deref(), Some("2 Days Ago"));
    }

    #[test]
    fn test_parse_listing_page_relative_link_and_whitespace() {
        let listings = parse_listing_page(fixture_html(), PAGE_URL, &selectors());
        let RawListing::Parsed(second) = &listings[1] else { panic!("expected parsed") };
        assert_eq!(second.title, "Senior ML Engineer");
        assert_eq!(second.link, "https://www.naukri.com/job-listings-ml-engineer-globex-2");
    }

    #[test]
    fn test_age_falls_back_to_card_text() {
        let listings = parse_listing_page(fixture_html(), PAGE_URL, &selectors());
        let RawListing::Parsed(third) = &listings[2] else { panic!("expected parsed") };
        let age = third.age_text.as_deref().unwrap();
        assert!(age.contains("Posted today"));
        assert!(age.contains("Initech"));
    }

    #[test]
    fn test_card_without_title_is_malformed() {
        let listings = parse_listing_page(fixture_html(), PAGE_URL, &selectors());
        assert_eq!(listings[3], RawListing::malformed("missing title element"));
    }

    #[test]
    fn test_first_matching_card_selector_wins() {
        let html = r#"
            <article class="jobTuple"><a class="title" href="https://x/1">AI Engineer</a></article>
            <div class="cust-job-tuple"><a class="title" href="https://x/2">ML Engineer</a></div>
        "#;
        let listings = parse_listing_page(html, PAGE_URL, &selectors());
        assert_eq!(listings.len(), 1);
        let RawListing::Parsed(only) = &listings[0] else { panic!("expected parsed") };
        assert_eq!(only.link, "https://x/1");
    }

    #[test]
    fn test_no_cards_yields_empty() {
        let html = "<html><body><div class='captcha'>Are you a robot?</div></body></html>";
        assert!(parse_listing_page(html, PAGE_URL, &selectors()).is_empty());
    }

    #[test]
    fn test_missing_or_bad_href_is_malformed() {
        let html = r#"
            <div class="cust-job-tuple"><a class="title">AI Engineer</a></div>
            <div class="cust-job-tuple"><a class="title" href="javascript:void(0)">ML Engineer</a></div>
            <div class="cust-job-tuple"><a class="title" href="https://x/3">   </a></div>
        "#;
        let listings = parse_listing_page(html, PAGE_URL, &selectors());
        assert_eq!(listings.len(), 3);
        assert!(listings.iter().all(|l| matches!(l, RawListing::Malformed { .. })));
    }

    #[test]
    fn test_resolve_link() {
        let base = Url::parse(PAGE_URL).unwrap();
        assert_eq!(
            resolve_link("/job-1", Some(&base)).as_deref(),
            Some("https://www.naukri.com/job-1")
        );
        assert_eq!(resolve_link("/job-1", None), None);
        assert_eq!(resolve_link("mailto:hr@acme.test", Some(&base)), None);
        assert_eq!(resolve_link("", Some(&base)), None);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let source = SourceConfig {
            title_selector: "a[".to_string(),
            ..SourceConfig::default()
        };
        assert!(PageSelectors::from_config(&source).is_err());
    }

    /// Integration test: hits the real job board.
    /// Run with: cargo test naukri_live --ignored -- --nocapture
    #[tokio::test]
    #[ignore]
    async fn naukri_live_fetch() {
        let mut feed = NaukriFeed::new(&SourceConfig::default(), &PacingConfig::none()).unwrap();
        match feed.fetch_listings(&SearchQuery::new("https://www.naukri.com/ai-engineer-jobs")).await {
            Ok(listings) => {
                println!("Got {} cards", listings.len());
                for l in &listings {
                    println!("  {:?}", l);
                }
            }
            Err(e) => println!("fetch error: {:#}", e),
        }
    }
}
