//! Normalized listing types used by the pipeline (source-agnostic).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    /// Absolute detail URL. Doubles as the dedup key across runs.
    pub link: String,
    /// Free-text recency, e.g. "2 hours ago". `None` when the page had none.
    pub age_text: Option<String>,
}

impl ListingRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>, age_text: Option<&str>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            age_text: age_text.map(str::to_string),
        }
    }
}

/// Outcome of extracting one card from the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawListing {
    Parsed(ListingRecord),
    Malformed { reason: String },
}

impl RawListing {
    pub fn malformed(reason: impl Into<String>) -> Self {
        RawListing::Malformed { reason: reason.into() }
    }
}

impl From<ListingRecord> for RawListing {
    fn from(record: ListingRecord) -> Self {
        RawListing::Parsed(record)
    }
}

/// What to search for. Keyword filtering happens later and is separate from this.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub url: String,
}

impl SearchQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
