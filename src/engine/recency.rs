/// Text-marker recency check for free-form "posted ..." strings.
///
/// A listing is recent iff its age text contains one of the markers. Unknown
/// age (missing or blank text) counts as recent so nothing is missed.
/// "yesterday" and "1 day ago" count the same as "today"; markers are
/// literal substrings, not a time window.
#[derive(Debug, Clone)]
pub struct RecencyFilter {
    markers: Vec<String>,
}

impl RecencyFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().to_lowercase())
            .collect();
        Self { markers }
    }

    pub fn is_recent(&self, age_text: Option<&str>) -> bool {
        let Some(text) = age_text.map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let text = text.to_lowercase();
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }
}
