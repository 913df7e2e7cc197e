/// Case-insensitive substring matcher over a fixed keyword list.
///
/// No tokenization, trimming or word boundaries: "gen ai" matches "Gen AI Lead"
/// and also "Regen AIrflow". Keywords are short phrases meant to match loosely.
/// Whitespace inside a keyword is part of the pattern.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();
        Self { keywords }
    }

    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }

    /// First keyword found in `title`, for logging.
    pub fn first_match(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_substring() {
        let m = KeywordMatcher::new(["ai engineer"]);
        assert!(m.matches("AI Engineer"));
        assert!(m.matches("Senior AI ENGINEER - Bangalore"));
        assert!(!m.matches("Backend Developer"));
    }

    #[test]
    fn test_keywords_lowercased() {
        let m = KeywordMatcher::new(["Gen AI"]);
        assert!(m.matches("gen ai architect"));
    }

    #[test]
    fn test_no_word_boundaries() {
        let m = KeywordMatcher::new(["gen ai"]);
        assert!(m.matches("Regen AIrflow Specialist"));
    }

    #[test]
    fn test_any_keyword_matches() {
        let m = KeywordMatcher::new(["data scientist", "ml engineer"]);
        assert!(m.matches("Lead ML Engineer"));
        assert!(m.matches("Data Scientist II"));
        assert!(!m.matches("Product Manager"));
    }

    #[test]
    fn test_padding_is_part_of_the_pattern() {
        let m = KeywordMatcher::new([" ai "]);
        assert!(!m.matches("Fair Pay Analyst"));
        assert!(m.matches("Senior AI Engineer"));
    }

    #[test]
    fn test_empty_keyword_matches_everything() {
        let m = KeywordMatcher::new([""]);
        assert!(!m.is_empty());
        assert!(m.matches("Backend Developer"));
    }

    #[test]
    fn test_no_keywords_match_nothing() {
        let m = KeywordMatcher::new(Vec::<String>::new());
        assert!(m.is_empty());
        assert!(!m.matches("AI Engineer"));
    }

    #[test]
    fn test_first_match_reports_config_order() {
        let m = KeywordMatcher::new(["machine learning", "ml engineer"]);
        assert_eq!(m.first_match("ML Engineer, Machine Learning Platform"), Some("machine learning"));
        assert_eq!(m.first_match("Designer"), None);
    }
}
