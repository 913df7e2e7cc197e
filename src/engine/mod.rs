pub mod keywords;
pub mod pacing;
pub mod recency;

pub use keywords::KeywordMatcher;
pub use pacing::Pacer;
pub use recency::RecencyFilter;
