use serde::{Deserialize, Serialize};

/// One entry of the precomputed movie catalogue artifact.
/// Extra columns (genres, overview, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRecord {
    pub title: String,
}

/// A recommended movie enriched with its poster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: String,
}

/// Outcome of a recommendation query
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationResult {
    /// Free text the user searched for
    pub searched: String,
    /// Catalogue title the search was matched to, if any
    pub matched: Option<String>,
    pub recommendations: Vec<Recommendation>,
}
