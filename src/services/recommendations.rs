use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    models::{Recommendation, RecommendationResult},
    services::{
        posters::{fetch_posters, PosterProvider},
        similarity::SimilarityTable,
        title_search::find_closest_title,
    },
};

/// Number of neighbours returned per query
pub const RECOMMENDATION_COUNT: usize = 5;

/// Indices of the `count` titles most similar to `index`.
///
/// Entries carrying the same title as `index` (the title itself and any
/// duplicate rows of it) are skipped. Scores are ordered descending; equal
/// scores keep catalogue order.
pub fn rank_neighbors(table: &SimilarityTable, index: usize, count: usize) -> Vec<usize> {
    let (Some(row), Some(matched_title)) = (table.row(index), table.title(index)) else {
        return Vec::new();
    };

    let mut candidates: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| table.title(*i) != Some(matched_title))
        .collect();

    candidates.sort_by(|(a_index, a_score), (b_index, b_score)| {
        match b_score.total_cmp(a_score) {
            Ordering::Equal => a_index.cmp(b_index),
            other => other,
        }
    });

    candidates.into_iter().take(count).map(|(i, _)| i).collect()
}

/// Fuzzy-matches `query` against the catalogue and returns the ranked neighbour titles.
///
/// An unmatched query yields an empty list.
pub fn recommend_titles(table: &SimilarityTable, query: &str) -> (Option<String>, Vec<String>) {
    let Some(index) = find_closest_title(query, table.titles()) else {
        return (None, Vec::new());
    };

    let matched = table.title(index).map(str::to_string);
    let titles = rank_neighbors(table, index, RECOMMENDATION_COUNT)
        .into_iter()
        .filter_map(|i| table.title(i).map(str::to_string))
        .collect();

    (matched, titles)
}

/// Recommendation lookup backed by the similarity table, enriched with posters
#[derive(Clone)]
pub struct Recommender {
    table: Arc<SimilarityTable>,
    posters: Arc<dyn PosterProvider>,
}

impl Recommender {
    pub fn new(table: Arc<SimilarityTable>, posters: Arc<dyn PosterProvider>) -> Self {
        Self { table, posters }
    }

    /// Recommends movies similar to the catalogue title closest to `query`
    pub async fn recommend(&self, query: &str) -> RecommendationResult {
        let (matched, titles) = recommend_titles(&self.table, query);

        let Some(matched) = matched else {
            tracing::info!(query = %query, "No catalogue title matched");
            return RecommendationResult {
                searched: query.to_string(),
                ..Default::default()
            };
        };

        let posters = fetch_posters(Arc::clone(&self.posters), &titles).await;
        let recommendations: Vec<Recommendation> = titles
            .into_iter()
            .zip(posters)
            .map(|(title, poster_url)| Recommendation { title, poster_url })
            .collect();

        tracing::info!(
            query = %query,
            matched = %matched,
            results = recommendations.len(),
            provider = self.posters.name(),
            "Recommendations computed"
        );

        RecommendationResult {
            searched: query.to_string(),
            matched: Some(matched),
            recommendations,
        }
    }
}
