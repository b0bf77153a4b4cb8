use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Catalogue used when no precomputed artifact is available
pub const FALLBACK_TITLES: [&str; 30] = [
    "The Dark Knight",
    "Inception",
    "Interstellar",
    "The Matrix",
    "Pulp Fiction",
    "The Shawshank Redemption",
    "Forrest Gump",
    "The Godfather",
    "Fight Club",
    "Goodfellas",
    "The Lord of the Rings",
    "Star Wars",
    "Avatar",
    "Titanic",
    "Gladiator",
    "The Avengers",
    "Spider-Man",
    "Iron Man",
    "Black Panther",
    "Thor",
    "Joker",
    "Parasite",
    "The Social Network",
    "The Grand Budapest Hotel",
    "Whiplash",
    "Mad Max: Fury Road",
    "The Revenant",
    "Django Unchained",
    "The Wolf of Wall Street",
    "Interstellar",
];

/// Genres assigned round-robin to the fallback titles
const FALLBACK_GENRES: [&str; 5] = ["Action", "Sci-Fi", "Sci-Fi", "Sci-Fi", "Crime"];

/// Movie titles paired with a square matrix of pairwise similarity scores.
///
/// Row and column `i` both refer to `titles[i]`. The table is immutable once built.
#[derive(Debug, Clone)]
pub struct SimilarityTable {
    titles: Vec<String>,
    scores: Vec<Vec<f32>>,
}

impl SimilarityTable {
    /// Builds a table, rejecting matrices whose shape does not match the titles
    pub fn new(titles: Vec<String>, scores: Vec<Vec<f32>>) -> AppResult<Self> {
        if scores.len() != titles.len() {
            return Err(AppError::Artifact(format!(
                "similarity matrix has {} rows but there are {} titles",
                scores.len(),
                titles.len()
            )));
        }

        if let Some((index, row)) = scores
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != titles.len())
        {
            return Err(AppError::Artifact(format!(
                "similarity row {} has {} columns, expected {}",
                index,
                row.len(),
                titles.len()
            )));
        }

        Ok(Self { titles, scores })
    }

    /// Loads the precomputed catalogue and matrix from JSON artifacts
    pub fn load(movies_path: impl AsRef<Path>, similarity_path: impl AsRef<Path>) -> AppResult<Self> {
        let records: Vec<MovieRecord> = read_json(movies_path.as_ref())?;
        let scores: Vec<Vec<f32>> = read_json(similarity_path.as_ref())?;

        let titles = records.into_iter().map(|record| record.title).collect();
        Self::new(titles, scores)
    }

    /// Loads the artifacts, or builds the fallback table when they are missing or unusable
    pub fn load_or_fallback(
        movies_path: impl AsRef<Path>,
        similarity_path: impl AsRef<Path>,
    ) -> Self {
        let movies_path = movies_path.as_ref();
        let similarity_path = similarity_path.as_ref();

        if !movies_path.exists() || !similarity_path.exists() {
            tracing::warn!(
                movies = %movies_path.display(),
                similarity = %similarity_path.display(),
                "Model files not found, using fallback dataset"
            );
            return Self::fallback();
        }

        match Self::load(movies_path, similarity_path) {
            Ok(table) => {
                tracing::info!(movies = table.len(), "Model files loaded");
                table
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load model files, using fallback dataset");
                Self::fallback()
            }
        }
    }

    /// Builds the small built-in table from TF-IDF vectors of "title genre"
    pub fn fallback() -> Self {
        let titles: Vec<String> = FALLBACK_TITLES.iter().map(|t| t.to_string()).collect();
        let documents: Vec<String> = titles
            .iter()
            .zip(FALLBACK_GENRES.iter().cycle())
            .map(|(title, genre)| format!("{} {}", title, genre))
            .collect();

        let scores = tfidf_cosine_similarity(&documents);
        tracing::info!(movies = titles.len(), "Fallback dataset created");

        Self { titles, scores }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn title(&self, index: usize) -> Option<&str> {
        self.titles.get(index).map(String::as_str)
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.scores.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Artifact(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::Artifact(format!("{}: {}", path.display(), e)))
}

/// Lowercased runs of at least two word characters
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Pairwise cosine similarity of L2-normalised TF-IDF vectors.
///
/// Term frequency is the raw count and idf is smoothed: `ln((1 + n) / (1 + df)) + 1`.
pub(crate) fn tfidf_cosine_similarity(documents: &[String]) -> Vec<Vec<f32>> {
    let tokenized: Vec<Vec<String>> = documents.iter().map(|doc| tokenize(doc)).collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let n = documents.len() as f64;
    let vectors: Vec<HashMap<&str, f64>> = tokenized
        .iter()
        .map(|tokens| {
            let mut weights: HashMap<&str, f64> = HashMap::new();
            for term in tokens {
                *weights.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
            for (term, weight) in weights.iter_mut() {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                *weight *= ((1.0 + n) / (1.0 + df)).ln() + 1.0;
            }
            let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                weights.values_mut().for_each(|w| *w /= norm);
            }
            weights
        })
        .collect();

    vectors
        .iter()
        .map(|left| {
            vectors
                .iter()
                .map(|right| {
                    left.iter()
                        .filter_map(|(term, w)| right.get(term).map(|other| w * other))
                        .sum::<f64>() as f32
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_new_rejects_row_count_mismatch() {
        let titles = vec!["A".to_string(), "B".to_string()];
        let result = SimilarityTable::new(titles, vec![vec![1.0, 0.5]]);
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let titles = vec!["A".to_string(), "B".to_string()];
        let result = SimilarityTable::new(titles, vec![vec![1.0, 0.5], vec![0.5]]);
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Mad Max: Fury Road Sci-Fi"),
            vec!["mad", "max", "fury", "road", "sci", "fi"]
        );
        assert_eq!(tokenize("Thor a I"), vec!["thor"]);
    }

    #[test]
    fn test_fallback_is_square_symmetric_with_unit_diagonal() {
        let table = SimilarityTable::fallback();
        assert_eq!(table.len(), FALLBACK_TITLES.len());

        for i in 0..table.len() {
            let row = table.row(i).unwrap();
            assert_eq!(row.len(), table.len());
            assert!((row[i] - 1.0).abs() < 1e-5, "diagonal {} was {}", i, row[i]);
            for (j, score) in row.iter().enumerate() {
                let mirrored = table.row(j).unwrap()[i];
                assert!((score - mirrored).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_fallback_shared_terms_score_higher() {
        let table = SimilarityTable::fallback();
        // "The Matrix Sci-Fi" shares "the" with "The Avengers Action",
        // nothing with "Joker Action"
        let matrix = table.row(3).unwrap();
        assert!(matrix[15] > 0.0);
        assert_eq!(matrix[20], 0.0);
    }

    #[test]
    fn test_load_from_json_artifacts() {
        let movies = write_temp(r#"[{"title": "Alpha", "genres": "x"}, {"title": "Beta"}]"#);
        let similarity = write_temp("[[1.0, 0.25], [0.25, 1.0]]");

        let table = SimilarityTable::load(movies.path(), similarity.path()).unwrap();
        assert_eq!(table.titles(), &["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(table.row(1), Some(&[0.25, 1.0][..]));
    }

    #[test]
    fn test_load_rejects_mismatched_artifacts() {
        let movies = write_temp(r#"[{"title": "Alpha"}]"#);
        let similarity = write_temp("[[1.0, 0.25], [0.25, 1.0]]");

        let result = SimilarityTable::load(movies.path(), similarity.path());
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_load_or_fallback_when_missing() {
        let table = SimilarityTable::load_or_fallback("/nonexistent/movies.json", "/nonexistent/sim.json");
        assert_eq!(table.len(), FALLBACK_TITLES.len());
    }

    #[test]
    fn test_load_or_fallback_when_malformed() {
        let movies = write_temp("not json");
        let similarity = write_temp("[]");

        let table = SimilarityTable::load_or_fallback(movies.path(), similarity.path());
        assert_eq!(table.title(0), Some("The Dark Knight"));
    }
}
