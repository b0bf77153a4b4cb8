//! Poster lookup
//!
//! A [`PosterProvider`] resolves a movie title to a poster image URL. Lookups
//! are best effort: any failure is logged and replaced by
//! [`PLACEHOLDER_POSTER_URL`] so a recommendation never fails because of posters.
use std::sync::Arc;

use crate::error::AppResult;

pub mod omdb;

pub use omdb::OmdbPosterProvider;

/// Image shown when no poster is available
pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/300x450?text=No+Image";

/// Trait for poster image sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Looks up the poster URL for a title; `Ok(None)` when the source has none
    async fn fetch_poster(&self, title: &str) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Provider used when no metadata API is configured
#[derive(Debug, Clone, Default)]
pub struct PlaceholderPosterProvider;

#[async_trait::async_trait]
impl PosterProvider for PlaceholderPosterProvider {
    async fn fetch_poster(&self, _title: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

/// Resolves a poster, substituting the placeholder for missing posters and errors
pub async fn poster_or_placeholder(provider: &dyn PosterProvider, title: &str) -> String {
    match provider.fetch_poster(title).await {
        Ok(Some(url)) => url,
        Ok(None) => PLACEHOLDER_POSTER_URL.to_string(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                title = %title,
                provider = provider.name(),
                "Poster lookup failed"
            );
            PLACEHOLDER_POSTER_URL.to_string()
        }
    }
}

/// Fetches posters for several titles in parallel, preserving input order
pub async fn fetch_posters(provider: Arc<dyn PosterProvider>, titles: &[String]) -> Vec<String> {
    let mut tasks = Vec::with_capacity(titles.len());

    for title in titles {
        let provider = Arc::clone(&provider);
        let title = title.clone();
        let task =
            tokio::spawn(async move { poster_or_placeholder(provider.as_ref(), &title).await });
        tasks.push(task);
    }

    let mut posters = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(url) => posters.push(url),
            Err(e) => {
                tracing::error!(error = %e, "Poster task join error");
                posters.push(PLACEHOLDER_POSTER_URL.to_string());
            }
        }
    }

    posters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_placeholder_provider_never_has_posters() {
        let provider = PlaceholderPosterProvider;
        assert_eq!(provider.fetch_poster("Inception").await.unwrap(), None);
        assert_eq!(
            poster_or_placeholder(&provider, "Inception").await,
            PLACEHOLDER_POSTER_URL
        );
    }

    #[tokio::test]
    async fn test_errors_become_placeholder() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|_| Err(AppError::ExternalApi("quota exceeded".to_string())));
        provider.expect_name().return_const("mock");

        assert_eq!(
            poster_or_placeholder(&provider, "Inception").await,
            PLACEHOLDER_POSTER_URL
        );
    }

    #[tokio::test]
    async fn test_fetch_posters_keeps_order() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|title| match title {
                "Thor" => Ok(None),
                other => Ok(Some(format!("https://img.example/{}.jpg", other))),
            });
        provider.expect_name().return_const("mock");

        let titles = vec!["Avatar".to_string(), "Thor".to_string(), "Joker".to_string()];
        let posters = fetch_posters(Arc::new(provider), &titles).await;

        assert_eq!(
            posters,
            vec![
                "https://img.example/Avatar.jpg".to_string(),
                PLACEHOLDER_POSTER_URL.to_string(),
                "https://img.example/Joker.jpg".to_string(),
            ]
        );
    }
}
