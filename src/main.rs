use std::sync::Arc;

use movie_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::Database,
    services::{
        OmdbPosterProvider, PlaceholderPosterProvider, PosterProvider, Recommender,
        SimilarityTable,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY not set, signing cookies with the development key");
    }

    let db = Database::connect(&config.database_path).await?;

    let table = SimilarityTable::load_or_fallback(&config.movies_path, &config.similarity_path);

    let posters: Arc<dyn PosterProvider> = match &config.omdb_api_key {
        Some(api_key) => Arc::new(OmdbPosterProvider::new(
            api_key.clone(),
            config.omdb_api_url.clone(),
        )?),
        None => {
            tracing::warn!("OMDB_API_KEY not set, posters will use a placeholder image");
            Arc::new(PlaceholderPosterProvider)
        }
    };

    let recommender = Recommender::new(Arc::new(table), posters);
    let state = AppState::new(db, recommender, &config.secret_key)?;
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
