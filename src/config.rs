use serde::Deserialize;

/// Development-only signing key, used when `SECRET_KEY` is not set
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-this-in-production";

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Precomputed movie catalogue (JSON records with a `title` field)
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Precomputed similarity matrix (JSON array of rows)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// OMDb API key; posters fall back to a placeholder when absent
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Secret used to sign session and flash cookies
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_path() -> String {
    "movie_recommend.db".to_string()
}

fn default_movies_path() -> String {
    "models/movies.json".to_string()
}

fn default_similarity_path() -> String {
    "models/similarity.json".to_string()
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Whether the signing key is still the built-in development value
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
