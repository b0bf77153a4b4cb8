pub mod posters;
pub mod recommendations;
pub mod similarity;
pub mod title_search;

pub use posters::{OmdbPosterProvider, PlaceholderPosterProvider, PosterProvider};
pub use recommendations::Recommender;
pub use similarity::SimilarityTable;
