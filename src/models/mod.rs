pub mod movie;
pub mod rating;
pub mod user;

pub use movie::{MovieRecord, Recommendation, RecommendationResult};
pub use rating::{MovieRating, Rating, UserRating, MAX_RATING, MIN_RATING};
pub use user::AuthenticatedUser;
