pub mod sqlite;

pub use sqlite::{hash_password, Database};
