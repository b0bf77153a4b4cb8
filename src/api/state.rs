use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tera::Tera;

use crate::{
    api::templates, db::Database, error::AppResult, services::Recommender,
};

/// Shared application state
///
/// Everything here is read-only after startup; per-user data lives in the
/// database and in the signed session cookie.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub db: Database,
    pub recommender: Recommender,
    pub templates: Tera,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(db: Database, recommender: Recommender, secret_key: &str) -> AppResult<Self> {
        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                recommender,
                templates: templates::load()?,
                cookie_key: derive_cookie_key(secret_key),
            }),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}

/// Stretches an arbitrary secret into the 64 bytes cookie signing needs
fn derive_cookie_key(secret_key: &str) -> Key {
    Key::from(Sha512::digest(secret_key.as_bytes()).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_deterministic() {
        let a = derive_cookie_key("secret");
        let b = derive_cookie_key("secret");
        let c = derive_cookie_key("other");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
