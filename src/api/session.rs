//! Cookie-backed session and flash messages
//!
//! The logged-in user and any pending flash messages live in signed cookies,
//! so the server keeps no per-user state. Values are JSON, hex-encoded to stay
//! within the cookie value grammar.
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    SignedCookieJar,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::AuthenticatedUser;

const SESSION_COOKIE: &str = "session";
const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Error,
    Info,
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

fn encode<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_vec(value) {
        Ok(json) => Some(hex::encode(json)),
        Err(e) => {
            tracing::error!(error = %e, "Cookie serialization error");
            None
        }
    }
}

fn decode<T: DeserializeOwned>(value: &str) -> Option<T> {
    let bytes = hex::decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn build_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// The user stored in the session cookie, if the cookie is present and untampered
pub fn current_user(jar: &SignedCookieJar) -> Option<AuthenticatedUser> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
}

pub fn start_session(jar: SignedCookieJar, user: &AuthenticatedUser) -> SignedCookieJar {
    match encode(user) {
        Some(value) => jar.add(build_cookie(SESSION_COOKIE, value)),
        None => jar,
    }
}

/// Clears the session and any pending flash messages
pub fn end_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(removal_cookie(SESSION_COOKIE))
        .remove(removal_cookie(FLASH_COOKIE))
}

fn pending_flashes(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

pub fn push_flash(
    jar: SignedCookieJar,
    category: FlashCategory,
    message: impl Into<String>,
) -> SignedCookieJar {
    let mut flashes = pending_flashes(&jar);
    flashes.push(Flash {
        category,
        message: message.into(),
    });

    match encode(&flashes) {
        Some(value) => jar.add(build_cookie(FLASH_COOKIE, value)),
        None => jar,
    }
}

/// Removes and returns the pending flash messages
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let flashes = pending_flashes(&jar);
    if flashes.is_empty() {
        (jar, flashes)
    } else {
        (jar.remove(removal_cookie(FLASH_COOKIE)), flashes)
    }
}
