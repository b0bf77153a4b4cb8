use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tera::Context;

use super::{
    auth::AuthUser,
    session::{self, FlashCategory},
    templates, AppState,
};
use crate::{error::AppResult, middleware::RequestId};

// Request types

#[derive(Debug, Deserialize)]
pub struct RecommendForm {
    #[serde(default)]
    pub movie: String,
}

#[derive(Debug, Deserialize)]
pub struct RateMovieForm {
    #[serde(default)]
    pub movie_title: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Renders a template, consuming any pending flash messages
pub(super) fn render_page(
    state: &AppState,
    jar: SignedCookieJar,
    template: &str,
    mut context: Context,
) -> AppResult<Response> {
    let (jar, flashes) = session::take_flashes(jar);
    context.insert("flashes", &flashes);

    let page = templates::render(&state.inner.templates, template, &context)?;
    Ok((jar, page).into_response())
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn home(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut context = Context::new();
    context.insert("username", &user.username);
    render_page(&state, jar, "index.html", context)
}

/// Recommends movies similar to the submitted title
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
    jar: SignedCookieJar,
    Form(form): Form<RecommendForm>,
) -> AppResult<Response> {
    tracing::info!(
        request_id = %request_id,
        user_id = user.user_id,
        movie = %form.movie,
        "Processing recommendation request"
    );

    let result = state.inner.recommender.recommend(&form.movie).await;

    let mut context = Context::new();
    context.insert("username", &user.username);
    context.insert("searched_movie", &result.searched);
    if let Some(matched) = &result.matched {
        context.insert("matched_movie", matched);
    }
    context.insert("recommendations", &result.recommendations);

    render_page(&state, jar, "index.html", context)
}

/// Stores the user's rating for a movie and returns to the home page
pub async fn rate_movie(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: SignedCookieJar,
    Form(form): Form<RateMovieForm>,
) -> (SignedCookieJar, Redirect) {
    let stored = match form.rating.trim().parse::<i64>() {
        Ok(rating) => state
            .inner
            .db
            .add_rating(
                user.user_id,
                &form.movie_title,
                rating,
                form.description.as_deref(),
            )
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(format!("Invalid rating {:?}: {}", form.rating, e)),
    };

    let jar = match stored {
        Ok(()) => session::push_flash(jar, FlashCategory::Success, "Rating added successfully!"),
        Err(reason) => {
            tracing::warn!(
                user_id = user.user_id,
                movie_title = %form.movie_title,
                reason = %reason,
                "Rating rejected"
            );
            session::push_flash(jar, FlashCategory::Error, "Failed to add rating")
        }
    };

    (jar, Redirect::to("/"))
}

/// Lists every rating submitted for one movie
pub async fn movie_ratings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: SignedCookieJar,
    Path(movie_title): Path<String>,
) -> AppResult<Response> {
    let ratings = state.inner.db.get_movie_ratings(&movie_title).await?;
    let own_rating = state.inner.db.get_rating(user.user_id, &movie_title).await?;

    let mut context = Context::new();
    context.insert("username", &user.username);
    context.insert("movie_title", &movie_title);
    if let Some(own) = &own_rating {
        context.insert("your_rating", own);
    }
    if !ratings.is_empty() {
        let total: i64 = ratings.iter().map(|r| r.rating).sum();
        context.insert("average_rating", &(total as f64 / ratings.len() as f64));
    }
    context.insert("ratings", &ratings);

    render_page(&state, jar, "movie_ratings.html", context)
}

/// Lists the logged-in user's own ratings
pub async fn my_ratings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let ratings = state.inner.db.get_user_ratings(user.user_id).await?;

    let mut context = Context::new();
    context.insert("username", &user.username);
    context.insert("ratings", &ratings);

    render_page(&state, jar, "my_ratings.html", context)
}
