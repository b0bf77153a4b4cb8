use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::{cookie::Key, SignedCookieJar};
use serde::Deserialize;
use tera::Context;

use super::{
    handlers::render_page,
    session::{self, FlashCategory},
    AppState,
};
use crate::{
    error::{AppError, AppResult},
    middleware::record_user_id,
    models::AuthenticatedUser,
};

/// Extractor for routes that require a logged-in user.
///
/// Anonymous requests are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        let user = session::current_user(&jar).ok_or_else(|| Redirect::to("/login"))?;
        record_user_id(user.user_id);
        Ok(AuthUser(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    render_page(&state, jar, "login.html", Context::new())
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = state
        .inner
        .db
        .authenticate_user(form.username.trim(), &form.password)
        .await?;

    match user {
        Some(user) => {
            record_user_id(user.user_id);
            tracing::info!(user_id = user.user_id, username = %user.username, "User logged in");
            let jar = session::start_session(jar, &user);
            let jar = session::push_flash(jar, FlashCategory::Success, "Login successful!");
            Ok((jar, Redirect::to("/")).into_response())
        }
        None => {
            tracing::info!(username = %form.username, "Login failed");
            let jar = session::push_flash(jar, FlashCategory::Error, "Invalid username or password");
            render_page(&state, jar, "login.html", Context::new())
        }
    }
}

pub async fn signup_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    render_page(&state, jar, "signup.html", Context::new())
}

pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        let jar = session::push_flash(jar, FlashCategory::Error, "All fields are required");
        return render_page(&state, jar, "signup.html", Context::new());
    }

    if form.password != form.confirm_password {
        let jar = session::push_flash(jar, FlashCategory::Error, "Passwords do not match");
        return render_page(&state, jar, "signup.html", Context::new());
    }

    match state.inner.db.create_user(username, email, &form.password).await {
        Ok(_) => {
            let jar = session::push_flash(
                jar,
                FlashCategory::Success,
                "Account created successfully! Please login.",
            );
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(AppError::Conflict(_)) => {
            let jar =
                session::push_flash(jar, FlashCategory::Error, "Username or email already exists");
            render_page(&state, jar, "signup.html", Context::new())
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    let jar = session::end_session(jar);
    let jar = session::push_flash(jar, FlashCategory::Info, "You have been logged out");
    (jar, Redirect::to("/login"))
}
