use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppResult;

/// Builds the template set from the files embedded at compile time
pub fn load() -> AppResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("index.html", include_str!("../../templates/index.html")),
        ("login.html", include_str!("../../templates/login.html")),
        ("signup.html", include_str!("../../templates/signup.html")),
        ("movie_ratings.html", include_str!("../../templates/movie_ratings.html")),
        ("my_ratings.html", include_str!("../../templates/my_ratings.html")),
    ])?;
    Ok(tera)
}

pub fn render(tera: &Tera, name: &str, context: &Context) -> AppResult<Html<String>> {
    Ok(Html(tera.render(name, context)?))
}
