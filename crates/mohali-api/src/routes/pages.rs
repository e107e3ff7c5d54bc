//! Embedded site pages

use axum::{
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

use crate::error::ApiError;

/// Embedded static pages
#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../static"]
struct Assets;

/// Asset-relative name for a request path, if the path is canonical
///
/// Only the single leading `/` and one trailing `/` are dropped. Empty, `.`
/// and `..` segments are refused so that a page is reachable only through
/// the exact path the gatekeeper classified.
fn canonical_name(path: &str) -> Option<&str> {
    if path.starts_with("//") {
        return None;
    }
    let rest = path.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Some(rest);
    }
    if rest
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return None;
    }
    Some(rest)
}

/// Candidate asset names for a canonical name, most specific first
fn candidates(name: &str) -> Vec<String> {
    if name.is_empty() {
        return vec!["index.html".to_string()];
    }
    vec![
        name.to_string(),
        format!("{}.html", name),
        format!("{}/index.html", name),
    ]
}

/// Handler for serving embedded pages
///
/// `/tattoo/booking` resolves to `tattoo/booking.html`; unknown API paths get
/// a JSON 404 and everything else the site's 404 page.
pub async fn serve_page(uri: Uri) -> Response {
    let path = uri.path();

    if let Some(canonical) = canonical_name(path) {
        for name in candidates(canonical) {
            if let Some(content) = <Assets as Embed>::get(&name) {
                let mime = mime_guess::from_path(&name).first_or_octet_stream();
                return (
                    [(header::CONTENT_TYPE, mime.as_ref())],
                    content.data.into_owned(),
                )
                    .into_response();
            }
        }
    }

    if path.starts_with("/api/") {
        return ApiError::NotFound("Not found".to_string()).into_response();
    }

    match <Assets as Embed>::get("404.html") {
        Some(content) => (StatusCode::NOT_FOUND, Html(content.data.into_owned())).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
