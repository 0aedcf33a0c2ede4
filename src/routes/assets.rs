//! Stylesheets and other static files, compiled into the binary.

use axum::extract::Path;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

const CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Embed)]
#[folder = "assets/"]
struct BlogAssets;

/// Strong validator for an embedded file: its content hash, quoted.
fn etag_for(file: &rust_embed::EmbeddedFile) -> String {
    format!("\"{}\"", hex::encode(file.metadata.sha256_hash()))
}

/// True when any entry of `If-None-Match` names `etag` (or is `*`).
fn matches_if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// GET /assets/{*path}
pub async fn serve(Path(path): Path<String>, headers: HeaderMap) -> Response {
    let Some(file) = BlogAssets::get(&path) else {
        tracing::debug!(path = %path, "Unknown asset");
        return StatusCode::NOT_FOUND.into_response();
    };

    let etag = etag_for(&file);
    let Ok(etag_value) = HeaderValue::from_str(&etag) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    if matches_if_none_match(&headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag_value),
                (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
            ],
        )
            .into_response();
    }

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
            (header::ETAG, etag),
        ],
        file.data.into_owned(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn stylesheet_is_embedded_with_a_content_hash() {
        let file = BlogAssets::get("css/main.css").unwrap();
        let etag = etag_for(&file);
        assert_eq!(etag.len(), 66);
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(BlogAssets::get("css/missing.css").is_none());
    }

    #[test]
    fn if_none_match_accepts_lists_weak_tags_and_star() {
        let etag = "\"abc\"";
        assert!(matches_if_none_match(&headers_with("\"abc\""), etag));
        assert!(matches_if_none_match(&headers_with("\"x\", \"abc\""), etag));
        assert!(matches_if_none_match(&headers_with("W/\"abc\""), etag));
        assert!(matches_if_none_match(&headers_with("*"), etag));
        assert!(!matches_if_none_match(&headers_with("\"abd\""), etag));
        assert!(!matches_if_none_match(&HeaderMap::new(), etag));
    }
}
