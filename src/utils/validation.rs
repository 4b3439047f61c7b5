//! URL sanity checks
//!
//! Extraction never rejects a URL up front; these helpers only feed log
//! messages and CLI hints.

use url::Url;

/// Whether `url` is an absolute http(s) URL
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Whether `url` looks like it points at an HLS playlist
pub fn looks_like_playlist_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_ascii_lowercase();
            path.ends_with(".m3u8") || path.ends_with(".m3u") || path.contains("/hls/")
        }
        Err(_) => url.to_ascii_lowercase().contains(".m3u8"),
    }
}
