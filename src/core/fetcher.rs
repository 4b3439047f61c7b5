//! Playlist retrieval
//!
//! [`PlaylistSource`] is the seam between extraction logic and the network.
//! The production implementation is a thin `reqwest` client; tests plug in
//! canned bodies instead.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

use super::config::ProbeConfig;
use super::error_handling::{ExtractionError, ExtractionResult};

/// Something that can return the raw body of a playlist URL
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn fetch(&self, url: &str) -> ExtractionResult<Bytes>;
}

/// HTTP playlist fetcher
pub struct HttpPlaylistSource {
    client: Client,
    max_playlist_bytes: u64,
}

impl HttpPlaylistSource {
    pub fn new(config: &ProbeConfig) -> ExtractionResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(build_headers(config)?);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ExtractionError::Config(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        } else if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| ExtractionError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_playlist_bytes: config.max_playlist_bytes,
        })
    }

    fn too_large(&self, url: &str) -> ExtractionError {
        ExtractionError::fetch(
            url,
            format!("playlist exceeds {} bytes", self.max_playlist_bytes),
        )
    }
}

fn build_headers(config: &ProbeConfig) -> ExtractionResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ExtractionError::Config(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ExtractionError::Config(format!("invalid header value: {}", e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl PlaylistSource for HttpPlaylistSource {
    async fn fetch(&self, url: &str) -> ExtractionResult<Bytes> {
        tracing::debug!("Fetching playlist: {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::fetch(url, format!("HTTP {}", status)));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_playlist_bytes)
        {
            return Err(self.too_large(url));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| request_error(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_playlist_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.freeze())
    }
}

/// Attribute a client error to the requested URL
fn request_error(url: &str, err: reqwest::Error) -> ExtractionError {
    match ExtractionError::from(err) {
        ExtractionError::Fetch { message, .. } => ExtractionError::fetch(url, message),
        other => other,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::ErrorKind;

    fn local_config() -> ProbeConfig {
        ProbeConfig {
            use_system_proxy: false,
            ..ProbeConfig::default()
        }
    }

    const MEDIA: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.0,\nseg0.ts\n#EXT-X-ENDLIST\n";

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = test_server::serve("200 OK", MEDIA).await;
        let source = HttpPlaylistSource::new(&local_config()).unwrap();

        let body = source.fetch(&format!("{}/index.m3u8", base)).await.unwrap();
        assert_eq!(&body[..], MEDIA.as_bytes());
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let base = test_server::serve("404 Not Found", "missing").await;
        let source = HttpPlaylistSource::new(&local_config()).unwrap();

        let err = source.fetch(&format!("{}/gone.m3u8", base)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let base = test_server::serve("200 OK", MEDIA).await;
        let config = ProbeConfig {
            max_playlist_bytes: 8,
            ..local_config()
        };
        let source = HttpPlaylistSource::new(&config).unwrap();

        let err = source.fetch(&format!("{}/big.m3u8", base)).await.unwrap_err();
        assert!(err.to_string().contains("exceeds 8 bytes"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let url = test_server::unreachable_url().await;
        let source = HttpPlaylistSource::new(&local_config()).unwrap();

        let err = source.fetch(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut config = ProbeConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());

        let err = HttpPlaylistSource::new(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
