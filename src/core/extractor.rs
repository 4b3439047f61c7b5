//! HLS resolution extraction
//!
//! Fetches a playlist and works out which qualities it offers:
//! - multivariant playlists: one label per distinct variant resolution
//! - media playlists: a label inferred from the URL, or the configured placeholder
//!
//! Every failure is terminal for the call; nothing is retried here.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::ProbeConfig;
use super::error_handling::{ExtractionError, ExtractionResult};
use super::fetcher::{HttpPlaylistSource, PlaylistSource};
use super::models::{PlaylistKind, ResolutionList, ResolutionSource, VariantInfo};
use crate::parsers::m3u8_parser::{parse_playlist_body, ParsedPlaylist};
use crate::parsers::url_patterns::infer_from_url;
use crate::utils::validation::looks_like_playlist_url;

/// Resolves the available qualities of an HLS playlist URL
#[derive(Clone)]
pub struct ResolutionExtractor {
    source: Arc<dyn PlaylistSource>,
    default_label: String,
}

impl ResolutionExtractor {
    /// Create an extractor backed by an HTTP client built from `config`
    pub fn new(config: &ProbeConfig) -> ExtractionResult<Self> {
        let source = HttpPlaylistSource::new(config)?;
        Ok(Self::with_source(Arc::new(source), config.default_label.clone()))
    }

    pub fn with_source(source: Arc<dyn PlaylistSource>, default_label: impl Into<String>) -> Self {
        Self {
            source,
            default_label: default_label.into(),
        }
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    /// Distinct resolution labels offered by the playlist at `url`
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn extract_resolutions(&self, url: &str) -> ExtractionResult<ResolutionList> {
        let result = self.resolve(url).await;
        match &result {
            Ok(list) => info!(
                "Resolved {} quality label(s) via {:?}: {:?}",
                list.len(),
                list.source,
                list.labels
            ),
            Err(e) => warn!("Resolution extraction failed: {}", e),
        }
        result
    }

    /// Usable variants of a multivariant playlist, one per distinct label
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn extract_variants(&self, url: &str) -> ExtractionResult<Vec<VariantInfo>> {
        match self.load(url).await? {
            ParsedPlaylist::Multivariant { variants, listed } => {
                if variants.is_empty() {
                    return Err(ExtractionError::NoUsableVariant {
                        variant_count: listed,
                    });
                }
                Ok(variants)
            }
            ParsedPlaylist::Media { .. } => {
                debug!("Media playlist has no variants to list");
                Err(ExtractionError::NoUsableVariant { variant_count: 0 })
            }
        }
    }

    async fn resolve(&self, url: &str) -> ExtractionResult<ResolutionList> {
        let (labels, source, kind) = match self.load(url).await? {
            ParsedPlaylist::Multivariant { variants, listed } => {
                if variants.is_empty() {
                    return Err(ExtractionError::NoUsableVariant {
                        variant_count: listed,
                    });
                }
                let labels = variants.into_iter().map(|v| v.label).collect();
                (labels, ResolutionSource::Variants, PlaylistKind::Multivariant)
            }
            ParsedPlaylist::Media { .. } => match infer_from_url(url) {
                Some(found) => {
                    debug!("URL rule #{} ({}) matched", found.rule, found.name);
                    (
                        vec![found.label],
                        ResolutionSource::UrlPattern,
                        PlaylistKind::Media,
                    )
                }
                None => {
                    debug!("No URL rule matched, using default label");
                    (
                        vec![self.default_label.clone()],
                        ResolutionSource::Default,
                        PlaylistKind::Media,
                    )
                }
            },
        };

        Ok(ResolutionList {
            url: url.to_string(),
            labels,
            source,
            kind,
            fetched_at: Utc::now(),
        })
    }

    async fn load(&self, url: &str) -> ExtractionResult<ParsedPlaylist> {
        if !looks_like_playlist_url(url) {
            debug!("URL does not look like an HLS playlist, probing anyway");
        }
        let body = self.source.fetch(url).await?;
        parse_playlist_body(&body, url)
    }
}
