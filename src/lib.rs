//! HLS Quality Probe - Core Library
//!
//! Works out which video resolutions an HLS playlist offers so a UI can
//! present a quality picker. Multivariant playlists are read directly; for
//! single-rendition playlists the resolution is inferred from the URL.

pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    config::{AppConfig, ProbeConfig},
    error_handling::{ErrorKind, ExtractionError, ExtractionResult},
    extractor::ResolutionExtractor,
    fetcher::{HttpPlaylistSource, PlaylistSource},
    models::{PlaylistKind, ResolutionCandidate, ResolutionList, ResolutionSource, VariantInfo},
    runtime::{spawn_extraction_runtime, ExtractionRuntimeHandle},
};
pub use parsers::url_patterns::{infer_from_url, UrlMatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with default settings
pub fn init() {
    utils::logging::init_tracing();
    tracing::debug!("{} v{} initialized", NAME, VERSION);
}

/// Convenience entry point: build an extractor from `config` and resolve `url`
pub async fn extract_resolutions(
    config: &ProbeConfig,
    url: &str,
) -> ExtractionResult<ResolutionList> {
    ResolutionExtractor::new(config)?
        .extract_resolutions(url)
        .await
}
