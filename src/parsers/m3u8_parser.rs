//! M3U8 playlist parsing utilities

use m3u8_rs::{MasterPlaylist, MediaPlaylist, Playlist, VariantStream};
use std::collections::HashSet;
use url::Url;

use crate::core::error_handling::{ExtractionError, ExtractionResult};
use crate::core::models::{ResolutionCandidate, VariantInfo};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Structure of a fetched playlist body
#[derive(Debug, Clone)]
pub enum ParsedPlaylist {
    Multivariant {
        /// Usable variants, one per distinct label, in playlist order
        variants: Vec<VariantInfo>,
        /// Number of `EXT-X-STREAM-INF` entries the parser accepted, before
        /// resolution filtering. Entries m3u8-rs rejects (e.g. no `BANDWIDTH`)
        /// are not counted.
        listed: usize,
    },
    Media {
        segment_count: usize,
        total_duration: f64,
    },
}

/// Parse M3U8 playlist content fetched from `playlist_url`
pub fn parse_playlist_body(body: &[u8], playlist_url: &str) -> ExtractionResult<ParsedPlaylist> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);

    match m3u8_rs::parse_playlist_res(body) {
        Ok(Playlist::MasterPlaylist(master)) => Ok(summarize_master(&master, playlist_url)),
        Ok(Playlist::MediaPlaylist(media)) => summarize_media(&media),
        Err(e) => Err(ExtractionError::parse(describe_parse_error(body, &e))),
    }
}

fn describe_parse_error<E: std::fmt::Debug>(body: &[u8], err: &E) -> String {
    if !body.trim_ascii_start().starts_with(b"#EXTM3U") {
        return "response does not start with #EXTM3U".to_string();
    }
    let detail = format!("{:?}", err);
    // nom errors echo the remaining input; keep the message short
    detail.chars().take(160).collect()
}

fn summarize_master(master: &MasterPlaylist, playlist_url: &str) -> ParsedPlaylist {
    let listed = master.variants.iter().filter(|v| !v.is_i_frame).count();
    let variants = unique_variants(&master.variants, playlist_url);

    tracing::debug!(
        "Multivariant playlist: {} variants listed, {} usable",
        listed,
        variants.len()
    );

    ParsedPlaylist::Multivariant { variants, listed }
}

fn summarize_media(media: &MediaPlaylist) -> ExtractionResult<ParsedPlaylist> {
    // m3u8-rs accepts any text after the header; a real media playlist has a
    // target duration or at least one timed segment
    let has_timing = media.target_duration > 0.0
        || media.segments.iter().any(|segment| segment.duration > 0.0);
    if !has_timing {
        return Err(ExtractionError::parse(
            "playlist has neither EXT-X-TARGETDURATION nor timed segments",
        ));
    }

    let total_duration = media
        .segments
        .iter()
        .fold(0.0, |total, segment| total + segment.duration as f64);

    tracing::debug!(
        "Media playlist: {} segments, {:.2}s",
        media.segments.len(),
        total_duration
    );

    Ok(ParsedPlaylist::Media {
        segment_count: media.segments.len(),
        total_duration,
    })
}

/// Map a variant to a displayable resolution, if it has one
pub fn variant_resolution(variant: &VariantStream) -> Option<ResolutionCandidate> {
    let resolution = variant.resolution.as_ref()?;
    ResolutionCandidate::from_dimensions(Some(resolution.width), Some(resolution.height))
}

/// Keep playable variants with a known resolution, first occurrence per label
pub fn unique_variants(variants: &[VariantStream], playlist_url: &str) -> Vec<VariantInfo> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for variant in variants.iter().filter(|v| !v.is_i_frame) {
        let Some(resolution) = variant_resolution(variant) else {
            tracing::trace!("Dropping variant without resolution: {}", variant.uri);
            continue;
        };

        let label = resolution.label();
        if !seen.insert(label.clone()) {
            continue;
        }

        result.push(VariantInfo {
            label,
            resolution,
            bandwidth: variant.bandwidth,
            average_bandwidth: variant.average_bandwidth,
            codecs: variant.codecs.clone(),
            frame_rate: variant.frame_rate,
            uri: resolve_url(playlist_url, &variant.uri),
        });
    }

    result
}

/// Resolve a variant URI against the playlist URL, leaving it untouched if either is not a URL
fn resolve_url(base: &str, relative: &str) -> String {
    Url::parse(base)
        .and_then(|base_url| base_url.join(relative))
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| relative.to_string())
}
