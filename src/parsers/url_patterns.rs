//! Resolution inference from playlist URLs
//!
//! Single-rendition playlists carry no resolution metadata, but CDNs usually
//! encode the quality somewhere in the path. The rules below are probed in
//! order and the first one that fires wins. Later rules exist to catch layouts
//! the earlier ones miss, so the order must not change.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::core::models::DIMENSION_SEPARATOR;

/// One ordered URL probe.
///
/// A rule holds one or more patterns, tried in order over every match in the
/// URL. The rule fires on the first match its extractor turns into a label.
pub struct UrlRule {
    pub name: &'static str,
    pub patterns: Vec<Regex>,
    extract: fn(&Captures) -> Option<String>,
}

impl UrlRule {
    fn new(name: &'static str, pattern: &str, extract: fn(&Captures) -> Option<String>) -> Self {
        Self::any_of(name, &[pattern], extract)
    }

    fn any_of(
        name: &'static str,
        patterns: &[&str],
        extract: fn(&Captures) -> Option<String>,
    ) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("bad URL rule {name}: {e}")))
            .collect();
        Self {
            name,
            patterns,
            extract,
        }
    }

    /// Apply this rule, returning a label only if the rule fires
    pub fn apply(&self, url: &str) -> Option<String> {
        self.patterns.iter().find_map(|re| {
            re.captures_iter(url)
                .find_map(|caps| (self.extract)(&caps))
        })
    }
}

/// Result of a successful URL inference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    /// 1-based position of the winning rule
    pub rule: usize,
    pub name: &'static str,
    pub label: String,
}

fn height_label(caps: &Captures) -> Option<String> {
    caps.get(1).map(|m| format!("{}p", m.as_str()))
}

fn dimension_label(caps: &Captures) -> Option<String> {
    let width = caps.get(1)?.as_str();
    let height = caps.get(2)?.as_str();
    Some(format!("{}{}{}", width, DIMENSION_SEPARATOR, height))
}

/// Turn `1280x720` into `1280×720`, rejecting anything else
fn normalize_dimensions(raw: &str) -> Option<String> {
    let (width, height) = raw.split_once(['x', 'X'])?;
    if width.is_empty()
        || height.is_empty()
        || !width.bytes().all(|b| b.is_ascii_digit())
        || !height.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some(format!("{}{}{}", width, DIMENSION_SEPARATOR, height))
}

fn multi_list_label(caps: &Captures) -> Option<String> {
    let last = caps.get(1)?.as_str().split(',').last()?;
    let quality = last.split(':').next().unwrap_or(last).trim();
    if quality.is_empty() {
        return None;
    }
    if quality.contains('x') {
        normalize_dimensions(quality).or_else(|| Some(quality.to_string()))
    } else {
        Some(format!("{}p", quality))
    }
}

fn multi_pair_label(caps: &Captures) -> Option<String> {
    normalize_dimensions(caps.get(2)?.as_str())
}

fn multi_compact_label(caps: &Captures) -> Option<String> {
    let last = caps
        .get(1)?
        .as_str()
        .split(':')
        .filter(|part| !part.is_empty())
        .last()?;
    normalize_dimensions(last)
}

/// Three or four ASCII digits, the only sizes a label may carry
fn is_label_number(digits: &str) -> bool {
    (3..=4).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Loose patterns, so anything outside `NNNp` / `NNN×NNN` is refused
fn generic_label(caps: &Captures) -> Option<String> {
    match (caps.get(1), caps.get(2)) {
        (Some(width), Some(height))
            if is_label_number(width.as_str()) && is_label_number(height.as_str()) =>
        {
            Some(format!(
                "{}{}{}",
                width.as_str(),
                DIMENSION_SEPARATOR,
                height.as_str()
            ))
        }
        (Some(height), None) if is_label_number(height.as_str()) => {
            Some(format!("{}p", height.as_str()))
        }
        _ => None,
    }
}

static RULES: LazyLock<Vec<UrlRule>> = LazyLock::new(|| {
    vec![
        UrlRule::new("height-before-extension", r"/(\d{3,4})[pP]\.", height_label),
        UrlRule::new("multi-list", r"multi=([^/]+):/", multi_list_label),
        UrlRule::new(
            "dimensions-mp4-m3u8",
            r"(\d{3,4})[xX×](\d{3,4})\.mp4\.m3u8",
            dimension_label,
        ),
        UrlRule::new("multi-pair", r"multi=(\d+x\d+):(\d+x\d+)/", multi_pair_label),
        UrlRule::new("height-segment", r"/(\d{3,4})[pP]/", height_label),
        UrlRule::new("height-suffix", r"[_\-](\d{3,4})[pP]\.m3u8", height_label),
        UrlRule::new("multi-compact", r"multi=([\dxX:]+)", multi_compact_label),
        UrlRule::new(
            "dimensions-segment",
            r"/(\d{3,4})[xX×](\d{3,4})/",
            dimension_label,
        ),
        UrlRule::new(
            "bitrate-height-suffix",
            r"[_\-]\d+k[_\-](\d{3,4})[pP]\.m3u8",
            height_label,
        ),
        UrlRule::new(
            "height-codec-suffix",
            r"[_\-](\d{3,4})[pP]_[a-z0-9]+\.m3u8",
            height_label,
        ),
        UrlRule::new("height-infix", r"[_\-](\d{3,4})[pP][_\-]", height_label),
        UrlRule::any_of(
            "generic",
            &[r"/(\d+)x(\d+)/", r"[_\-](\d+)p", r"[_\-](\d+)x(\d+)"],
            generic_label,
        ),
        UrlRule::new(
            "height-bitrate-mp4",
            r"/(\d{3,4})[pP]_(\d+)K_\d+\.mp4/",
            height_label,
        ),
    ]
});

/// All rules in evaluation order
pub fn rules() -> &'static [UrlRule] {
    &RULES
}

/// Infer a resolution label from the URL text alone
pub fn infer_from_url(url: &str) -> Option<UrlMatch> {
    for (index, rule) in rules().iter().enumerate() {
        if let Some(label) = rule.apply(url) {
            tracing::trace!("URL rule #{} ({}) matched: {}", index + 1, rule.name, label);
            return Some(UrlMatch {
                rule: index + 1,
                name: rule.name,
                label,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(url: &str) -> Option<String> {
        infer_from_url(url).map(|m| m.label)
    }

    fn rule(url: &str) -> Option<usize> {
        infer_from_url(url).map(|m| m.rule)
    }

    #[test]
    fn test_rule_table_has_thirteen_rules() {
        assert_eq!(rules().len(), 13);
    }

    #[test]
    fn test_height_before_extension() {
        let url = "https://cdn.example.com/videos/abc/720p.m3u8";
        assert_eq!(label(url).as_deref(), Some("720p"));
        assert_eq!(rule(url), Some(1));
    }

    #[test]
    fn test_multi_list_takes_last_entry() {
        let url = "https://hls.example.com/v/multi=256x144:144p:,426x240:240p:,1280x720:720p:/index.m3u8";
        assert_eq!(label(url).as_deref(), Some("1280×720"));
        assert_eq!(rule(url), Some(2));

        let heights = "https://hls.example.com/v/multi=360:a,480:b,1080:c:/index.m3u8";
        assert_eq!(label(heights).as_deref(), Some("1080p"));
    }

    #[test]
    fn test_dimensions_before_mp4_m3u8() {
        let url = "https://cdn.example.com/media/clip_1920x1080.mp4.m3u8";
        assert_eq!(label(url).as_deref(), Some("1920×1080"));
        assert_eq!(rule(url), Some(3));
    }

    #[test]
    fn test_multi_pair_takes_second() {
        let url = "https://cdn.example.com/hls/multi=640x360:1280x720/master.m3u8";
        assert_eq!(label(url).as_deref(), Some("1280×720"));
        assert_eq!(rule(url), Some(4));
    }

    #[test]
    fn test_height_path_segment() {
        let url = "https://cdn.example.com/stream/1080p/index.m3u8";
        assert_eq!(label(url).as_deref(), Some("1080p"));
        assert_eq!(rule(url), Some(5));
    }

    #[test]
    fn test_height_suffix() {
        let url = "https://cdn.example.com/live/stream_720p.m3u8";
        assert_eq!(label(url).as_deref(), Some("720p"));
        assert_eq!(rule(url), Some(6));
    }

    #[test]
    fn test_multi_compact() {
        let url = "https://cdn.example.com/play?multi=640x360:1280x720&sig=1";
        assert_eq!(label(url).as_deref(), Some("1280×720"));
        assert_eq!(rule(url), Some(7));
    }

    #[test]
    fn test_dimensions_path_segment() {
        let url = "https://cdn.example.com/1280x720/stream.m3u8";
        assert_eq!(label(url).as_deref(), Some("1280×720"));
        assert_eq!(rule(url), Some(8));
    }

    #[test]
    fn test_bitrate_and_height_suffix_resolved_by_earlier_rule() {
        // Rule 6 already covers the tail, so the bitrate rule never gets a say.
        let url = "https://cdn.example.com/vod/movie_2500k_720p.m3u8";
        assert_eq!(label(url).as_deref(), Some("720p"));
        assert_eq!(rule(url), Some(6));
    }

    #[test]
    fn test_height_codec_suffix() {
        let url = "https://cdn.example.com/vod/movie_480p_h264.m3u8";
        assert_eq!(label(url).as_deref(), Some("480p"));
        assert_eq!(rule(url), Some(10));
    }

    #[test]
    fn test_height_infix() {
        let url = "https://cdn.example.com/vod/movie-1080p-final/playlist.m3u8";
        assert_eq!(label(url).as_deref(), Some("1080p"));
        assert_eq!(rule(url), Some(11));
    }

    #[test]
    fn test_generic_fallbacks() {
        let height = "https://cdn.example.com/vod/clip_360p?x=1";
        assert_eq!(label(height).as_deref(), Some("360p"));
        assert_eq!(rule(height), Some(12));

        let dims = "https://cdn.example.com/vod/clip-640x360.ts";
        assert_eq!(label(dims).as_deref(), Some("640×360"));
        assert_eq!(rule(dims), Some(12));
    }

    #[test]
    fn test_generic_rejects_non_resolution_numbers() {
        assert_eq!(label("https://cdn.example.com/video_2part/index.m3u8"), None);
        assert_eq!(label("https://cdn.example.com/ep_12345p.ts"), None);
        assert_eq!(label("https://cdn.example.com/a-1x1/x.m3u8"), None);
        assert_eq!(label("https://cdn.example.com/vod/clip_60p?x=1"), None);
    }

    #[test]
    fn test_generic_skips_rejected_match_for_later_one() {
        let url = "https://cdn.example.com/show_2part_480p?x=1";
        assert_eq!(label(url).as_deref(), Some("480p"));
        assert_eq!(rule(url), Some(12));
    }

    #[test]
    fn test_height_bitrate_mp4() {
        let url = "https://cdn.example.com/media/720P_1500K_123456.mp4/index.m3u8";
        assert_eq!(label(url).as_deref(), Some("720p"));
        assert_eq!(rule(url), Some(13));
    }

    #[test]
    fn test_earlier_rule_wins_over_generic() {
        // Matches rule 1 ("/480p.") and the generic "-1080p" fallback.
        let url = "https://cdn.example.com/hd-1080p/480p.m3u8";
        assert!(rules()[11].apply(url).is_some());
        assert_eq!(label(url).as_deref(), Some("480p"));
        assert_eq!(rule(url), Some(1));
    }

    #[test]
    fn test_no_rule_matches() {
        assert_eq!(label("https://cdn.example.com/live/index.m3u8"), None);
        assert_eq!(label("https://example.com/playlist.m3u8?token=abc"), None);
    }
}
