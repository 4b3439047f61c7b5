//! Core data models for playlist quality probing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used between width and height in dimension labels
pub const DIMENSION_SEPARATOR: char = '×';

/// A single resolution discovered for a playlist

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResolutionCandidate {
    Dimensions { width: u64, height: u64 },

    Height(u64),
}

impl ResolutionCandidate {
    /// Build a candidate from possibly-unknown dimensions.
    ///
    /// Both sides positive gives `Dimensions`, a positive height alone gives
    /// `Height`, anything else cannot be shown to the user.
    pub fn from_dimensions(width: Option<u64>, height: Option<u64>) -> Option<Self> {
        match (width.unwrap_or(0), height.unwrap_or(0)) {
            (_, 0) => None,
            (0, height) => Some(Self::Height(height)),
            (width, height) => Some(Self::Dimensions { width, height }),
        }
    }

    pub fn height(&self) -> u64 {
        match self {
            Self::Dimensions { height, .. } => *height,
            Self::Height(height) => *height,
        }
    }

    /// Display label shown in a quality picker
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResolutionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensions { width, height } => {
                write!(f, "{}{}{}", width, DIMENSION_SEPARATOR, height)
            }
            Self::Height(height) => write!(f, "{}p", height),
        }
    }
}

/// Playlist structure detected in a fetched body

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlaylistKind {
    Multivariant,

    Media,
}

/// Where the labels of a [`ResolutionList`] came from

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Read from `EXT-X-STREAM-INF` resolution attributes
    Variants,

    /// Inferred from the playlist URL text
    UrlPattern,

    /// Nothing was determinable, the configured placeholder was used
    Default,
}

/// Successful outcome of a single extraction call

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionList {
    pub url: String,

    pub labels: Vec<String>,

    pub source: ResolutionSource,

    pub kind: PlaylistKind,

    pub fetched_at: DateTime<Utc>,
}

impl ResolutionList {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_default(&self) -> bool {
        self.source == ResolutionSource::Default
    }
}

/// One playable stream of a multivariant playlist

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantInfo {
    pub label: String,

    pub resolution: ResolutionCandidate,

    pub bandwidth: u64,

    pub average_bandwidth: Option<u64>,

    pub codecs: Option<String>,

    pub frame_rate: Option<f64>,

    /// Absolute URI of the media playlist for this variant
    pub uri: String,
}
