//! Core extraction logic
//!
//! This module contains the domain models, configuration, playlist fetching
//! and the extraction runtime.

pub mod config;
pub mod error_handling;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod runtime;

// Re-export commonly used types
pub use config::{AppConfig, ProbeConfig};
pub use error_handling::{ErrorKind, ExtractionError, ExtractionResult};
pub use extractor::ResolutionExtractor;
