//! Playlist and URL parsing
//!
//! Contains the HLS playlist reader and the URL-pattern resolution rules.

pub mod m3u8_parser;
pub mod url_patterns;

pub use m3u8_parser::*;
pub use url_patterns::*;
