// src/extract/mod.rs
// =============================================================================
// This module turns a URL into something the crawler can use.
//
// Submodules:
// - http: Downloads page bytes (failures become an empty body)
// - html: Extracts title, body text and outbound links from the bytes
//
// Neither submodule knows about the frontier or the visited set; the crawl
// pipeline wires them together.
// =============================================================================

mod html;
mod http;

pub use html::{parse_page, ExtractLimits};
pub use http::Fetcher;
