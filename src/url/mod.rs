//! URL handling module for Page-Trawler
//!
//! This module provides anchor resolution, same-origin checks and path-filter
//! matching.

mod domain;
mod matcher;
mod resolve;

pub use domain::{extract_host, is_same_origin};
pub use matcher::matches_path_filter;
pub use resolve::resolve_href;
