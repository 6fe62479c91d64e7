//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The orchestrator's lifecycle state machine
//! - `Frontier`: Visited/pending URL bookkeeping for one crawl run

mod crawl_phase;
mod frontier;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use frontier::Frontier;
