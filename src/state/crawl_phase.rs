//! Crawl phase definitions for the orchestrator state machine
//!
//! ```text
//! Idle -> Starting -> Running -> Completed | Cancelled | Failed
//!            \-> Failed | Cancelled
//! ```
use std::fmt;

/// Represents the lifecycle phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// No crawl has been started yet
    #[default]
    Idle,

    /// Frontier reset, seed page being extracted
    Starting,

    /// Frontier loop in progress
    Running,

    // ===== Terminal Phases =====
    /// Pending set exhausted
    Completed,

    /// Cancellation observed; partial results kept
    Cancelled,

    /// No usable starting point
    Failed,
}

impl CrawlPhase {
    /// Returns true if this is a terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    ///
    /// A terminal phase may restart into `Starting`, which is how one
    /// coordinator runs several crawls in sequence.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Starting) => true,
            (Self::Starting, Self::Running | Self::Failed | Self::Cancelled) => true,
            (Self::Running, Self::Completed | Self::Cancelled | Self::Failed) => true,
            (from, Self::Starting) => from.is_terminal(),
            _ => false,
        }
    }

    /// Converts the phase to its database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Parses a phase from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "starting" => Some(Self::Starting),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
