/// Run state definitions for the pagination loop
///
/// A run moves through `Init → Fetching → Extracting → Persisting →
/// Deciding` once per page and ends in exactly one `Terminated` state.
use std::fmt;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The last fetched page had no "next page" link
    NoMorePages,

    /// The configured page budget was used up
    MaxPagesReached,

    /// A page's product listing did not appear within the readiness bound
    FetchTimeout,

    /// A shutdown signal arrived mid-run
    Interrupted,

    /// The checkpoint could not be written after a page
    CheckpointFailed,
}

impl Termination {
    /// Returns true if the run ended by walking the catalog as configured
    pub fn is_success(&self) -> bool {
        matches!(self, Self::NoMorePages | Self::MaxPagesReached)
    }

    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMorePages => "no_more_pages",
            Self::MaxPagesReached => "max_pages_reached",
            Self::FetchTimeout => "fetch_timeout",
            Self::Interrupted => "interrupted",
            Self::CheckpointFailed => "checkpoint_failed",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of the controller in the per-page cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Checkpoint loaded, accumulator empty
    Init,

    /// Waiting for the page to become ready
    Fetching { page: u32 },

    /// Turning the page's markup into records
    Extracting { page: u32 },

    /// Writing the checkpoint for the page
    Persisting { page: u32 },

    /// Choosing between the next page and stopping
    Deciding { page: u32 },

    /// The loop has ended; only the final flush remains
    Terminated(Termination),
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Fetching { page } => write!(f, "fetching({})", page),
            Self::Extracting { page } => write!(f, "extracting({})", page),
            Self::Persisting { page } => write!(f, "persisting({})", page),
            Self::Deciding { page } => write!(f, "deciding({})", page),
            Self::Terminated(reason) => write!(f, "terminated({})", reason),
        }
    }
}
