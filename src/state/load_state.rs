//! Data loading state.

use super::coordinator::FetchTicket;
use crate::model::DataError;

/// Whether the table has data to show.
///
/// `Loading` renders the skeleton placeholder, `Failed` the error panel with a
/// retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Rows are current.
    #[default]
    Ready,
    /// Waiting for the collaborator to answer `ticket`.
    Loading {
        /// Outstanding request.
        ticket: FetchTicket,
    },
    /// The last fetch failed.
    Failed {
        /// Reason shown in the error panel.
        message: String,
    },
}

impl LoadState {
    /// Loading state for a new request.
    pub fn loading(ticket: FetchTicket) -> Self {
        Self::Loading { ticket }
    }

    /// Failed state from a collaborator error.
    pub fn failed(error: &DataError) -> Self {
        Self::Failed {
            message: error.message.clone(),
        }
    }

    /// True while a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// True after a failed fetch.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Error message, if failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}
