//! Phase state and completion messages for the Coordinator

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::domain::{ActivitySuggestions, Destination, ItineraryResult};

/// One of the three sequential remote stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Destinations,
    Activities,
    Itinerary,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Self::Destinations, Self::Activities, Self::Itinerary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destinations => "destinations",
            Self::Activities => "activities",
            Self::Itinerary => "itinerary",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable status of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-phase state: a result only exists in `Loaded`, an error only in `Failed`
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PhaseState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> Default for PhaseState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> PhaseState<T> {
    pub(crate) fn status(&self) -> PhaseStatus {
        match self {
            Self::Idle => PhaseStatus::Idle,
            Self::Loading => PhaseStatus::Loading,
            Self::Loaded(_) => PhaseStatus::Loaded,
            Self::Failed(_) => PhaseStatus::Failed,
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub(crate) fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of one remote call, tagged with the phase it belongs to
#[derive(Debug)]
pub(crate) enum PhaseOutcome {
    Destinations(Result<Vec<Destination>, ApiError>),
    Activities(Result<ActivitySuggestions, ApiError>),
    Itinerary(Result<ItineraryResult, ApiError>),
}

impl PhaseOutcome {
    pub(crate) fn phase(&self) -> Phase {
        match self {
            Self::Destinations(_) => Phase::Destinations,
            Self::Activities(_) => Phase::Activities,
            Self::Itinerary(_) => Phase::Itinerary,
        }
    }
}

/// Message from a phase task back to the coordinator
#[derive(Debug)]
pub(crate) struct Completion {
    /// Session epoch the call was issued in
    pub(crate) epoch: u64,
    pub(crate) outcome: PhaseOutcome,
}

/// Errors returned by coordinator commands
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FlowError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, FlowError::Precondition(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation(_))
    }

    /// Messages suitable for showing to the traveler
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            FlowError::Validation(messages) => messages.clone(),
            FlowError::Precondition(message) => vec![message.clone()],
            FlowError::Api(err) => vec![err.user_message()],
        }
    }

    pub fn user_message(&self) -> String {
        self.user_messages().join("\n")
    }
}
