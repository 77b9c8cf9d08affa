//! PlannerApi trait definition

use async_trait::async_trait;

use super::ApiError;
use crate::domain::{ActivitySuggestions, Destination, ItineraryResult};
use crate::wire::{ActivityQuestionnaireRequest, DestinationRequest, ItineraryGenerateRequest};

/// Trait for the remote recommendation service
///
/// Each call sends one request and returns either the decoded payload or a
/// classified error; never both.
#[async_trait]
pub trait PlannerApi: Send + Sync {
    /// Probe the service; `true` means it answered 200
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// Recommend destinations for a traveler profile
    async fn recommend_destinations(&self, request: DestinationRequest) -> Result<Vec<Destination>, ApiError>;

    /// Suggest activities at the chosen destination
    async fn suggest_activities(&self, request: ActivityQuestionnaireRequest) -> Result<ActivitySuggestions, ApiError>;

    /// Turn the selected activities into a day-by-day itinerary
    async fn generate_itinerary(&self, request: ItineraryGenerateRequest) -> Result<ItineraryResult, ApiError>;
}
