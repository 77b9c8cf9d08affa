//! Backend wire format
//!
//! Request and response payloads use the backend's snake_case naming. The
//! mapper is the only place that knows how the preference model lines up
//! with them.

mod mapper;
mod requests;
mod responses;

pub use mapper::{
    activity_suggestions_from, destinations_from, itinerary_from, to_activity_request, to_destination_request,
    to_itinerary_request,
};
pub use requests::{
    ActivityPreferencesPayload, ActivityQuestionnaireRequest, ActivityTypesPayload, BudgetPayload,
    DestinationPreferences, DestinationRequest, ItineraryGenerateRequest, MealPreferencesPayload, SchedulePayload,
    SelectedActivityPayload, SelectedDestinationPayload, TravelDatesPayload, TravelerInfoPayload,
};
pub use responses::{
    ActivitySuggestionsResponse, BackendError, DestinationResponse, Envelope, ErrorCode, ErrorEnvelope,
    ItineraryResponse,
};
