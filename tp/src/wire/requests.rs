//! Request payloads in the backend's snake_case shape

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPayload {
    pub min: i64,
    pub max: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelDatesPayload {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerInfoPayload {
    pub age_group: String,
}

/// Body of `POST /destinations/recommendations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRequest {
    pub preferences: DestinationPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPreferences {
    pub traveler_info: TravelerInfoPayload,
    pub budget: BudgetPayload,
    pub travel_dates: TravelDatesPayload,
    pub group_size: i32,
    pub group_relationship: String,
    pub preferred_location: String,
    pub interests: Vec<String>,
    pub travel_style: String,
    pub must_haves: Vec<String>,
    /// Dislikes followed by deal-breakers
    pub deal_breakers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDestinationPayload {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedActivityPayload {
    pub id: String,
    pub priority: String,
}

/// Interest level per category, keyed the way the backend names them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTypesPayload {
    pub cultural: String,
    pub outdoor: String,
    pub food: String,
    pub nightlife: String,
    pub shopping: String,
    pub entertainment: String,
    pub historical: String,
    pub natural: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPreferencesPayload {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPreferencesPayload {
    pub priority_interests: Vec<String>,
    pub must_see_attractions: Vec<String>,
    pub activity_types: ActivityTypesPayload,
    pub meal_preferences: MealPreferencesPayload,
    pub transportation: String,
    pub accommodation_area: String,
    pub age_group: String,
    pub group_size: i32,
    pub group_relationship: String,
    pub preferred_location: String,
    pub budget: BudgetPayload,
    pub travel_style: String,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub must_haves: Vec<String>,
    pub deal_breakers: Vec<String>,
    pub pace: String,
    pub daily_start_time: String,
    pub daily_end_time: String,
    pub max_activities_per_day: u32,
}

/// Body of `POST /itinerary/questionnaire`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityQuestionnaireRequest {
    pub questionnaire_id: String,
    /// Always empty on the initial request
    pub selected_activities: Vec<SelectedActivityPayload>,
    pub selected_destination: SelectedDestinationPayload,
    pub travel_dates: TravelDatesPayload,
    pub activity_preferences: ActivityPreferencesPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub pace: String,
    pub daily_start_time: String,
    pub daily_end_time: String,
    pub max_activities_per_day: u32,
}

/// Body of `POST /itinerary/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryGenerateRequest {
    pub questionnaire_id: String,
    pub selected_activities: Vec<SelectedActivityPayload>,
    pub preferences: SchedulePayload,
}
