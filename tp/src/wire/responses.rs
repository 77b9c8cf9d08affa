//! Response envelopes as the backend sends them
//!
//! Every envelope may carry an `errors` list next to its payload. A
//! non-empty list wins over any payload that came along with it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Backend error code; some handlers send strings, others integers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(code) => write!(f, "{}", code),
            Self::Number(code) => write!(f, "{}", code),
        }
    }
}

/// One application-level error item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    pub code: ErrorCode,
    pub message: String,
}

/// A decoded response body with an optional error list
pub trait Envelope: DeserializeOwned + Send {
    fn errors(&self) -> &[BackendError];
}

/// Bare error envelope, used to read 400/422 bodies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub errors: Option<Vec<BackendError>>,
}

impl Envelope for ErrorEnvelope {
    fn errors(&self) -> &[BackendError] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationPayload {
    pub id: String,
    pub name: String,
    pub country: String,
    pub match_score: u32,
    pub estimated_cost: i64,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub why_recommended: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationResponse {
    pub errors: Option<Vec<BackendError>>,
    pub recommendations: Option<Vec<DestinationPayload>>,
}

impl Envelope for DestinationResponse {
    fn errors(&self) -> &[BackendError] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedActivityPayload {
    pub id: String,
    pub name: String,
    pub category: String,
    pub duration_hours: u32,
    pub cost: f64,
    pub priority: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRefPayload {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySuggestionsResponse {
    pub errors: Option<Vec<BackendError>>,
    pub suggested_activities: Option<Vec<SuggestedActivityPayload>>,
    pub questionnaire_id: Option<String>,
    pub destination: Option<DestinationRefPayload>,
    pub ready_for_optimization: Option<bool>,
}

impl Envelope for ActivitySuggestionsResponse {
    fn errors(&self) -> &[BackendError] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDetailPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledActivityPayload {
    pub start_time: String,
    pub end_time: String,
    pub activity: ActivityDetailPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaySchedulePayload {
    pub date: String,
    pub day_number: u32,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub activities: Vec<ScheduledActivityPayload>,
    #[serde(default)]
    pub daily_cost: f64,
    #[serde(default)]
    pub walking_distance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryPayload {
    pub destination: String,
    pub total_days: u32,
    pub daily_schedules: Vec<DaySchedulePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryPayload {
    pub total_cost: f64,
    pub total_activities: u32,
    pub optimization_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryResponse {
    pub errors: Option<Vec<BackendError>>,
    pub itinerary: Option<ItineraryPayload>,
    pub summary: Option<SummaryPayload>,
}

impl Envelope for ItineraryResponse {
    fn errors(&self) -> &[BackendError] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_accepts_string_or_number() {
        let json = r#"{"errors":[{"code":"INVALID_BUDGET","message":"bad"},{"code":422,"message":"worse"}]}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        let errors = envelope.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, ErrorCode::Text("INVALID_BUDGET".to_string()));
        assert_eq!(errors[1].code.to_string(), "422");
    }

    #[test]
    fn test_null_errors_means_none() {
        let json = r#"{"errors":null,"recommendations":[]}"#;
        let response: DestinationResponse = serde_json::from_str(json).unwrap();
        assert!(response.errors().is_empty());
        assert_eq!(response.recommendations.map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_itinerary_activity_type_field() {
        let json = r#"{
            "itinerary": {
                "destination": "Barcelona, Spain",
                "total_days": 1,
                "daily_schedules": [{
                    "date": "2026-04-10",
                    "day_number": 1,
                    "theme": "Gaudi",
                    "activities": [{
                        "start_time": "09:00",
                        "end_time": "11:00",
                        "activity": {"name": "Sagrada Familia", "type": "cultural", "notes": null}
                    }],
                    "daily_cost": 45.0,
                    "walking_distance": "3.2 km"
                }]
            },
            "summary": {"total_cost": 45.0, "total_activities": 1, "optimization_score": 0.9}
        }"#;
        let response: ItineraryResponse = serde_json::from_str(json).unwrap();
        let itinerary = response.itinerary.unwrap();
        assert_eq!(itinerary.daily_schedules[0].activities[0].activity.kind, "cultural");
    }
}
