//! Values returned by the three remote phases

use serde::{Deserialize, Serialize};

use super::priority::ActivityPriority;

/// A recommended destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    /// Display name, usually "City, Country"
    pub name: String,
    pub country: String,
    /// 0..=100
    pub match_score: u32,
    pub estimated_cost: i64,
    pub highlights: Vec<String>,
    pub rationale: String,
    pub image_url: Option<String>,
}

impl Destination {
    /// City part of the display name: everything before the first comma
    pub fn city(&self) -> &str {
        self.name.split(',').next().map(str::trim).unwrap_or(&self.name)
    }
}

/// An activity proposed for the chosen destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedActivity {
    pub id: String,
    pub name: String,
    pub category: String,
    pub duration_hours: u32,
    pub cost: f64,
    pub priority: ActivityPriority,
    pub description: String,
}

/// Destination reference echoed back by the activities phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRef {
    pub id: String,
    pub name: String,
}

/// Result of the activities phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySuggestions {
    /// Correlation id linking this phase to itinerary generation
    pub questionnaire_id: Option<String>,
    pub destination: Option<DestinationRef>,
    pub activities: Vec<SuggestedActivity>,
    pub ready_for_optimization: bool,
}

impl ActivitySuggestions {
    /// Correlation id, if the service returned a usable one
    pub fn correlation_id(&self) -> Option<&str> {
        self.questionnaire_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn find(&self, activity_id: &str) -> Option<&SuggestedActivity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }
}

/// A suggested activity the traveler picked, with its priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedActivity {
    pub activity_id: String,
    pub priority: ActivityPriority,
}

impl SelectedActivity {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            priority: ActivityPriority::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    pub start_time: String,
    pub end_time: String,
    pub activity_name: String,
    pub activity_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: String,
    pub day_number: u32,
    pub theme: String,
    pub activities: Vec<ScheduledActivity>,
    pub daily_cost: f64,
    pub walking_distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub destination_name: String,
    pub total_days: u32,
    pub daily_schedules: Vec<DaySchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySummary {
    pub total_cost: f64,
    pub total_activities: u32,
    /// 0.0..=1.0
    pub optimization_score: f64,
}

/// Result of the itinerary phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResult {
    pub itinerary: GeneratedItinerary,
    pub summary: Option<ItinerarySummary>,
}
