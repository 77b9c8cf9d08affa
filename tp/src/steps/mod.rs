//! Questionnaire step graph
//!
//! A fixed, ordered list of steps. Moving forward is gated on the current
//! step's validation rule; moving back and jumping are unconditional.

mod validation;

pub use validation::{DEFAULT_MAX_TRIP_DAYS, ValidationContext, validate_budget, validate_travel_dates};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One page of the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    TravelerInfo,
    TravelDates,
    GroupSize,
    PreferredLocation,
    Budget,
    TravelStyle,
    Likes,
    Dislikes,
    MustHaves,
    DealBreakers,
    Summary,
    DestinationSelection,
    ActivityTypes,
    ActivitySelection,
    TravelPace,
    MustSeeAttractions,
    MealPreferences,
    Transportation,
    ItinerarySummary,
    ItineraryDisplay,
}

impl Step {
    pub const ALL: [Step; 20] = [
        Self::TravelerInfo,
        Self::TravelDates,
        Self::GroupSize,
        Self::PreferredLocation,
        Self::Budget,
        Self::TravelStyle,
        Self::Likes,
        Self::Dislikes,
        Self::MustHaves,
        Self::DealBreakers,
        Self::Summary,
        Self::DestinationSelection,
        Self::ActivityTypes,
        Self::ActivitySelection,
        Self::TravelPace,
        Self::MustSeeAttractions,
        Self::MealPreferences,
        Self::Transportation,
        Self::ItinerarySummary,
        Self::ItineraryDisplay,
    ];

    pub fn first() -> Self {
        Self::ALL[0]
    }

    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in the flow as a fraction in 0.0..=1.0, for display only
    pub fn progress(&self) -> f64 {
        self.index() as f64 / (Self::ALL.len() - 1) as f64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TravelerInfo => "travelerInfo",
            Self::TravelDates => "travelDates",
            Self::GroupSize => "groupSize",
            Self::PreferredLocation => "preferredLocation",
            Self::Budget => "budget",
            Self::TravelStyle => "travelStyle",
            Self::Likes => "likes",
            Self::Dislikes => "dislikes",
            Self::MustHaves => "mustHaves",
            Self::DealBreakers => "dealBreakers",
            Self::Summary => "summary",
            Self::DestinationSelection => "destinationSelection",
            Self::ActivityTypes => "activityTypes",
            Self::ActivitySelection => "activitySelection",
            Self::TravelPace => "travelPace",
            Self::MustSeeAttractions => "mustSeeAttractions",
            Self::MealPreferences => "mealPreferences",
            Self::Transportation => "transportation",
            Self::ItinerarySummary => "itinerarySummary",
            Self::ItineraryDisplay => "itineraryDisplay",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TravelerInfo => "About You",
            Self::TravelDates => "Travel Dates",
            Self::GroupSize => "Group Size",
            Self::PreferredLocation => "Preferred Location",
            Self::Budget => "Budget",
            Self::TravelStyle => "Travel Style",
            Self::Likes => "Likes",
            Self::Dislikes => "Dislikes",
            Self::MustHaves => "Must-Haves",
            Self::DealBreakers => "Deal-Breakers",
            Self::Summary => "Summary",
            Self::DestinationSelection => "Choose Destination",
            Self::ActivityTypes => "Activity Types",
            Self::ActivitySelection => "Select Activities",
            Self::TravelPace => "Travel Pace",
            Self::MustSeeAttractions => "Must-See Attractions",
            Self::MealPreferences => "Meal Preferences",
            Self::Transportation => "Transportation",
            Self::ItinerarySummary => "Review",
            Self::ItineraryDisplay => "Your Itinerary",
        }
    }

    /// Messages for every rule this step currently violates
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<String> {
        validation::validate_step(*self, ctx)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown step: {}", s))
    }
}

/// Cursor over the step list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGraph {
    current: Step,
}

impl Default for StepGraph {
    fn default() -> Self {
        Self { current: Step::first() }
    }
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn progress(&self) -> f64 {
        self.current.progress()
    }

    pub fn can_go_back(&self) -> bool {
        self.current.index() > 0
    }

    /// Move forward when the current step has no violations; clamps at the last step
    pub fn advance(&mut self, ctx: &ValidationContext<'_>) -> bool {
        let messages = self.current.validate(ctx);
        if !messages.is_empty() {
            debug!(step = %self.current, count = messages.len(), "advance: blocked by validation");
            return false;
        }
        let next = (self.current.index() + 1).min(Step::ALL.len() - 1);
        self.current = Step::ALL[next];
        debug!(step = %self.current, "advance: moved");
        true
    }

    /// Move back one step without validating; no-op on the first step
    pub fn back(&mut self) {
        if let Some(prev) = self.current.index().checked_sub(1) {
            self.current = Step::ALL[prev];
            debug!(step = %self.current, "back: moved");
        }
    }

    pub fn jump_to(&mut self, step: Step) {
        debug!(from = %self.current, to = %step, "jump_to: called");
        self.current = step;
    }

    pub fn reset(&mut self) {
        self.current = Step::first();
    }
}
