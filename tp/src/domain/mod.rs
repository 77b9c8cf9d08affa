//! Domain types for trip planning
//!
//! The preference model the traveler fills in, and the immutable values the
//! remote phases hand back.

mod itinerary_prefs;
mod preferences;
mod priority;
mod results;

pub use itinerary_prefs::{
    ACTIVITIES_PER_DAY, ActivityCategory, InterestLevel, ItineraryPreferences, MAX_PRIORITY_INTERESTS, MealPreferences,
    MealVenueType, Pace, TIME_FORMAT, Transportation,
};
pub use preferences::{
    AgeGroup, Budget, DATE_FORMAT, GroupRelationship, MAX_LIKES, NO_PREFERENCE, PreferenceProfile, TravelDates,
    TravelStyle,
};
pub use priority::ActivityPriority;
pub use results::{
    ActivitySuggestions, DaySchedule, Destination, DestinationRef, GeneratedItinerary, ItineraryResult,
    ItinerarySummary, ScheduledActivity, SelectedActivity, SuggestedActivity,
};
