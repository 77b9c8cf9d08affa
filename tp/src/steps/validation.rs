//! Per-step validation rules
//!
//! Every rule is a pure function of the session state handed in through
//! [`ValidationContext`]. Rules report all violated checks, not just the first.

use chrono::NaiveDate;

use super::Step;
use crate::domain::{ACTIVITIES_PER_DAY, Budget, ItineraryPreferences, MAX_LIKES, PreferenceProfile, TravelDates};

/// Default longest trip the recommendation service handles well
pub const DEFAULT_MAX_TRIP_DAYS: i64 = 10;

/// Read-only view of the session that validation rules inspect
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub profile: &'a PreferenceProfile,
    pub itinerary: &'a ItineraryPreferences,
    pub today: NaiveDate,
    pub max_trip_days: i64,
    pub destination_selected: bool,
    pub selected_activities: usize,
}

impl<'a> ValidationContext<'a> {
    pub fn new(profile: &'a PreferenceProfile, itinerary: &'a ItineraryPreferences, today: NaiveDate) -> Self {
        Self {
            profile,
            itinerary,
            today,
            max_trip_days: DEFAULT_MAX_TRIP_DAYS,
            destination_selected: false,
            selected_activities: 0,
        }
    }

    pub fn with_max_trip_days(mut self, days: i64) -> Self {
        self.max_trip_days = days;
        self
    }

    pub fn with_destination_selected(mut self, selected: bool) -> Self {
        self.destination_selected = selected;
        self
    }

    pub fn with_selected_activities(mut self, count: usize) -> Self {
        self.selected_activities = count;
        self
    }
}

pub(super) fn validate_step(step: Step, ctx: &ValidationContext<'_>) -> Vec<String> {
    let profile = ctx.profile;
    let mut errors = Vec::new();

    match step {
        Step::TravelerInfo => {
            if profile.age_group.is_none() {
                errors.push("Please select your age group".to_string());
            }
        }
        Step::TravelDates => {
            errors = validate_travel_dates(&profile.travel_dates, ctx.today, ctx.max_trip_days);
        }
        Step::GroupSize => {
            if !(1..=20).contains(&profile.group_size) {
                errors.push("Group size must be between 1 and 20".to_string());
            }
            if profile.group_relationship.is_none() {
                errors.push("Please select your group relationship".to_string());
            }
        }
        Step::PreferredLocation => {
            if profile.preferred_location.trim().is_empty() {
                errors.push("Please select a destination preference".to_string());
            }
        }
        Step::Budget => {
            errors = validate_budget(&profile.budget);
        }
        Step::TravelStyle => {
            if profile.travel_style.is_none() {
                errors.push("Please select a travel style".to_string());
            }
        }
        Step::Likes => {
            if profile.likes.is_empty() {
                errors.push("Please select at least one thing you like".to_string());
            }
            if profile.likes.len() > MAX_LIKES {
                errors.push(format!("Please select no more than {} likes", MAX_LIKES));
            }
        }
        Step::Dislikes => {
            if profile.dislikes.len() > MAX_LIKES {
                errors.push(format!("Please select no more than {} dislikes", MAX_LIKES));
            }
        }
        Step::DestinationSelection => {
            if !ctx.destination_selected {
                errors.push("Please select a destination to continue".to_string());
            }
        }
        Step::ActivitySelection => {
            if ctx.selected_activities == 0 {
                errors.push("Please select at least one activity to continue".to_string());
            }
        }
        Step::TravelPace => {
            let prefs = ctx.itinerary;
            if !ACTIVITIES_PER_DAY.contains(&prefs.max_activities_per_day) {
                errors.push(format!(
                    "Activities per day must be between {} and {}",
                    ACTIVITIES_PER_DAY.start(),
                    ACTIVITIES_PER_DAY.end()
                ));
            }
            let window_ok = match prefs.daily_window() {
                Some((_, None)) => true,
                Some((start, Some(end))) => start < end,
                None => false,
            };
            if !window_ok {
                errors.push("Daily end time must be after start time".to_string());
            }
        }
        Step::Transportation => {
            if ctx.itinerary.accommodation_area.trim().is_empty() {
                errors.push("Please select your accommodation area preference".to_string());
            }
        }
        Step::MustHaves
        | Step::DealBreakers
        | Step::Summary
        | Step::ActivityTypes
        | Step::MustSeeAttractions
        | Step::MealPreferences
        | Step::ItinerarySummary
        | Step::ItineraryDisplay => {}
    }

    errors
}

/// Budget must be non-negative with `max` strictly above `min`
pub fn validate_budget(budget: &Budget) -> Vec<String> {
    let mut errors = Vec::new();
    if budget.min >= budget.max {
        errors.push("Maximum budget must be greater than minimum".to_string());
    }
    if budget.min < 0 {
        errors.push("Budget cannot be negative".to_string());
    }
    errors
}

/// Layered date checks: presence, ordering, start not in the past, trip length
///
/// An unparsable date counts as missing. Ordering, past and length checks
/// only run when both dates parse, and each is reported independently.
pub fn validate_travel_dates(dates: &TravelDates, today: NaiveDate, max_days: i64) -> Vec<String> {
    let mut errors = Vec::new();
    let start = dates.start_date();
    let end = dates.end_date();

    if start.is_none() {
        errors.push("Please select a start date".to_string());
    }
    if end.is_none() {
        errors.push("Please select an end date".to_string());
    }

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            errors.push("End date must be after start date".to_string());
        }
        if start < today {
            errors.push("Start date must be in the future".to_string());
        }
        if (end - start).num_days() > max_days {
            errors.push(format!(
                "Please select a trip of {} days or less for the best recommendations",
                max_days
            ));
        }
    }

    errors
}
