//! Translation between the preference model and the backend payloads

use tracing::debug;
use uuid::Uuid;

use super::requests::*;
use super::responses::*;
use crate::domain::{
    ActivityCategory, ActivitySuggestions, Budget, DaySchedule, Destination, DestinationRef, GeneratedItinerary,
    ItineraryPreferences, ItineraryResult, ItinerarySummary, NO_PREFERENCE, PreferenceProfile, ScheduledActivity,
    SelectedActivity, SuggestedActivity, TravelDates,
};

fn budget_payload(budget: &Budget) -> BudgetPayload {
    BudgetPayload {
        min: budget.min,
        max: budget.max,
        currency: budget.currency.clone(),
    }
}

fn dates_payload(dates: &TravelDates) -> TravelDatesPayload {
    TravelDatesPayload {
        start_date: dates.start.clone(),
        end_date: dates.end.clone(),
    }
}

/// Any spelling of the sentinel goes out in its canonical form
fn preferred_location(profile: &PreferenceProfile) -> String {
    if profile.wants_no_preference() {
        NO_PREFERENCE.to_string()
    } else {
        profile.preferred_location.trim().to_string()
    }
}

fn schedule_payload(prefs: &ItineraryPreferences) -> SchedulePayload {
    SchedulePayload {
        pace: prefs.pace.as_str().to_string(),
        daily_start_time: prefs.daily_start_time.clone(),
        daily_end_time: prefs.daily_end_time.clone(),
        max_activities_per_day: prefs.max_activities_per_day,
    }
}

/// Build the destination recommendation request
///
/// The backend only has a single `deal_breakers` field here, so dislikes are
/// sent first, followed by the explicit deal-breakers.
pub fn to_destination_request(profile: &PreferenceProfile) -> DestinationRequest {
    debug!(likes = profile.likes.len(), "to_destination_request: called");
    let deal_breakers = profile
        .dislikes
        .iter()
        .chain(profile.deal_breakers.iter())
        .cloned()
        .collect();

    DestinationRequest {
        preferences: DestinationPreferences {
            traveler_info: TravelerInfoPayload {
                age_group: profile.age_group.map(|g| g.as_str()).unwrap_or_default().to_string(),
            },
            budget: budget_payload(&profile.budget),
            travel_dates: dates_payload(&profile.travel_dates),
            group_size: profile.group_size,
            group_relationship: profile
                .group_relationship
                .map(|r| r.as_str())
                .unwrap_or_default()
                .to_string(),
            preferred_location: preferred_location(profile),
            interests: profile.likes.clone(),
            travel_style: profile.travel_style.map(|s| s.as_str()).unwrap_or_default().to_string(),
            must_haves: profile.must_haves.clone(),
            deal_breakers,
        },
    }
}

/// Build the activity suggestion request with a fresh correlation id
pub fn to_activity_request(
    destination: &Destination,
    profile: &PreferenceProfile,
    prefs: &ItineraryPreferences,
) -> ActivityQuestionnaireRequest {
    debug!(destination = %destination.id, "to_activity_request: called");
    let level = |category| prefs.rating(category).as_str().to_string();
    let schedule = schedule_payload(prefs);

    ActivityQuestionnaireRequest {
        questionnaire_id: Uuid::new_v4().to_string(),
        selected_activities: Vec::new(),
        selected_destination: SelectedDestinationPayload {
            id: destination.id.clone(),
            name: destination.name.clone(),
            city: destination.city().to_string(),
            country: destination.country.clone(),
        },
        travel_dates: dates_payload(&profile.travel_dates),
        activity_preferences: ActivityPreferencesPayload {
            priority_interests: prefs.priority_interests.clone(),
            must_see_attractions: prefs.must_see_attractions.clone(),
            activity_types: ActivityTypesPayload {
                cultural: level(ActivityCategory::CulturalExperiences),
                outdoor: level(ActivityCategory::OutdoorActivities),
                food: level(ActivityCategory::FoodAndDining),
                nightlife: level(ActivityCategory::Nightlife),
                shopping: level(ActivityCategory::Shopping),
                entertainment: level(ActivityCategory::Entertainment),
                historical: level(ActivityCategory::HistoricalSites),
                natural: level(ActivityCategory::NaturalAttractions),
            },
            meal_preferences: MealPreferencesPayload {
                breakfast: prefs.meal_preferences.breakfast.as_str().to_string(),
                lunch: prefs.meal_preferences.lunch.as_str().to_string(),
                dinner: prefs.meal_preferences.dinner.as_str().to_string(),
                dietary_restrictions: prefs.meal_preferences.dietary_restrictions.clone(),
            },
            transportation: prefs.transportation.as_str().to_string(),
            accommodation_area: prefs.accommodation_area.clone(),
            age_group: profile.age_group.map(|g| g.as_str()).unwrap_or_default().to_string(),
            group_size: profile.group_size,
            group_relationship: profile
                .group_relationship
                .map(|r| r.as_str())
                .unwrap_or_default()
                .to_string(),
            preferred_location: preferred_location(profile),
            budget: budget_payload(&profile.budget),
            travel_style: profile.travel_style.map(|s| s.as_str()).unwrap_or_default().to_string(),
            likes: profile.likes.clone(),
            dislikes: profile.dislikes.clone(),
            must_haves: profile.must_haves.clone(),
            deal_breakers: profile.deal_breakers.clone(),
            pace: schedule.pace,
            daily_start_time: schedule.daily_start_time,
            daily_end_time: schedule.daily_end_time,
            max_activities_per_day: schedule.max_activities_per_day,
        },
    }
}

/// Build the itinerary generation request for a correlation id
pub fn to_itinerary_request(
    questionnaire_id: &str,
    selected: &[SelectedActivity],
    prefs: &ItineraryPreferences,
) -> ItineraryGenerateRequest {
    debug!(%questionnaire_id, selected = selected.len(), "to_itinerary_request: called");
    ItineraryGenerateRequest {
        questionnaire_id: questionnaire_id.to_string(),
        selected_activities: selected
            .iter()
            .map(|a| SelectedActivityPayload {
                id: a.activity_id.clone(),
                priority: a.priority.as_str().to_string(),
            })
            .collect(),
        preferences: schedule_payload(prefs),
    }
}

impl From<DestinationPayload> for Destination {
    fn from(p: DestinationPayload) -> Self {
        Self {
            id: p.id,
            name: p.name,
            country: p.country,
            match_score: p.match_score,
            estimated_cost: p.estimated_cost,
            highlights: p.highlights,
            rationale: p.why_recommended,
            image_url: p.image_url,
        }
    }
}

impl From<SuggestedActivityPayload> for SuggestedActivity {
    fn from(p: SuggestedActivityPayload) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category,
            duration_hours: p.duration_hours,
            cost: p.cost,
            priority: p.priority.parse().unwrap_or_default(),
            description: p.description,
        }
    }
}

impl From<DaySchedulePayload> for DaySchedule {
    fn from(p: DaySchedulePayload) -> Self {
        Self {
            date: p.date,
            day_number: p.day_number,
            theme: p.theme,
            activities: p
                .activities
                .into_iter()
                .map(|a| ScheduledActivity {
                    start_time: a.start_time,
                    end_time: a.end_time,
                    activity_name: a.activity.name,
                    activity_type: a.activity.kind,
                    notes: a.activity.notes,
                })
                .collect(),
            daily_cost: p.daily_cost,
            walking_distance: p.walking_distance,
        }
    }
}

/// Recommendations from a successful envelope; a missing list is empty
pub fn destinations_from(response: DestinationResponse) -> Vec<Destination> {
    response
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .map(Destination::from)
        .collect()
}

pub fn activity_suggestions_from(response: ActivitySuggestionsResponse) -> ActivitySuggestions {
    ActivitySuggestions {
        questionnaire_id: response.questionnaire_id,
        destination: response.destination.map(|d| DestinationRef { id: d.id, name: d.name }),
        activities: response
            .suggested_activities
            .unwrap_or_default()
            .into_iter()
            .map(SuggestedActivity::from)
            .collect(),
        ready_for_optimization: response.ready_for_optimization.unwrap_or(false),
    }
}

/// Itinerary from a successful envelope, or `None` when the body had none
pub fn itinerary_from(response: ItineraryResponse) -> Option<ItineraryResult> {
    let itinerary = response.itinerary?;
    Some(ItineraryResult {
        itinerary: GeneratedItinerary {
            destination_name: itinerary.destination,
            total_days: itinerary.total_days,
            daily_schedules: itinerary.daily_schedules.into_iter().map(DaySchedule::from).collect(),
        },
        summary: response.summary.map(|s| ItinerarySummary {
            total_cost: s.total_cost,
            total_activities: s.total_activities,
            optimization_score: s.optimization_score,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityPriority, AgeGroup, InterestLevel};
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn barcelona() -> Destination {
        Destination {
            id: "dest_001".to_string(),
            name: "Barcelona, Spain".to_string(),
            country: "Spain".to_string(),
            match_score: 92,
            estimated_cost: 1650,
            highlights: vec!["Sagrada Familia".to_string()],
            rationale: "Great food".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_destination_request_shape() {
        let mut profile = PreferenceProfile::new(today());
        profile.age_group = Some(AgeGroup::From25To34);
        profile.toggle_like("museums");
        profile.toggle_dislike("crowds");
        profile.toggle_deal_breaker("long flights");

        let value = serde_json::to_value(to_destination_request(&profile)).unwrap();
        let prefs = &value["preferences"];
        assert_eq!(prefs["traveler_info"]["age_group"], "25-34");
        assert_eq!(prefs["travel_dates"]["start_date"], "2026-04-10");
        assert_eq!(prefs["interests"][0], "museums");
        assert_eq!(prefs["deal_breakers"], serde_json::json!(["crowds", "long flights"]));
        assert_eq!(prefs["group_relationship"], "");
        assert_eq!(prefs["travel_style"], "");
    }

    #[test]
    fn test_no_preference_sentinel_is_normalized() {
        let mut profile = PreferenceProfile::new(today());
        profile.preferred_location = " No Preference ".to_string();
        let request = to_destination_request(&profile);
        assert_eq!(request.preferences.preferred_location, "no preference");

        profile.preferred_location = " Portugal ".to_string();
        let request = to_activity_request(&barcelona(), &profile, &ItineraryPreferences::default());
        assert_eq!(request.activity_preferences.preferred_location, "Portugal");
    }

    #[test]
    fn test_activity_request_derives_city_and_keeps_lists_apart() {
        let mut profile = PreferenceProfile::new(today());
        profile.toggle_dislike("crowds");
        profile.toggle_deal_breaker("long flights");
        let mut prefs = ItineraryPreferences::default();
        prefs.set_rating(ActivityCategory::HistoricalSites, InterestLevel::High);

        let request = to_activity_request(&barcelona(), &profile, &prefs);
        assert!(Uuid::parse_str(&request.questionnaire_id).is_ok());
        assert!(request.selected_activities.is_empty());
        assert_eq!(request.selected_destination.city, "Barcelona");
        assert_eq!(request.selected_destination.country, "Spain");

        let ap = &request.activity_preferences;
        assert_eq!(ap.dislikes, vec!["crowds"]);
        assert_eq!(ap.deal_breakers, vec!["long flights"]);
        assert_eq!(ap.activity_types.historical, "high");
        assert_eq!(ap.activity_types.cultural, "medium");
        assert_eq!(ap.meal_preferences.breakfast, "hotel");
        assert_eq!(ap.transportation, "walking_and_public");
        assert_eq!(ap.pace, "moderate");
    }

    #[test]
    fn test_each_activity_request_gets_new_id() {
        let profile = PreferenceProfile::new(today());
        let prefs = ItineraryPreferences::default();
        let a = to_activity_request(&barcelona(), &profile, &prefs);
        let b = to_activity_request(&barcelona(), &profile, &prefs);
        assert_ne!(a.questionnaire_id, b.questionnaire_id);
    }

    #[test]
    fn test_itinerary_request_carries_priorities() {
        let mut selected = vec![SelectedActivity::new("act_1"), SelectedActivity::new("act_2")];
        selected[1].priority = ActivityPriority::High;
        let request = to_itinerary_request("quest_001", &selected, &ItineraryPreferences::default());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["questionnaire_id"], "quest_001");
        assert_eq!(
            value["selected_activities"],
            serde_json::json!([{"id": "act_1", "priority": "medium"}, {"id": "act_2", "priority": "high"}])
        );
        assert_eq!(value["preferences"]["max_activities_per_day"], 4);
        assert_eq!(value["preferences"]["daily_end_time"], "22:00");
    }

    #[test]
    fn test_destination_payload_maps_rationale() {
        let json = r#"{"recommendations":[{"id":"d1","name":"Kyoto, Japan","country":"Japan",
            "match_score":88,"estimated_cost":2100,"highlights":["Temples"],
            "why_recommended":"Quiet gardens","image_url":null}]}"#;
        let response: DestinationResponse = serde_json::from_str(json).unwrap();
        let destinations = destinations_from(response);
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].rationale, "Quiet gardens");
        assert_eq!(destinations[0].city(), "Kyoto");
    }

    #[test]
    fn test_unknown_activity_priority_defaults_to_medium() {
        let json = r#"{"suggested_activities":[{"id":"a1","name":"Tapas tour","category":"food",
            "duration_hours":3,"cost":45.0,"priority":"urgent","description":"Eat"}],
            "questionnaire_id":"quest_001","destination":{"id":"d1","name":"Barcelona"},
            "ready_for_optimization":true}"#;
        let response: ActivitySuggestionsResponse = serde_json::from_str(json).unwrap();
        let suggestions = activity_suggestions_from(response);
        assert_eq!(suggestions.activities[0].priority, ActivityPriority::Medium);
        assert_eq!(suggestions.correlation_id(), Some("quest_001"));
        assert!(suggestions.ready_for_optimization);
    }

    #[test]
    fn test_itinerary_without_body_is_none() {
        let response = ItineraryResponse {
            errors: None,
            itinerary: None,
            summary: None,
        };
        assert!(itinerary_from(response).is_none());
    }

    proptest! {
        #[test]
        fn prop_destination_request_round_trip(
            min in 0i64..10_000,
            extra in 1i64..10_000,
            start_off in 0i64..300,
            len in 1i64..10,
            dislikes in prop::collection::vec("[a-z]{1,8}", 0..5),
            deal_breakers in prop::collection::vec("[a-z ]{1,12}", 0..6),
        ) {
            let mut profile = PreferenceProfile::new(today());
            profile.budget = Budget { min, max: min + extra, currency: "EUR".to_string() };
            let start = today() + Duration::days(start_off);
            profile.travel_dates = TravelDates {
                start: start.format("%Y-%m-%d").to_string(),
                end: (start + Duration::days(len)).format("%Y-%m-%d").to_string(),
            };
            profile.dislikes = dislikes.clone();
            profile.deal_breakers = deal_breakers.clone();

            let bytes = serde_json::to_vec(&to_destination_request(&profile)).unwrap();
            let parsed: DestinationRequest = serde_json::from_slice(&bytes).unwrap();
            let prefs = parsed.preferences;

            prop_assert_eq!(prefs.budget.min, min);
            prop_assert_eq!(prefs.budget.max, min + extra);
            prop_assert_eq!(prefs.budget.currency, "EUR");
            prop_assert_eq!(prefs.travel_dates.start_date, profile.travel_dates.start.clone());
            prop_assert_eq!(prefs.travel_dates.end_date, profile.travel_dates.end.clone());
            let expected: Vec<String> = dislikes.into_iter().chain(deal_breakers).collect();
            prop_assert_eq!(prefs.deal_breakers, expected);
        }
    }
}
