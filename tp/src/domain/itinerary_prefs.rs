//! Scheduling preferences collected once a destination has been chosen

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::preferences::{push_trimmed, toggle_capped};

/// Maximum number of ranked priority interests
pub const MAX_PRIORITY_INTERESTS: usize = 5;

/// Allowed range for `max_activities_per_day`
pub const ACTIVITIES_PER_DAY: std::ops::RangeInclusive<u32> = 2..=6;

/// Wire format for daily time bounds
pub const TIME_FORMAT: &str = "%H:%M";

/// How densely the days should be packed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    #[default]
    Moderate,
    Fast,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Moderate => "moderate",
            Self::Fast => "fast",
        }
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Pace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relaxed" => Ok(Self::Relaxed),
            "moderate" => Ok(Self::Moderate),
            "fast" => Ok(Self::Fast),
            _ => Err(format!("Unknown pace: {}", s)),
        }
    }
}

/// Interest in one activity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl InterestLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// The eight fixed activity categories a traveler rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    CulturalExperiences,
    OutdoorActivities,
    FoodAndDining,
    Nightlife,
    Shopping,
    Entertainment,
    HistoricalSites,
    NaturalAttractions,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 8] = [
        Self::CulturalExperiences,
        Self::OutdoorActivities,
        Self::FoodAndDining,
        Self::Nightlife,
        Self::Shopping,
        Self::Entertainment,
        Self::HistoricalSites,
        Self::NaturalAttractions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CulturalExperiences => "cultural_experiences",
            Self::OutdoorActivities => "outdoor_activities",
            Self::FoodAndDining => "food_and_dining",
            Self::Nightlife => "nightlife",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::HistoricalSites => "historical_sites",
            Self::NaturalAttractions => "natural_attractions",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CulturalExperiences => "Cultural Experiences",
            Self::OutdoorActivities => "Outdoor Activities",
            Self::FoodAndDining => "Food & Dining",
            Self::Nightlife => "Nightlife",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::HistoricalSites => "Historical Sites",
            Self::NaturalAttractions => "Natural Attractions",
        }
    }
}

impl std::str::FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown activity category: {}", s))
    }
}

/// Where a meal should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealVenueType {
    Hotel,
    Cafe,
    LocalRestaurant,
    FineDining,
    QuickBite,
    Skip,
}

impl MealVenueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Cafe => "cafe",
            Self::LocalRestaurant => "local_restaurant",
            Self::FineDining => "fine_dining",
            Self::QuickBite => "quick_bite",
            Self::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPreferences {
    pub breakfast: MealVenueType,
    pub lunch: MealVenueType,
    pub dinner: MealVenueType,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl Default for MealPreferences {
    fn default() -> Self {
        Self {
            breakfast: MealVenueType::Hotel,
            lunch: MealVenueType::LocalRestaurant,
            dinner: MealVenueType::LocalRestaurant,
            dietary_restrictions: Vec::new(),
        }
    }
}

/// How the traveler gets around at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transportation {
    Walking,
    PublicTransit,
    #[default]
    WalkingAndPublic,
    Rideshare,
    RentalCar,
}

impl Transportation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::PublicTransit => "public_transit",
            Self::WalkingAndPublic => "walking_and_public",
            Self::Rideshare => "rideshare",
            Self::RentalCar => "rental_car",
        }
    }
}

/// Preferences that shape the day-by-day itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryPreferences {
    pub pace: Pace,
    pub daily_start_time: String,
    pub daily_end_time: String,
    pub max_activities_per_day: u32,
    /// Ranked, highest priority first
    pub priority_interests: Vec<String>,
    pub must_see_attractions: Vec<String>,
    pub activity_ratings: BTreeMap<ActivityCategory, InterestLevel>,
    pub meal_preferences: MealPreferences,
    pub transportation: Transportation,
    pub accommodation_area: String,
}

impl Default for ItineraryPreferences {
    fn default() -> Self {
        Self {
            pace: Pace::Moderate,
            daily_start_time: "09:00".to_string(),
            daily_end_time: "22:00".to_string(),
            max_activities_per_day: 4,
            priority_interests: Vec::new(),
            must_see_attractions: Vec::new(),
            activity_ratings: ActivityCategory::ALL
                .into_iter()
                .map(|c| (c, InterestLevel::Medium))
                .collect(),
            meal_preferences: MealPreferences::default(),
            transportation: Transportation::WalkingAndPublic,
            accommodation_area: String::new(),
        }
    }
}

impl ItineraryPreferences {
    /// Rating for a category; unrated categories count as medium
    pub fn rating(&self, category: ActivityCategory) -> InterestLevel {
        self.activity_ratings.get(&category).copied().unwrap_or_default()
    }

    pub fn set_rating(&mut self, category: ActivityCategory, level: InterestLevel) {
        debug!(category = category.as_str(), level = level.as_str(), "set_rating: called");
        self.activity_ratings.insert(category, level);
    }

    /// Append an interest at the lowest rank; duplicates and a full list are ignored
    pub fn add_priority_interest(&mut self, interest: &str) -> bool {
        if self.priority_interests.iter().any(|i| i == interest) {
            return false;
        }
        toggle_capped(&mut self.priority_interests, interest, MAX_PRIORITY_INTERESTS)
    }

    pub fn remove_priority_interest(&mut self, interest: &str) -> bool {
        let before = self.priority_interests.len();
        self.priority_interests.retain(|i| i != interest);
        before != self.priority_interests.len()
    }

    /// Re-rank: move the interest at `from` to position `to`
    pub fn move_priority_interest(&mut self, from: usize, to: usize) -> bool {
        let len = self.priority_interests.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let interest = self.priority_interests.remove(from);
        self.priority_interests.insert(to, interest);
        true
    }

    pub fn toggle_must_see(&mut self, attraction: &str) -> bool {
        toggle_capped(&mut self.must_see_attractions, attraction, usize::MAX)
    }

    /// Add a free-text attraction; blank and duplicate entries are ignored
    pub fn add_must_see(&mut self, attraction: &str) -> bool {
        push_trimmed(&mut self.must_see_attractions, attraction)
    }

    pub fn remove_must_see(&mut self, attraction: &str) -> bool {
        let before = self.must_see_attractions.len();
        self.must_see_attractions.retain(|a| a != attraction);
        before != self.must_see_attractions.len()
    }

    /// Daily window as parsed times. An end of `00:00` means midnight.
    pub fn daily_window(&self) -> Option<(NaiveTime, Option<NaiveTime>)> {
        let start = NaiveTime::parse_from_str(self.daily_start_time.trim(), TIME_FORMAT).ok()?;
        let end = NaiveTime::parse_from_str(self.daily_end_time.trim(), TIME_FORMAT).ok()?;
        let end = if end == NaiveTime::MIN { None } else { Some(end) };
        Some((start, end))
    }
}
