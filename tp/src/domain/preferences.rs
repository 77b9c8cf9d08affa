//! Traveler preference profile collected by the first half of the questionnaire

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of likes or dislikes a traveler may pick
pub const MAX_LIKES: usize = 5;

/// Sentinel for "let the service pick the country"
pub const NO_PREFERENCE: &str = "no preference";

/// Wire and storage format for travel dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Age bracket of the primary traveler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55-64")]
    From55To64,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 6] = [
        Self::From18To24,
        Self::From25To34,
        Self::From35To44,
        Self::From45To54,
        Self::From55To64,
        Self::Over65,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::From18To24 => "18-24",
            Self::From25To34 => "25-34",
            Self::From35To44 => "35-44",
            Self::From45To54 => "45-54",
            Self::From55To64 => "55-64",
            Self::Over65 => "65+",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown age group: {}", s))
    }
}

/// How the members of the travelling party relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRelationship {
    Solo,
    Couple,
    Friends,
    FamilyWithKids,
    FamilyAdultsOnly,
    WorkColleagues,
    MixedGroup,
}

impl GroupRelationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Couple => "couple",
            Self::Friends => "friends",
            Self::FamilyWithKids => "family_with_kids",
            Self::FamilyAdultsOnly => "family_adults_only",
            Self::WorkColleagues => "work_colleagues",
            Self::MixedGroup => "mixed_group",
        }
    }
}

impl std::fmt::Display for GroupRelationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall flavor of the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Adventure,
    Relaxed,
    Balanced,
    Luxury,
}

impl TravelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Relaxed => "relaxed",
            Self::Balanced => "balanced",
            Self::Luxury => "luxury",
        }
    }
}

impl std::fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending range for the whole trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub min: i64,
    pub max: i64,
    pub currency: String,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            min: 500,
            max: 2000,
            currency: "USD".to_string(),
        }
    }
}

/// Trip window as ISO `yyyy-MM-dd` strings, exactly as entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelDates {
    pub start: String,
    pub end: String,
}

impl TravelDates {
    /// Default window: one month out, lasting a week
    pub fn starting_from(today: NaiveDate) -> Self {
        let start = today.checked_add_months(Months::new(1)).unwrap_or(today);
        let end = start + chrono::Duration::days(7);
        Self {
            start: start.format(DATE_FORMAT).to_string(),
            end: end.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_date(&self.start)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_date(&self.end)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Everything the traveler told us before destinations are recommended
///
/// Owned by the coordinator for one planning session. List fields keep
/// insertion order; `likes` and `dislikes` behave as capped sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceProfile {
    pub age_group: Option<AgeGroup>,
    pub budget: Budget,
    pub travel_dates: TravelDates,
    pub group_size: i32,
    pub group_relationship: Option<GroupRelationship>,
    pub preferred_location: String,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub must_haves: Vec<String>,
    pub deal_breakers: Vec<String>,
    pub travel_style: Option<TravelStyle>,
}

impl PreferenceProfile {
    /// Fresh profile with dates defaulted relative to `today`
    pub fn new(today: NaiveDate) -> Self {
        debug!(%today, "PreferenceProfile::new: called");
        Self {
            age_group: None,
            budget: Budget::default(),
            travel_dates: TravelDates::starting_from(today),
            group_size: 2,
            group_relationship: None,
            preferred_location: String::new(),
            likes: Vec::new(),
            dislikes: Vec::new(),
            must_haves: Vec::new(),
            deal_breakers: Vec::new(),
            travel_style: None,
        }
    }

    /// Toggle a like; returns whether the list changed
    pub fn toggle_like(&mut self, like: &str) -> bool {
        toggle_capped(&mut self.likes, like, MAX_LIKES)
    }

    /// Toggle a dislike; returns whether the list changed
    pub fn toggle_dislike(&mut self, dislike: &str) -> bool {
        toggle_capped(&mut self.dislikes, dislike, MAX_LIKES)
    }

    pub fn toggle_must_have(&mut self, item: &str) -> bool {
        toggle_capped(&mut self.must_haves, item, usize::MAX)
    }

    pub fn toggle_deal_breaker(&mut self, item: &str) -> bool {
        toggle_capped(&mut self.deal_breakers, item, usize::MAX)
    }

    /// Add a free-text must-have; blank and duplicate entries are ignored
    pub fn add_custom_must_have(&mut self, item: &str) -> bool {
        push_trimmed(&mut self.must_haves, item)
    }

    /// Add a free-text deal-breaker; blank and duplicate entries are ignored
    pub fn add_custom_deal_breaker(&mut self, item: &str) -> bool {
        push_trimmed(&mut self.deal_breakers, item)
    }

    /// Whether the traveler left the country choice to the service
    pub fn wants_no_preference(&self) -> bool {
        self.preferred_location.trim().eq_ignore_ascii_case(NO_PREFERENCE)
    }
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

/// Remove `item` when present, otherwise append it while below `cap`
pub(crate) fn toggle_capped(list: &mut Vec<String>, item: &str, cap: usize) -> bool {
    if let Some(pos) = list.iter().position(|x| x == item) {
        list.remove(pos);
        true
    } else if list.len() < cap {
        list.push(item.to_string());
        true
    } else {
        debug!(%item, cap, "toggle_capped: list full, ignoring");
        false
    }
}

pub(crate) fn push_trimmed(list: &mut Vec<String>, item: &str) -> bool {
    let trimmed = item.trim();
    if trimmed.is_empty() || list.iter().any(|x| x == trimmed) {
        return false;
    }
    list.push(trimmed.to_string());
    true
}
