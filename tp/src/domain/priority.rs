//! Priority a traveler attaches to a selected activity

use serde::{Deserialize, Serialize};

/// How strongly the traveler wants a selected activity scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl ActivityPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Label shown next to the activity
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::High => "Must Do",
            Self::Medium => "Would Like",
            Self::Low => "If Time Allows",
        }
    }
}

impl std::fmt::Display for ActivityPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}
