//! Coordinator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::steps::DEFAULT_MAX_TRIP_DAYS;

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Capacity of the completion channel between phase tasks and the coordinator
    #[serde(rename = "channel-buffer", default = "default_channel_buffer")]
    pub channel_buffer: usize,

    /// Longest trip, in days, the travel-dates step accepts
    #[serde(rename = "max-trip-days", default = "default_max_trip_days")]
    pub max_trip_days: i64,
}

fn default_channel_buffer() -> usize {
    debug!("default_channel_buffer: called");
    32
}

fn default_max_trip_days() -> i64 {
    debug!("default_max_trip_days: called");
    DEFAULT_MAX_TRIP_DAYS
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        debug!("CoordinatorConfig::default: called");
        Self {
            channel_buffer: default_channel_buffer(),
            max_trip_days: default_max_trip_days(),
        }
    }
}
