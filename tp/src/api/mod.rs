//! Remote client for the recommendation service

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;

pub use client::PlannerApi;
pub use error::ApiError;
pub use http::{HttpPlannerClient, classify};

use crate::config::ApiConfig;

/// Create the planner client described by config
pub fn create_client(config: &ApiConfig) -> Result<Arc<dyn PlannerApi>, ApiError> {
    debug!(base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(HttpPlannerClient::from_config(config)?))
}
