//! HTTP client for the trip planner backend
//!
//! Every request carries the `x-api-key` header. Responses go through
//! [`classify`], which maps status codes and envelopes onto [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{ApiError, PlannerApi};
use crate::config::ApiConfig;
use crate::domain::{ActivitySuggestions, Destination, ItineraryResult};
use crate::wire::{
    self, ActivityQuestionnaireRequest, ActivitySuggestionsResponse, DestinationRequest, DestinationResponse,
    Envelope, ErrorEnvelope, ItineraryGenerateRequest, ItineraryResponse,
};

const HEALTH_PATH: &str = "/destinations/health";
const RECOMMENDATIONS_PATH: &str = "/destinations/recommendations";
const QUESTIONNAIRE_PATH: &str = "/itinerary/questionnaire";
const GENERATE_PATH: &str = "/itinerary/generate";

const AUTH_MESSAGE: &str = "Invalid API key";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request data";
const SERVER_MESSAGE: &str = "Backend server error";

/// Map an HTTP status and body onto a decoded envelope or a typed error
///
/// Bodies of 401/403 and 5xx responses are never surfaced.
pub fn classify<E: Envelope>(status: u16, body: &[u8]) -> Result<E, ApiError> {
    debug!(status, body_len = body.len(), "classify: called");
    match status {
        200..=299 => {
            let envelope: E = serde_json::from_slice(body)
                .map_err(|e| ApiError::network(format!("Failed to decode response: {}", e)))?;
            if envelope.errors().is_empty() {
                Ok(envelope)
            } else {
                debug!(count = envelope.errors().len(), "classify: domain errors in envelope");
                Err(ApiError::Domain(envelope.errors().to_vec()))
            }
        }
        400 | 422 => {
            let message = serde_json::from_slice::<ErrorEnvelope>(body)
                .ok()
                .and_then(|env| env.errors().first().map(|e| e.message.clone()))
                .unwrap_or_else(|| INVALID_REQUEST_MESSAGE.to_string());
            Err(ApiError::InvalidRequest(message))
        }
        401 | 403 => Err(ApiError::Authentication(AUTH_MESSAGE.to_string())),
        500..=599 => Err(ApiError::Server(SERVER_MESSAGE.to_string())),
        other => Err(ApiError::Network {
            status: Some(other),
            message: format!("Unexpected response: {}", other),
        }),
    }
}

/// reqwest-backed [`PlannerApi`]
pub struct HttpPlannerClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl HttpPlannerClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, ?timeout, "HttpPlannerClient::new: called");
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(e.to_string()))?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            http,
        })
    }

    /// Create a client from configuration, resolving the API key
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        debug!(base_url = %config.base_url, "from_config: called");
        let api_key = config
            .api_key()
            .map_err(|e| ApiError::Authentication(e.to_string()))?;
        Self::new(&config.base_url, api_key, Duration::from_millis(config.timeout_ms))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<Req: Serialize + Sync, E: Envelope>(&self, path: &str, body: &Req) -> Result<E, ApiError> {
        let url = self.url(path);
        debug!(%url, "post: called");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "post: transport failure");
                ApiError::network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| ApiError::network(e.to_string()))?;
        debug!(%url, status, "post: response received");
        classify(status, &bytes)
    }
}

#[async_trait]
impl PlannerApi for HttpPlannerClient {
    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.url(HEALTH_PATH);
        debug!(%url, "health_check: called");
        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Ok(response.status().as_u16() == 200)
    }

    async fn recommend_destinations(&self, request: DestinationRequest) -> Result<Vec<Destination>, ApiError> {
        let response: DestinationResponse = self.post(RECOMMENDATIONS_PATH, &request).await?;
        Ok(wire::destinations_from(response))
    }

    async fn suggest_activities(&self, request: ActivityQuestionnaireRequest) -> Result<ActivitySuggestions, ApiError> {
        let response: ActivitySuggestionsResponse = self.post(QUESTIONNAIRE_PATH, &request).await?;
        Ok(wire::activity_suggestions_from(response))
    }

    async fn generate_itinerary(&self, request: ItineraryGenerateRequest) -> Result<ItineraryResult, ApiError> {
        let response: ItineraryResponse = self.post(GENERATE_PATH, &request).await?;
        wire::itinerary_from(response).ok_or_else(|| ApiError::network("Response did not include an itinerary"))
    }
}
