//! TripPlanner - guided trip planning client
//!
//! Walks a traveler through a questionnaire and drives three sequential
//! calls against the recommendation service: destination recommendations,
//! activity suggestions at the chosen destination, and itinerary generation.
//!
//! # Modules
//!
//! - [`domain`] - Preference model and phase results
//! - [`steps`] - Questionnaire step graph and validation rules
//! - [`wire`] - Backend payloads and the mapping to and from the domain
//! - [`api`] - Client trait and HTTP implementation
//! - [`store`] - Persistence for completed phase results
//! - [`coordinator`] - Session state machine tying it all together
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod api;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod steps;
pub mod store;
pub mod wire;

// Re-export commonly used types
pub use api::{ApiError, HttpPlannerClient, PlannerApi, create_client};
pub use config::{ApiConfig, Config, StorageConfig};
pub use coordinator::{Coordinator, CoordinatorConfig, FlowError, Phase, PhaseStatus};
pub use domain::{
    ActivityPriority, ActivitySuggestions, Destination, ItineraryPreferences, ItineraryResult, PreferenceProfile,
    SelectedActivity,
};
pub use steps::{Step, StepGraph, ValidationContext};
pub use store::{FileStore, MemoryStore, ResultStore, StoreError};
