//! Coordinator for one planning session
//!
//! The Coordinator owns the step graph, the preference model and the three
//! remote phases, which always run in order:
//! - **Destinations:** recommendations for the traveler profile
//! - **Activities:** suggestions at the chosen destination
//! - **Itinerary:** a day-by-day plan from the selected activities
//!
//! Completed activity and itinerary results are persisted so a restarted
//! session can pick up where it stopped.

mod config;
mod core;
mod messages;

pub use config::CoordinatorConfig;
pub use core::Coordinator;
pub use messages::{FlowError, Phase, PhaseStatus};
