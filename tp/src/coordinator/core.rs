//! Main Coordinator implementation
//!
//! All state lives here and is only mutated through `&mut self`. Remote
//! calls run as spawned tasks and report back over a channel; their results
//! land in state only when the owner pumps completions.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::CoordinatorConfig;
use super::messages::{Completion, FlowError, Phase, PhaseOutcome, PhaseState, PhaseStatus};
use crate::api::{ApiError, PlannerApi};
use crate::domain::{
    ActivityCategory, ActivityPriority, ActivitySuggestions, Destination, InterestLevel, ItineraryPreferences,
    ItineraryResult, PreferenceProfile, SelectedActivity, TravelDates,
};
use crate::steps::{Step, StepGraph, ValidationContext, validate_travel_dates};
use crate::store::{ACTIVITY_SUGGESTIONS_KEY, ALL_KEYS, GENERATED_ITINERARY_KEY, ResultStore, StoreError};
use crate::wire;

const NO_DESTINATION_MESSAGE: &str = "Please select a destination first";
const MISSING_QUESTIONNAIRE_ID_MESSAGE: &str = "Missing questionnaire ID. Please reload activity suggestions.";

/// Drives one planning session
pub struct Coordinator {
    api: Arc<dyn PlannerApi>,
    store: Arc<dyn ResultStore>,
    config: CoordinatorConfig,
    today: NaiveDate,

    steps: StepGraph,
    profile: PreferenceProfile,
    itinerary_prefs: ItineraryPreferences,

    destinations: PhaseState<Vec<Destination>>,
    activities: PhaseState<ActivitySuggestions>,
    itinerary: PhaseState<ItineraryResult>,

    selected_destination: Option<Destination>,
    selected_activities: Vec<SelectedActivity>,

    errors: Vec<String>,
    validation_messages: Vec<String>,
    date_warnings: Vec<String>,
    completed: bool,
    /// Move to the display step once the pending itinerary lands
    display_on_itinerary: bool,

    /// Bumped by `reset`; completions from older epochs are dropped
    epoch: u64,
    in_flight: usize,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl Coordinator {
    /// Create a coordinator, restoring any persisted phase results
    ///
    /// Restore failures are logged and otherwise ignored.
    pub async fn new(api: Arc<dyn PlannerApi>, store: Arc<dyn ResultStore>, config: CoordinatorConfig) -> Self {
        debug!(?config, "Coordinator::new: called");
        let today = Local::now().date_naive();
        let (tx, rx) = mpsc::channel(config.channel_buffer.max(1));

        let mut coordinator = Self {
            api,
            store,
            config,
            today,
            steps: StepGraph::new(),
            profile: PreferenceProfile::new(today),
            itinerary_prefs: ItineraryPreferences::default(),
            destinations: PhaseState::Idle,
            activities: PhaseState::Idle,
            itinerary: PhaseState::Idle,
            selected_destination: None,
            selected_activities: Vec::new(),
            errors: Vec::new(),
            validation_messages: Vec::new(),
            date_warnings: Vec::new(),
            completed: false,
            display_on_itinerary: false,
            epoch: 0,
            in_flight: 0,
            tx,
            rx,
        };

        if let Some(suggestions) = coordinator.load_persisted(ACTIVITY_SUGGESTIONS_KEY).await {
            coordinator.activities = PhaseState::Loaded(suggestions);
        }
        if let Some(itinerary) = coordinator.load_persisted(GENERATED_ITINERARY_KEY).await {
            coordinator.itinerary = PhaseState::Loaded(itinerary);
        }

        coordinator.refresh_validation();
        coordinator
    }

    /// Pin the date used for validation and default travel dates
    ///
    /// Resets the profile's dates to the defaults for `today`.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        debug!(%today, "with_today: called");
        self.today = today;
        self.profile.travel_dates = TravelDates::starting_from(today);
        self.refresh_validation();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn step(&self) -> Step {
        self.steps.current()
    }

    pub fn progress(&self) -> f64 {
        self.steps.progress()
    }

    pub fn can_go_back(&self) -> bool {
        self.steps.can_go_back()
    }

    /// Move forward if the current step validates
    pub fn advance(&mut self) -> bool {
        let ctx = step_context(
            &self.profile,
            &self.itinerary_prefs,
            self.today,
            &self.config,
            self.selected_destination.as_ref(),
            &self.selected_activities,
        );
        let moved = self.steps.advance(&ctx);
        self.refresh_validation();
        moved
    }

    pub fn back(&mut self) {
        self.steps.back();
        self.refresh_validation();
    }

    pub fn jump_to(&mut self, step: Step) {
        self.steps.jump_to(step);
        self.refresh_validation();
    }

    /// The primary "next" action
    ///
    /// Crossing a phase boundary starts the matching remote call: the
    /// summary step starts destination loading, the activity-types step
    /// starts activity suggestions, and the itinerary summary starts
    /// generation and moves to the display step once it succeeds. Anywhere
    /// else this is [`advance`](Self::advance), with a blocked move reported
    /// as [`FlowError::Validation`].
    pub fn proceed(&mut self) -> Result<bool, FlowError> {
        let step = self.steps.current();
        debug!(%step, "proceed: called");
        match step {
            Step::Summary => {
                self.jump_to(Step::DestinationSelection);
                self.load_destinations()
            }
            Step::ActivityTypes => {
                self.jump_to(Step::ActivitySelection);
                self.load_activity_suggestions()
            }
            Step::ItinerarySummary => {
                let started = self.generate_itinerary()?;
                self.display_on_itinerary = true;
                Ok(started)
            }
            _ => {
                if self.advance() {
                    Ok(true)
                } else {
                    Err(FlowError::Validation(self.validation_messages.clone()))
                }
            }
        }
    }

    /// Violations of the current step, recomputed after every change
    pub fn validation_messages(&self) -> &[String] {
        &self.validation_messages
    }

    /// Inline travel-date warnings, independent of the current step
    pub fn date_warnings(&self) -> &[String] {
        &self.date_warnings
    }

    fn validation_context(&self) -> ValidationContext<'_> {
        step_context(
            &self.profile,
            &self.itinerary_prefs,
            self.today,
            &self.config,
            self.selected_destination.as_ref(),
            &self.selected_activities,
        )
    }

    fn refresh_validation(&mut self) {
        let messages = self.steps.current().validate(&self.validation_context());
        let warnings = validate_travel_dates(&self.profile.travel_dates, self.today, self.config.max_trip_days);
        self.validation_messages = messages;
        self.date_warnings = warnings;
    }

    // ---------------------------------------------------------------------
    // Preference editing
    // ---------------------------------------------------------------------

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    pub fn itinerary_preferences(&self) -> &ItineraryPreferences {
        &self.itinerary_prefs
    }

    /// Mutate the profile; validation and date warnings are recomputed after
    pub fn update_profile<R>(&mut self, f: impl FnOnce(&mut PreferenceProfile) -> R) -> R {
        let result = f(&mut self.profile);
        self.refresh_validation();
        result
    }

    /// Mutate the itinerary preferences; validation is recomputed after
    pub fn update_itinerary_preferences<R>(&mut self, f: impl FnOnce(&mut ItineraryPreferences) -> R) -> R {
        let result = f(&mut self.itinerary_prefs);
        self.refresh_validation();
        result
    }

    /// Replace the profile wholesale, e.g. with one loaded from a file
    pub fn set_profile(&mut self, profile: PreferenceProfile) {
        self.update_profile(|p| *p = profile);
    }

    pub fn set_itinerary_preferences(&mut self, prefs: ItineraryPreferences) {
        self.update_itinerary_preferences(|p| *p = prefs);
    }

    pub fn set_travel_dates(&mut self, start: impl Into<String>, end: impl Into<String>) {
        let dates = TravelDates {
            start: start.into(),
            end: end.into(),
        };
        debug!(start = %dates.start, end = %dates.end, "set_travel_dates: called");
        self.update_profile(|p| p.travel_dates = dates);
    }

    pub fn set_activity_rating(&mut self, category: ActivityCategory, level: InterestLevel) {
        self.update_itinerary_preferences(|p| p.set_rating(category, level));
    }

    // ---------------------------------------------------------------------
    // Phase commands
    // ---------------------------------------------------------------------

    pub fn status(&self, phase: Phase) -> PhaseStatus {
        match phase {
            Phase::Destinations => self.destinations.status(),
            Phase::Activities => self.activities.status(),
            Phase::Itinerary => self.itinerary.status(),
        }
    }

    /// Error held by a failed phase
    pub fn phase_error(&self, phase: Phase) -> Option<&ApiError> {
        match phase {
            Phase::Destinations => self.destinations.error(),
            Phase::Activities => self.activities.error(),
            Phase::Itinerary => self.itinerary.error(),
        }
    }

    /// Start the destination recommendation call
    ///
    /// Returns `Ok(false)` when a call for this phase is already in flight.
    pub fn load_destinations(&mut self) -> Result<bool, FlowError> {
        debug!(status = %self.destinations.status(), "load_destinations: called");
        if self.destinations.is_loading() {
            debug!("load_destinations: already loading, ignoring");
            return Ok(false);
        }

        let request = wire::to_destination_request(&self.profile);
        self.errors.clear();
        self.destinations = PhaseState::Loading;
        let api = Arc::clone(&self.api);
        self.spawn_call(async move { PhaseOutcome::Destinations(api.recommend_destinations(request).await) });
        info!(phase = %Phase::Destinations, "load_destinations: loading");
        Ok(true)
    }

    /// Start the activity suggestion call for the selected destination
    pub fn load_activity_suggestions(&mut self) -> Result<bool, FlowError> {
        debug!(status = %self.activities.status(), "load_activity_suggestions: called");
        if self.activities.is_loading() {
            debug!("load_activity_suggestions: already loading, ignoring");
            return Ok(false);
        }
        let Some(destination) = self.selected_destination.as_ref() else {
            return Err(self.precondition(NO_DESTINATION_MESSAGE));
        };

        let request = wire::to_activity_request(destination, &self.profile, &self.itinerary_prefs);
        self.errors.clear();
        self.activities = PhaseState::Loading;
        let api = Arc::clone(&self.api);
        self.spawn_call(async move { PhaseOutcome::Activities(api.suggest_activities(request).await) });
        info!(phase = %Phase::Activities, "load_activity_suggestions: loading");
        Ok(true)
    }

    /// Start itinerary generation for the selected activities
    ///
    /// Needs the correlation id from a loaded activities phase.
    pub fn generate_itinerary(&mut self) -> Result<bool, FlowError> {
        debug!(status = %self.itinerary.status(), "generate_itinerary: called");
        if self.itinerary.is_loading() {
            debug!("generate_itinerary: already loading, ignoring");
            return Ok(false);
        }
        let Some(questionnaire_id) = self
            .activities
            .value()
            .and_then(|s| s.correlation_id())
            .map(str::to_string)
        else {
            return Err(self.precondition(MISSING_QUESTIONNAIRE_ID_MESSAGE));
        };

        let request = wire::to_itinerary_request(&questionnaire_id, &self.selected_activities, &self.itinerary_prefs);
        self.errors.clear();
        self.itinerary = PhaseState::Loading;
        let api = Arc::clone(&self.api);
        self.spawn_call(async move { PhaseOutcome::Itinerary(api.generate_itinerary(request).await) });
        info!(phase = %Phase::Itinerary, %questionnaire_id, "generate_itinerary: loading");
        Ok(true)
    }

    /// Clear errors and reload destinations with the current profile
    pub fn retry_destinations(&mut self) -> Result<bool, FlowError> {
        debug!("retry_destinations: called");
        self.errors.clear();
        self.load_destinations()
    }

    pub fn retry_activity_suggestions(&mut self) -> Result<bool, FlowError> {
        debug!("retry_activity_suggestions: called");
        self.errors.clear();
        self.load_activity_suggestions()
    }

    pub fn retry_itinerary(&mut self) -> Result<bool, FlowError> {
        debug!("retry_itinerary: called");
        self.errors.clear();
        self.generate_itinerary()
    }

    fn precondition(&mut self, message: &str) -> FlowError {
        warn!(%message, "precondition failed");
        self.errors = vec![message.to_string()];
        FlowError::Precondition(message.to_string())
    }

    fn spawn_call<F>(&mut self, call: F)
    where
        F: Future<Output = PhaseOutcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        let epoch = self.epoch;
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = call.await;
            if tx.send(Completion { epoch, outcome }).await.is_err() {
                debug!(epoch, "spawn_call: coordinator dropped, discarding completion");
            }
        });
    }

    // ---------------------------------------------------------------------
    // Completion pump
    // ---------------------------------------------------------------------

    /// Number of remote calls whose completion has not been received yet
    pub fn pending_calls(&self) -> usize {
        self.in_flight
    }

    /// Wait for one completion and apply it
    ///
    /// Returns the phase that changed, or `None` when nothing is in flight or
    /// the completion belonged to a session that has since been reset.
    pub async fn next_completion(&mut self) -> Option<Phase> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.apply(completion).await
    }

    /// Apply completions until `phase` is no longer loading
    pub async fn settle(&mut self, phase: Phase) -> PhaseStatus {
        debug!(%phase, "settle: called");
        while self.status(phase) == PhaseStatus::Loading && self.in_flight > 0 {
            self.next_completion().await;
        }
        self.status(phase)
    }

    /// Apply every completion that has already arrived, without waiting
    pub async fn try_apply_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply(completion).await.is_some() {
                applied += 1;
            }
        }
        applied
    }

    async fn apply(&mut self, completion: Completion) -> Option<Phase> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let phase = completion.outcome.phase();
        if completion.epoch != self.epoch {
            debug!(%phase, epoch = completion.epoch, current = self.epoch, "apply: stale completion discarded");
            return None;
        }

        match completion.outcome {
            PhaseOutcome::Destinations(Ok(destinations)) => {
                info!(count = destinations.len(), "apply: destinations loaded");
                let still_listed = self
                    .selected_destination
                    .as_ref()
                    .is_none_or(|selected| destinations.iter().any(|d| d.id == selected.id));
                if !still_listed {
                    debug!("apply: selected destination no longer recommended, clearing");
                    self.selected_destination = None;
                }
                self.destinations = PhaseState::Loaded(destinations);
            }
            PhaseOutcome::Activities(Ok(suggestions)) => {
                info!(count = suggestions.activities.len(), "apply: activity suggestions loaded");
                self.persist(ACTIVITY_SUGGESTIONS_KEY, &suggestions).await;
                self.selected_activities
                    .retain(|selected| suggestions.find(&selected.activity_id).is_some());
                self.activities = PhaseState::Loaded(suggestions);
            }
            PhaseOutcome::Itinerary(Ok(result)) => {
                info!(days = result.itinerary.total_days, "apply: itinerary generated");
                self.persist(GENERATED_ITINERARY_KEY, &result).await;
                self.itinerary = PhaseState::Loaded(result);
                if self.display_on_itinerary {
                    self.display_on_itinerary = false;
                    self.steps.jump_to(Step::ItineraryDisplay);
                }
            }
            PhaseOutcome::Destinations(Err(err)) => {
                self.fail(phase, &err);
                self.destinations = PhaseState::Failed(err);
            }
            PhaseOutcome::Activities(Err(err)) => {
                self.fail(phase, &err);
                self.activities = PhaseState::Failed(err);
            }
            PhaseOutcome::Itinerary(Err(err)) => {
                self.fail(phase, &err);
                self.display_on_itinerary = false;
                self.itinerary = PhaseState::Failed(err);
            }
        }

        self.refresh_validation();
        Some(phase)
    }

    fn fail(&mut self, phase: Phase, err: &ApiError) {
        warn!(%phase, error = %err, "phase failed");
        self.errors = vec![err.user_message()];
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    async fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self.store.put(key, bytes).await,
            Err(e) => Err(StoreError::from(e)),
        };
        if let Err(e) = result {
            warn!(%key, error = %e, "persist: failed, continuing");
        }
    }

    async fn load_persisted<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "load_persisted: read failed, ignoring");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                info!(%key, "load_persisted: restored");
                Some(value)
            }
            Err(e) => {
                warn!(%key, error = %StoreError::from(e), "load_persisted: discarding undecodable value");
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Selections and results
    // ---------------------------------------------------------------------

    pub fn destinations(&self) -> Option<&[Destination]> {
        self.destinations.value().map(Vec::as_slice)
    }

    pub fn activity_suggestions(&self) -> Option<&ActivitySuggestions> {
        self.activities.value()
    }

    pub fn itinerary(&self) -> Option<&ItineraryResult> {
        self.itinerary.value()
    }

    pub fn selected_destination(&self) -> Option<&Destination> {
        self.selected_destination.as_ref()
    }

    pub fn selected_activities(&self) -> &[SelectedActivity] {
        &self.selected_activities
    }

    /// User-facing messages from the most recent remote-call failure
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Choose one of the loaded destinations; does not navigate
    pub fn select_destination(&mut self, destination_id: &str) -> Result<(), FlowError> {
        debug!(%destination_id, "select_destination: called");
        let destination = self
            .destinations()
            .and_then(|list| list.iter().find(|d| d.id == destination_id))
            .cloned()
            .ok_or_else(|| FlowError::Precondition(format!("Unknown destination: {}", destination_id)))?;
        self.selected_destination = Some(destination);
        self.refresh_validation();
        Ok(())
    }

    /// Select or deselect a suggested activity; returns whether it is now selected
    pub fn toggle_activity(&mut self, activity_id: &str) -> Result<bool, FlowError> {
        debug!(%activity_id, "toggle_activity: called");
        if let Some(pos) = self
            .selected_activities
            .iter()
            .position(|a| a.activity_id == activity_id)
        {
            self.selected_activities.remove(pos);
            self.refresh_validation();
            return Ok(false);
        }
        self.ensure_suggested(activity_id)?;
        self.selected_activities.push(SelectedActivity::new(activity_id));
        self.refresh_validation();
        Ok(true)
    }

    /// Change the priority of a selected activity; false if it is not selected
    pub fn set_activity_priority(&mut self, activity_id: &str, priority: ActivityPriority) -> bool {
        debug!(%activity_id, %priority, "set_activity_priority: called");
        match self
            .selected_activities
            .iter_mut()
            .find(|a| a.activity_id == activity_id)
        {
            Some(selected) => {
                selected.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Replace the selection; priorities of activities that stay selected are kept
    pub fn select_activities<I, S>(&mut self, activity_ids: I) -> Result<(), FlowError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection: Vec<SelectedActivity> = Vec::new();
        for id in activity_ids {
            let id = id.as_ref();
            self.ensure_suggested(id)?;
            if selection.iter().any(|a| a.activity_id == id) {
                continue;
            }
            let kept = self
                .selected_activities
                .iter()
                .find(|a| a.activity_id == id)
                .cloned()
                .unwrap_or_else(|| SelectedActivity::new(id));
            selection.push(kept);
        }
        debug!(count = selection.len(), "select_activities: replacing selection");
        self.selected_activities = selection;
        self.refresh_validation();
        Ok(())
    }

    fn ensure_suggested(&self, activity_id: &str) -> Result<(), FlowError> {
        match self.activities.value() {
            Some(suggestions) if suggestions.find(activity_id).is_some() => Ok(()),
            _ => Err(FlowError::Precondition(format!("Unknown activity: {}", activity_id))),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mark the whole flow as finished
    pub fn complete(&mut self) {
        info!("complete: planning session finished");
        self.completed = true;
    }

    // ---------------------------------------------------------------------
    // Reset
    // ---------------------------------------------------------------------

    /// Start over: clear persisted results and restore every default
    ///
    /// Calls still in flight finish in the background, but their results are
    /// discarded.
    pub async fn reset(&mut self) {
        info!(epoch = self.epoch, in_flight = self.in_flight, "reset: called");
        self.epoch += 1;

        for key in ALL_KEYS {
            if let Err(e) = self.store.remove(key).await {
                warn!(%key, error = %e, "reset: failed to clear persisted value");
            }
        }

        self.steps.reset();
        self.profile = PreferenceProfile::new(self.today);
        self.itinerary_prefs = ItineraryPreferences::default();
        self.destinations = PhaseState::Idle;
        self.activities = PhaseState::Idle;
        self.itinerary = PhaseState::Idle;
        self.selected_destination = None;
        self.selected_activities.clear();
        self.errors.clear();
        self.completed = false;
        self.display_on_itinerary = false;
        self.refresh_validation();
    }
}

/// Validation inputs built from individual fields, so callers can keep a
/// mutable borrow on the step graph
fn step_context<'a>(
    profile: &'a PreferenceProfile,
    itinerary_prefs: &'a ItineraryPreferences,
    today: NaiveDate,
    config: &CoordinatorConfig,
    selected_destination: Option<&Destination>,
    selected_activities: &[SelectedActivity],
) -> ValidationContext<'a> {
    ValidationContext::new(profile, itinerary_prefs, today)
        .with_max_trip_days(config.max_trip_days)
        .with_destination_selected(selected_destination.is_some())
        .with_selected_activities(selected_activities.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::api::client::mock::MockPlannerApi;
    use crate::domain::{AgeGroup, GeneratedItinerary, SuggestedActivity};
    use crate::store::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn destination(id: &str, name: &str) -> Destination {
        Destination {
            id: id.to_string(),
            name: name.to_string(),
            country: "Spain".to_string(),
            match_score: 90,
            estimated_cost: 1500,
            highlights: vec!["Architecture".to_string()],
            rationale: "Fits your style".to_string(),
            image_url: None,
        }
    }

    fn three_destinations() -> Vec<Destination> {
        vec![
            destination("dest_001", "Barcelona, Spain"),
            destination("dest_002", "Seville, Spain"),
            destination("dest_003", "Valencia, Spain"),
        ]
    }

    fn activity(id: &str) -> SuggestedActivity {
        SuggestedActivity {
            id: id.to_string(),
            name: format!("Activity {}", id),
            category: "cultural".to_string(),
            duration_hours: 2,
            cost: 25.0,
            priority: ActivityPriority::Medium,
            description: String::new(),
        }
    }

    fn suggestions(questionnaire_id: Option<&str>, ids: &[&str]) -> ActivitySuggestions {
        ActivitySuggestions {
            questionnaire_id: questionnaire_id.map(str::to_string),
            destination: None,
            activities: ids.iter().map(|id| activity(id)).collect(),
            ready_for_optimization: true,
        }
    }

    fn itinerary_result() -> ItineraryResult {
        ItineraryResult {
            itinerary: GeneratedItinerary {
                destination_name: "Barcelona, Spain".to_string(),
                total_days: 2,
                daily_schedules: vec![],
            },
            summary: None,
        }
    }

    async fn coordinator(api: &Arc<MockPlannerApi>, store: &Arc<MemoryStore>) -> Coordinator {
        Coordinator::new(api.clone(), store.clone(), CoordinatorConfig::default())
            .await
            .with_today(today())
    }

    /// Coordinator with destinations loaded and the first one selected
    async fn with_destination(api: &Arc<MockPlannerApi>, store: &Arc<MemoryStore>) -> Coordinator {
        api.push_destinations(Ok(three_destinations()));
        let mut coord = coordinator(api, store).await;
        coord.load_destinations().unwrap();
        assert_eq!(coord.settle(Phase::Destinations).await, PhaseStatus::Loaded);
        coord.select_destination("dest_001").unwrap();
        coord
    }

    #[tokio::test]
    async fn test_new_coordinator_starts_idle() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let coord = coordinator(&api, &store).await;

        assert_eq!(coord.step(), Step::TravelerInfo);
        assert!(!coord.can_go_back());
        for phase in Phase::ALL {
            assert_eq!(coord.status(phase), PhaseStatus::Idle);
        }
        assert_eq!(coord.validation_messages(), ["Please select your age group"]);
        assert!(coord.date_warnings().is_empty());
        assert!(coord.errors().is_empty());
        assert_eq!(coord.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_destinations_success() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        api.push_destinations(Ok(three_destinations()));
        let mut coord = coordinator(&api, &store).await;

        assert_eq!(coord.load_destinations(), Ok(true));
        assert_eq!(coord.status(Phase::Destinations), PhaseStatus::Loading);

        // Second request while loading is ignored
        assert_eq!(coord.load_destinations(), Ok(false));

        assert_eq!(coord.next_completion().await, Some(Phase::Destinations));
        assert_eq!(coord.status(Phase::Destinations), PhaseStatus::Loaded);
        assert_eq!(coord.destinations().unwrap().len(), 3);
        assert_eq!(api.destination_calls(), 1);
        assert_eq!(coord.next_completion().await, None);
    }

    #[tokio::test]
    async fn test_failure_then_retry_recovers() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        api.push_destinations(Err(ApiError::Server("Backend server error".to_string())))
            .push_destinations(Ok(three_destinations()));
        let mut coord = coordinator(&api, &store).await;

        coord.load_destinations().unwrap();
        assert_eq!(coord.settle(Phase::Destinations).await, PhaseStatus::Failed);
        assert_eq!(coord.errors(), ["Server error: Backend server error"]);
        assert!(coord.destinations().is_none());
        assert!(coord.phase_error(Phase::Destinations).is_some());

        // The retry sends the profile as edited after the failure
        coord.update_profile(|p| {
            p.budget.max = 9000;
            p.toggle_dislike("crowds");
        });
        assert_eq!(coord.retry_destinations(), Ok(true));
        assert!(coord.errors().is_empty());
        assert_eq!(coord.settle(Phase::Destinations).await, PhaseStatus::Loaded);
        assert_eq!(coord.destinations().unwrap().len(), 3);
        assert!(coord.phase_error(Phase::Destinations).is_none());
        assert_eq!(api.destination_calls(), 2);

        let sent = api.last_destination_request().unwrap();
        assert_eq!(sent.preferences.budget.max, 9000);
        assert_eq!(sent.preferences.deal_breakers, vec!["crowds"]);
    }

    #[tokio::test]
    async fn test_activity_retry_uses_edited_preferences() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Err(ApiError::network("timed out")))
            .push_activities(Ok(suggestions(Some("q-1"), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        assert_eq!(coord.settle(Phase::Activities).await, PhaseStatus::Failed);
        let first = api.last_activity_request().unwrap();
        assert_eq!(first.activity_preferences.activity_types.historical, "medium");

        coord.set_activity_rating(ActivityCategory::HistoricalSites, InterestLevel::High);
        coord.update_itinerary_preferences(|p| p.max_activities_per_day = 6);
        coord.retry_activity_suggestions().unwrap();
        assert_eq!(coord.settle(Phase::Activities).await, PhaseStatus::Loaded);

        let sent = api.last_activity_request().unwrap();
        assert_eq!(sent.activity_preferences.activity_types.historical, "high");
        assert_eq!(sent.activity_preferences.max_activities_per_day, 6);
        assert_ne!(sent.questionnaire_id, first.questionnaire_id);
    }

    #[tokio::test]
    async fn test_reloaded_destinations_drop_missing_selection() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        // Still recommended: the selection survives
        api.push_destinations(Ok(three_destinations()));
        coord.retry_destinations().unwrap();
        coord.settle(Phase::Destinations).await;
        assert_eq!(coord.selected_destination().unwrap().id, "dest_001");

        api.push_destinations(Ok(three_destinations().split_off(1)));
        coord.retry_destinations().unwrap();
        assert_eq!(coord.settle(Phase::Destinations).await, PhaseStatus::Loaded);
        assert!(coord.selected_destination().is_none());
        assert!(coord.load_activity_suggestions().unwrap_err().is_precondition());
    }

    #[tokio::test]
    async fn test_activities_require_destination() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = coordinator(&api, &store).await;

        let err = coord.load_activity_suggestions().unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(coord.errors(), [NO_DESTINATION_MESSAGE]);
        assert_eq!(coord.status(Phase::Activities), PhaseStatus::Idle);
        assert_eq!(coord.pending_calls(), 0);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_itinerary_requires_questionnaire_id() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = coordinator(&api, &store).await;

        // Nothing loaded yet
        let err = coord.generate_itinerary().unwrap_err();
        assert_eq!(err, FlowError::Precondition(MISSING_QUESTIONNAIRE_ID_MESSAGE.to_string()));

        // Loaded, but the service returned no usable id
        let mut coord = with_destination(&api, &store).await;
        api.push_activities(Ok(suggestions(Some("  "), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;
        coord.toggle_activity("act_1").unwrap();

        let err = coord.generate_itinerary().unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(coord.errors(), [MISSING_QUESTIONNAIRE_ID_MESSAGE]);
        assert_eq!(coord.status(Phase::Itinerary), PhaseStatus::Idle);
        assert_eq!(api.itinerary_calls(), 0);
    }

    #[tokio::test]
    async fn test_full_flow_persists_results() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Ok(suggestions(Some("q-123"), &["act_1", "act_2"])));
        coord.load_activity_suggestions().unwrap();
        assert_eq!(coord.settle(Phase::Activities).await, PhaseStatus::Loaded);

        let sent = api.last_activity_request().unwrap();
        assert_eq!(sent.selected_destination.id, "dest_001");
        assert_eq!(sent.selected_destination.city, "Barcelona");

        assert_eq!(coord.toggle_activity("act_2"), Ok(true));
        assert!(coord.set_activity_priority("act_2", ActivityPriority::High));

        api.push_itinerary(Ok(itinerary_result()));
        coord.generate_itinerary().unwrap();
        assert_eq!(coord.settle(Phase::Itinerary).await, PhaseStatus::Loaded);

        let sent = api.last_itinerary_request().unwrap();
        assert_eq!(sent.questionnaire_id, "q-123");
        assert_eq!(sent.selected_activities.len(), 1);
        assert_eq!(sent.selected_activities[0].id, "act_2");
        assert_eq!(sent.selected_activities[0].priority, "high");

        assert!(store.get(ACTIVITY_SUGGESTIONS_KEY).await.unwrap().is_some());
        assert!(store.get(GENERATED_ITINERARY_KEY).await.unwrap().is_some());

        // A fresh session over the same store restores both results
        let restored = coordinator(&Arc::new(MockPlannerApi::new()), &store).await;
        assert_eq!(restored.status(Phase::Activities), PhaseStatus::Loaded);
        assert_eq!(restored.status(Phase::Itinerary), PhaseStatus::Loaded);
        assert_eq!(restored.itinerary(), Some(&itinerary_result()));
        assert_eq!(restored.activity_suggestions().unwrap().correlation_id(), Some("q-123"));
    }

    #[tokio::test]
    async fn test_undecodable_persisted_value_is_ignored() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        store
            .put(GENERATED_ITINERARY_KEY, b"{not json".to_vec())
            .await
            .unwrap();
        store
            .put(
                ACTIVITY_SUGGESTIONS_KEY,
                serde_json::to_vec(&suggestions(Some("q-1"), &["act_1"])).unwrap(),
            )
            .await
            .unwrap();

        let coord = coordinator(&api, &store).await;
        assert_eq!(coord.status(Phase::Itinerary), PhaseStatus::Idle);
        assert_eq!(coord.status(Phase::Activities), PhaseStatus::Loaded);
        assert!(coord.errors().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_store_and_discards_in_flight() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Ok(suggestions(Some("q-1"), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;
        assert_eq!(store.len().await, 1);

        coord.update_profile(|p| p.age_group = Some(AgeGroup::From25To34));
        coord.advance();

        api.push_destinations(Ok(three_destinations()));
        coord.load_destinations().unwrap();
        coord.reset().await;

        assert!(store.is_empty().await);
        assert_eq!(coord.step(), Step::TravelerInfo);
        assert_eq!(coord.profile(), &PreferenceProfile::new(today()));
        assert_eq!(coord.itinerary_preferences(), &ItineraryPreferences::default());
        assert!(coord.selected_destination().is_none());
        assert!(coord.selected_activities().is_empty());
        for phase in Phase::ALL {
            assert_eq!(coord.status(phase), PhaseStatus::Idle);
        }

        // The call started before the reset still completes, but is dropped
        assert_eq!(coord.pending_calls(), 1);
        assert_eq!(coord.next_completion().await, None);
        assert_eq!(coord.pending_calls(), 0);
        assert_eq!(coord.status(Phase::Destinations), PhaseStatus::Idle);
    }

    #[tokio::test]
    async fn test_new_suggestions_drop_stale_selections() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Ok(suggestions(Some("q-1"), &["act_1", "act_2"])))
            .push_activities(Ok(suggestions(Some("q-2"), &["act_2", "act_3"])));
        coord.load_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;
        coord.select_activities(["act_1", "act_2"]).unwrap();
        coord.set_activity_priority("act_2", ActivityPriority::Low);

        coord.retry_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;

        assert_eq!(coord.selected_activities().len(), 1);
        assert_eq!(coord.selected_activities()[0].activity_id, "act_2");
        assert_eq!(coord.selected_activities()[0].priority, ActivityPriority::Low);
    }

    #[tokio::test]
    async fn test_select_activities_rejects_unknown_ids() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Ok(suggestions(Some("q-1"), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;

        assert!(coord.select_activities(["act_1", "act_9"]).unwrap_err().is_precondition());
        assert!(coord.selected_activities().is_empty());
        assert!(coord.toggle_activity("act_9").is_err());
        assert_eq!(coord.toggle_activity("act_1"), Ok(true));
        assert_eq!(coord.toggle_activity("act_1"), Ok(false));
        assert!(!coord.set_activity_priority("act_1", ActivityPriority::High));
    }

    #[tokio::test]
    async fn test_select_unknown_destination() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        assert!(coord.select_destination("dest_999").unwrap_err().is_precondition());
        assert_eq!(coord.selected_destination().unwrap().id, "dest_001");
        assert_eq!(coord.step(), Step::TravelerInfo);
    }

    #[tokio::test]
    async fn test_proceed_crosses_phase_boundaries() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        api.push_destinations(Ok(three_destinations()));
        let mut coord = coordinator(&api, &store).await;

        coord.jump_to(Step::Summary);
        assert_eq!(coord.proceed(), Ok(true));
        assert_eq!(coord.step(), Step::DestinationSelection);
        assert_eq!(coord.status(Phase::Destinations), PhaseStatus::Loading);
        coord.settle(Phase::Destinations).await;

        // Cannot leave destination selection without choosing one
        let err = coord.proceed().unwrap_err();
        assert_eq!(
            err,
            FlowError::Validation(vec!["Please select a destination to continue".to_string()])
        );
        coord.select_destination("dest_002").unwrap();
        assert_eq!(coord.proceed(), Ok(true));
        assert_eq!(coord.step(), Step::ActivityTypes);

        api.push_activities(Ok(suggestions(Some("q-7"), &["act_1"])));
        assert_eq!(coord.proceed(), Ok(true));
        assert_eq!(coord.step(), Step::ActivitySelection);
        coord.settle(Phase::Activities).await;
        coord.toggle_activity("act_1").unwrap();

        api.push_itinerary(Ok(itinerary_result()));
        coord.jump_to(Step::ItinerarySummary);
        assert_eq!(coord.proceed(), Ok(true));
        assert_eq!(coord.step(), Step::ItinerarySummary);
        coord.settle(Phase::Itinerary).await;
        assert_eq!(coord.step(), Step::ItineraryDisplay);
    }

    #[tokio::test]
    async fn test_failed_itinerary_stays_on_summary() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = with_destination(&api, &store).await;

        api.push_activities(Ok(suggestions(Some("q-1"), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        coord.settle(Phase::Activities).await;

        api.push_itinerary(Err(ApiError::network("connection reset")));
        coord.jump_to(Step::ItinerarySummary);
        coord.proceed().unwrap();
        assert_eq!(coord.settle(Phase::Itinerary).await, PhaseStatus::Failed);
        assert_eq!(coord.step(), Step::ItinerarySummary);
        assert_eq!(coord.errors(), ["Network error: connection reset"]);
        assert!(store.get(GENERATED_ITINERARY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edits_refresh_validation_and_date_warnings() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = coordinator(&api, &store).await;

        coord.update_profile(|p| p.age_group = Some(AgeGroup::From35To44));
        assert!(coord.validation_messages().is_empty());
        assert!(coord.advance());
        assert_eq!(coord.step(), Step::TravelDates);

        coord.set_travel_dates("2026-04-10", "2026-04-01");
        assert!(!coord.date_warnings().is_empty());
        assert_eq!(coord.validation_messages(), coord.date_warnings());
        assert!(!coord.advance());

        coord.set_travel_dates("2026-04-01", "2026-04-05");
        assert!(coord.date_warnings().is_empty());
        assert!(coord.advance());

        coord.back();
        assert_eq!(coord.step(), Step::TravelDates);
    }

    #[tokio::test]
    async fn test_date_warnings_follow_edits_on_any_step() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = coordinator(&api, &store).await;

        coord.jump_to(Step::Budget);
        coord.set_travel_dates("2026-04-10", "2026-05-30");
        assert_eq!(
            coord.date_warnings(),
            ["Please select a trip of 10 days or less for the best recommendations"]
        );
        assert!(coord.validation_messages().is_empty());
        assert!(coord.advance());
        assert_eq!(coord.step(), Step::TravelStyle);

        coord.set_travel_dates("2026-04-10", "2026-04-12");
        assert!(coord.date_warnings().is_empty());
    }

    #[tokio::test]
    async fn test_try_apply_completions_does_not_wait() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        api.push_destinations(Ok(three_destinations()));
        let mut coord = coordinator(&api, &store).await;

        assert_eq!(coord.try_apply_completions().await, 0);
        coord.load_destinations().unwrap();
        while coord.pending_calls() > 0 {
            coord.try_apply_completions().await;
            tokio::task::yield_now().await;
        }
        assert_eq!(coord.status(Phase::Destinations), PhaseStatus::Loaded);
    }

    #[tokio::test]
    async fn test_complete_and_rating() {
        let api = Arc::new(MockPlannerApi::new());
        let store = Arc::new(MemoryStore::new());
        let mut coord = coordinator(&api, &store).await;

        coord.set_activity_rating(ActivityCategory::Nightlife, InterestLevel::High);
        assert_eq!(
            coord.itinerary_preferences().rating(ActivityCategory::Nightlife),
            InterestLevel::High
        );

        assert!(!coord.is_completed());
        coord.complete();
        assert!(coord.is_completed());
        coord.reset().await;
        assert!(!coord.is_completed());
    }
    /// Store whose every operation fails
    struct FailingStore;

    fn disk_error() -> StoreError {
        StoreError::Io(std::io::Error::other("disk unavailable"))
    }

    #[async_trait]
    impl ResultStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(disk_error())
        }

        async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
            Err(disk_error())
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(disk_error())
        }
    }

    #[tokio::test]
    async fn test_storage_failures_never_block_phases() {
        let api = Arc::new(MockPlannerApi::new());
        let mut coord = Coordinator::new(api.clone(), Arc::new(FailingStore), CoordinatorConfig::default())
            .await
            .with_today(today());

        for phase in Phase::ALL {
            assert_eq!(coord.status(phase), PhaseStatus::Idle);
        }
        assert!(coord.errors().is_empty());

        api.push_destinations(Ok(three_destinations()));
        coord.load_destinations().unwrap();
        coord.settle(Phase::Destinations).await;
        coord.select_destination("dest_001").unwrap();

        api.push_activities(Ok(suggestions(Some("q-1"), &["act_1"])));
        coord.load_activity_suggestions().unwrap();
        assert_eq!(coord.settle(Phase::Activities).await, PhaseStatus::Loaded);
        assert!(coord.errors().is_empty());

        coord.toggle_activity("act_1").unwrap();
        api.push_itinerary(Ok(itinerary_result()));
        coord.generate_itinerary().unwrap();
        assert_eq!(coord.settle(Phase::Itinerary).await, PhaseStatus::Loaded);
        assert!(coord.errors().is_empty());
        assert_eq!(coord.itinerary(), Some(&itinerary_result()));

        coord.update_profile(|p| p.age_group = Some(AgeGroup::Over65));
        assert!(coord.advance());
        coord.reset().await;
        assert_eq!(coord.step(), Step::TravelerInfo);
        assert!(coord.errors().is_empty());
        for phase in Phase::ALL {
            assert_eq!(coord.status(phase), PhaseStatus::Idle);
        }
    }
}
