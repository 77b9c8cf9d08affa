//! TripPlanner - guided trip planning
//!
//! CLI entry point for checking profiles and running the planning flow.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result, bail, eyre};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use tripplanner::api::create_client;
use tripplanner::cli::{Cli, Command, OutputFormat, get_log_path};
use tripplanner::config::Config;
use tripplanner::coordinator::{Coordinator, Phase, PhaseStatus};
use tripplanner::domain::{ActivitySuggestions, ItineraryPreferences, ItineraryResult, PreferenceProfile};
use tripplanner::steps::{Step, ValidationContext};
use tripplanner::store::{ACTIVITY_SUGGESTIONS_KEY, ALL_KEYS, FileStore, GENERATED_ITINERARY_KEY, ResultStore};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(base_url = %config.api.base_url, store = %config.storage.dir, "tp loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Health) => cmd_health(&config).await,
        Some(Command::Steps) => cmd_steps(),
        Some(Command::Validate { profile, itinerary }) => cmd_validate(&config, &profile, itinerary.as_deref()),
        Some(Command::Plan {
            profile,
            itinerary,
            destination,
            activities,
            format,
        }) => cmd_plan(&config, &profile, itinerary.as_deref(), destination, activities, format).await,
        Some(Command::Status { format }) => cmd_status(&config, format).await,
        Some(Command::Reset) => cmd_reset(&config).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!(?path, "read_yaml: called");
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))
}

fn read_itinerary_preferences(path: Option<&Path>) -> Result<ItineraryPreferences> {
    match path {
        Some(path) => read_yaml(path),
        None => Ok(ItineraryPreferences::default()),
    }
}

async fn cmd_health(config: &Config) -> Result<()> {
    debug!("cmd_health: called");
    config.validate()?;
    let api = create_client(&config.api)?;

    if api.health_check().await? {
        println!("{} {}", "✓".green(), format!("Service at {} is healthy", config.api.base_url));
        Ok(())
    } else {
        println!("{} {}", "✗".red(), format!("Service at {} is not healthy", config.api.base_url));
        bail!("Health check failed")
    }
}

fn cmd_steps() -> Result<()> {
    debug!("cmd_steps: called");
    for (i, step) in Step::ALL.iter().enumerate() {
        println!(
            "{:>2}. {:<20} {:>4.0}%  {}",
            i + 1,
            step.as_str(),
            step.progress() * 100.0,
            step.title().dimmed()
        );
    }
    Ok(())
}

/// Questionnaire problems per step, before any session exists
///
/// Selection steps depend on a live session, so they count as satisfied.
/// Itinerary steps are only checked when their preferences were given.
fn questionnaire_problems(
    config: &Config,
    profile: &PreferenceProfile,
    prefs: &ItineraryPreferences,
    with_itinerary: bool,
) -> Vec<(Step, Vec<String>)> {
    let ctx = ValidationContext::new(profile, prefs, Local::now().date_naive())
        .with_max_trip_days(config.coordinator.max_trip_days)
        .with_destination_selected(true)
        .with_selected_activities(1);
    let last = if with_itinerary { Step::last() } else { Step::Summary };

    Step::ALL
        .into_iter()
        .filter(|step| *step <= last)
        .map(|step| (step, step.validate(&ctx)))
        .filter(|(_, messages)| !messages.is_empty())
        .collect()
}

fn cmd_validate(config: &Config, profile_path: &Path, itinerary_path: Option<&Path>) -> Result<()> {
    debug!(?profile_path, ?itinerary_path, "cmd_validate: called");
    let profile: PreferenceProfile = read_yaml(profile_path)?;
    let prefs = read_itinerary_preferences(itinerary_path)?;

    let mut problems = 0;
    for (step, messages) in questionnaire_problems(config, &profile, &prefs, itinerary_path.is_some()) {
        problems += messages.len();
        println!("{}", step.title().bold());
        for message in messages {
            println!("  {} {}", "✗".red(), message);
        }
    }

    if problems > 0 {
        bail!("{} validation problem(s) in {}", problems, profile_path.display());
    }
    println!("{} {}", "✓".green(), "Profile is valid");
    Ok(())
}

/// Wait for a phase and turn a failure into an error carrying its messages
async fn run_phase(coord: &mut Coordinator, phase: Phase) -> Result<()> {
    match coord.settle(phase).await {
        PhaseStatus::Loaded => Ok(()),
        status => bail!("{} phase {}: {}", phase, status, coord.errors().join("; ")),
    }
}

async fn cmd_plan(
    config: &Config,
    profile_path: &Path,
    itinerary_path: Option<&Path>,
    destination: usize,
    activities: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    debug!(?profile_path, destination, ?activities, %format, "cmd_plan: called");
    let profile: PreferenceProfile = read_yaml(profile_path)?;
    let prefs = read_itinerary_preferences(itinerary_path)?;

    let problems: Vec<String> = questionnaire_problems(config, &profile, &prefs, itinerary_path.is_some())
        .into_iter()
        .flat_map(|(_, messages)| messages)
        .collect();
    if !problems.is_empty() {
        bail!(
            "{} is not ready for planning: {}",
            profile_path.display(),
            problems.join("; ")
        );
    }
    config.validate()?;

    let api = create_client(&config.api)?;
    let store = Arc::new(FileStore::new(&config.storage.dir));
    let mut coord = Coordinator::new(api, store, config.coordinator.clone()).await;
    coord.set_profile(profile);
    coord.set_itinerary_preferences(prefs);

    coord.load_destinations()?;
    run_phase(&mut coord, Phase::Destinations).await?;
    let recommendations = coord.destinations().unwrap_or_default();
    if format == OutputFormat::Text {
        println!("{}", "Recommended destinations".bold());
        for (i, d) in recommendations.iter().enumerate() {
            println!("  {}. {} ({}% match, ~{})", i + 1, d.name, d.match_score, d.estimated_cost);
        }
    }
    let chosen = destination
        .checked_sub(1)
        .and_then(|i| recommendations.get(i))
        .map(|d| d.id.clone())
        .ok_or_else(|| {
            eyre!(
                "Destination {} is not among the {} recommendations",
                destination,
                recommendations.len()
            )
        })?;
    coord.select_destination(&chosen)?;

    coord.load_activity_suggestions()?;
    run_phase(&mut coord, Phase::Activities).await?;
    let picked: Vec<String> = coord
        .activity_suggestions()
        .map(|s| {
            s.activities
                .iter()
                .take(activities.unwrap_or(usize::MAX))
                .map(|a| a.id.clone())
                .collect()
        })
        .unwrap_or_default();
    if picked.is_empty() {
        bail!("No activities were suggested for {}", chosen);
    }
    coord.select_activities(&picked)?;

    coord.generate_itinerary()?;
    run_phase(&mut coord, Phase::Itinerary).await?;
    coord.complete();

    let result = coord
        .itinerary()
        .ok_or_else(|| eyre!("Itinerary phase finished without a result"))?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "destination": coord.selected_destination(),
                "selected_activities": coord.selected_activities(),
                "itinerary": result,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!();
            print_itinerary(result);
        }
    }
    Ok(())
}

fn print_itinerary(result: &ItineraryResult) {
    let itinerary = &result.itinerary;
    println!(
        "{}",
        format!(
            "Itinerary for {} ({} days)",
            itinerary.destination_name, itinerary.total_days
        )
        .bright_cyan()
        .bold()
    );
    for day in &itinerary.daily_schedules {
        println!();
        println!("{}", format!("Day {} ({}): {}", day.day_number, day.date, day.theme).bold());
        for activity in &day.activities {
            println!(
                "  {}-{}  {} {}",
                activity.start_time,
                activity.end_time,
                activity.activity_name,
                format!("[{}]", activity.activity_type).dimmed()
            );
            if let Some(notes) = activity.notes.as_deref().filter(|n| !n.is_empty()) {
                println!("               {}", notes.dimmed());
            }
        }
        println!("  {}", format!("Cost {:.2}, walking {}", day.daily_cost, day.walking_distance).dimmed());
    }
    if let Some(summary) = &result.summary {
        println!();
        println!(
            "Total cost {:.2} across {} activities (optimization {:.0}%)",
            summary.total_cost,
            summary.total_activities,
            summary.optimization_score * 100.0
        );
    }
}

async fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_status: called");
    let store = FileStore::new(&config.storage.dir);

    let suggestions: Option<ActivitySuggestions> = match store.get(ACTIVITY_SUGGESTIONS_KEY).await? {
        Some(bytes) => serde_json::from_slice(&bytes).ok(),
        None => None,
    };
    let itinerary: Option<ItineraryResult> = match store.get(GENERATED_ITINERARY_KEY).await? {
        Some(bytes) => serde_json::from_slice(&bytes).ok(),
        None => None,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "store": store.path(),
                "activity_suggestions": suggestions,
                "generated_itinerary": itinerary,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Store: {}", store.path().display());
            match &suggestions {
                Some(s) => println!(
                    "Activity suggestions: {} (questionnaire {})",
                    s.activities.len(),
                    s.correlation_id().unwrap_or("-")
                ),
                None => println!("Activity suggestions: {}", "none".dimmed()),
            }
            match &itinerary {
                Some(result) => print_itinerary(result),
                None => println!("Generated itinerary: {}", "none".dimmed()),
            }
        }
    }
    Ok(())
}

async fn cmd_reset(config: &Config) -> Result<()> {
    debug!("cmd_reset: called");
    let store = FileStore::new(&config.storage.dir);
    for key in ALL_KEYS {
        store.remove(key).await?;
    }
    info!(store = ?store.path(), "cmd_reset: cleared saved results");
    println!("Cleared saved results in {}", store.path().display());
    Ok(())
}
