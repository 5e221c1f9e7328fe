//! CLI Command Handlers
//!
//! Every handler drives the same `SessionController` the TUI uses, then
//! waits for it to settle and prints the resulting channel state.
//! Each handler takes CLI args, the session and Output, returns ExitCode.

use serde::Serialize;
use std::time::Duration;

use crate::api::{ErrorInfo, ErrorKind};
use crate::cli::{
    ExitCode, InfoCmd, Output, RecommendCmd, RegionAction, RegionCmd, RegionEntry, SearchCmd,
    StreamingCmd, TrendingCmd,
};
use crate::config::Config;
use crate::models::{
    OfferCategory, Recommendations, Region, StreamingAvailability, Title, TitleSummary,
};
use crate::session::debounce::MIN_QUERY_LEN;
use crate::session::{
    AvailabilityView, ChannelState, DetailView, FileRegionStorage, GeoOutcome,
    MemoryRegionStorage, RegionStore, SessionController,
};

// =============================================================================
// Session Setup
// =============================================================================

/// Region store for this run. An explicit region is held in memory only so a
/// one-off `--region` never overwrites the saved preference.
pub fn region_store(region: Option<Region>) -> RegionStore {
    match region {
        Some(region) => RegionStore::new(Box::new(MemoryRegionStorage::new(Some(region)))),
        None => match FileRegionStorage::default_path() {
            Some(path) => RegionStore::new(Box::new(FileRegionStorage::new(path))),
            None => RegionStore::in_memory(),
        },
    }
}

/// Build a session for one-shot commands. Typing is not involved, so the
/// debounce window is skipped.
pub fn open_session(config: &Config, regions: RegionStore) -> anyhow::Result<SessionController> {
    let catalog = config.catalog()?;
    Ok(SessionController::new(catalog, regions).with_debounce_window(Duration::ZERO))
}

/// Map a failed request to a scripting exit code
pub fn exit_code_for(error: &ErrorInfo) -> ExitCode {
    match error.kind {
        ErrorKind::NotFound => ExitCode::NotFound,
        ErrorKind::Network => ExitCode::NetworkError,
        ErrorKind::Unauthorized | ErrorKind::InvalidResponse => ExitCode::Error,
    }
}

fn print_or_fail<T: Serialize>(output: &Output, data: T, human: impl FnOnce(&T) -> String) -> ExitCode {
    match output.print(data, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn print_titles(
    state: &ChannelState<Vec<TitleSummary>>,
    limit: usize,
    context: &str,
    output: &Output,
) -> ExitCode {
    if let Some(error) = &state.error {
        return output.error(format!("{}: {}", context, error), exit_code_for(error));
    }
    let mut titles = state.data.clone().unwrap_or_default();
    titles.truncate(limit);
    print_or_fail(output, titles, |titles| render_titles(titles))
}

// =============================================================================
// Search Command
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    let query = cmd.query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return output.error(
            format!("Query must be at least {} characters", MIN_QUERY_LEN),
            ExitCode::InvalidArgs,
        );
    }

    output.info(format!("Searching for: {}", query));
    session.submit_query(query);
    session.settle().await;

    print_titles(session.search(), cmd.limit, "Search failed", output)
}

// =============================================================================
// Trending Command
// =============================================================================

pub async fn trending_cmd(cmd: TrendingCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    output.info("Fetching trending this week...");
    session.open_home();
    session.settle().await;

    print_titles(session.trending(), cmd.limit, "Trending fetch failed", output)
}

// =============================================================================
// Info Command
// =============================================================================

/// Title plus availability as printed by `info`
#[derive(Debug, Serialize)]
pub struct TitleInfo {
    pub title: Title,
    pub availability: Option<StreamingAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_error: Option<String>,
}

pub async fn info_cmd(cmd: InfoCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    output.info(format!("Getting info for {} in {}", cmd.id, session.region()));
    session.open_detail(cmd.id);
    session.settle().await;

    let info = match session.detail() {
        DetailView::Ready {
            title,
            availability,
        } => match availability {
            AvailabilityView::Available(a) => TitleInfo {
                title: title.clone(),
                availability: Some(a.clone()),
                availability_error: None,
            },
            AvailabilityView::Unavailable { reason, .. } => TitleInfo {
                title: title.clone(),
                availability: None,
                availability_error: Some(
                    reason
                        .map(|r| r.message.clone())
                        .unwrap_or_else(|| "no availability data".into()),
                ),
            },
        },
        DetailView::Failed(Some(error)) => {
            return output.error(format!("Movie info failed: {}", error), exit_code_for(error))
        }
        DetailView::Failed(None) | DetailView::Loading | DetailView::Closed => {
            return output.error("Movie info failed", ExitCode::Error)
        }
    };

    let region = session.region();
    print_or_fail(output, info, |info| {
        let mut text = render_title(&info.title);
        text.push('\n');
        match &info.availability {
            Some(a) => text.push_str(&render_availability(a)),
            None => text.push_str(&format!("Where to watch in {}: unavailable", region.name())),
        }
        text
    })
}

// =============================================================================
// Streaming Command
// =============================================================================

pub async fn streaming_cmd(cmd: StreamingCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    output.info(format!("Checking availability of {} in {}", cmd.id, session.region()));
    session.open_detail(cmd.id);
    session.settle().await;

    let state = session.detail_streaming();
    if let Some(error) = &state.error {
        return output.error(format!("Availability lookup failed: {}", error), exit_code_for(error));
    }
    match state.data.clone() {
        Some(availability) => print_or_fail(output, availability, render_availability),
        None => output.error("Availability lookup failed", ExitCode::Error),
    }
}

// =============================================================================
// Recommend Command
// =============================================================================

pub async fn recommend_cmd(cmd: RecommendCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    output.info(format!("Finding titles similar to {}", cmd.id));
    session.open_recommendations(cmd.id);
    session.settle().await;

    let state = session.recommendations();
    if let Some(error) = &state.error {
        return output.error(format!("Recommendations failed: {}", error), exit_code_for(error));
    }
    let Some(mut recommendations) = state.data.clone() else {
        return output.error("Recommendations failed", ExitCode::Error);
    };
    recommendations.titles.truncate(cmd.limit);

    print_or_fail(output, recommendations, |r: &Recommendations| {
        format!(
            "Because you looked at {}:\n{}",
            r.source,
            render_titles(&r.titles)
        )
    })
}

// =============================================================================
// Region Command
// =============================================================================

impl From<Region> for RegionEntry {
    fn from(region: Region) -> Self {
        Self {
            code: region.code().to_string(),
            name: region.name().to_string(),
        }
    }
}

fn render_region(entry: &RegionEntry) -> String {
    format!("{} ({})", entry.code, entry.name)
}

pub async fn region_cmd(cmd: RegionCmd, session: &mut SessionController, output: &Output) -> ExitCode {
    match cmd.action {
        RegionAction::Get => {
            if !session.regions().has_persisted() {
                output.info("No region saved yet, using the default");
            }
            print_or_fail(output, RegionEntry::from(session.region()), render_region)
        }
        RegionAction::Set { code } => match session.set_region(&code) {
            Ok(region) => {
                output.info(format!("Region set to {}", region.name()));
                print_or_fail(output, RegionEntry::from(region), render_region)
            }
            Err(e) => output.error(e.to_string(), ExitCode::InvalidArgs),
        },
        RegionAction::List => {
            let entries: Vec<RegionEntry> = Region::all().map(RegionEntry::from).collect();
            print_or_fail(output, entries, |entries| {
                entries
                    .iter()
                    .map(render_region)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RegionAction::Detect => {
            if !session.start() {
                output.info("A region is already saved; use `region set` to change it");
                return print_or_fail(output, RegionEntry::from(session.region()), render_region);
            }
            output.info("Detecting region from IP address...");
            session.settle().await;

            match session.geo_outcome() {
                Some(GeoOutcome::Failed(msg)) => output.error(
                    format!("Region detection failed: {}", msg),
                    ExitCode::NetworkError,
                ),
                Some(GeoOutcome::Unsupported(code)) => output.error(
                    format!("Detected region {} is not supported", code),
                    ExitCode::Error,
                ),
                _ => print_or_fail(output, RegionEntry::from(session.region()), render_region),
            }
        }
    }
}

// =============================================================================
// Text Rendering
// =============================================================================

fn render_titles(titles: &[TitleSummary]) -> String {
    if titles.is_empty() {
        return "No results found".to_string();
    }
    titles
        .iter()
        .map(|t| format!("{:>8}  {}", t.id, t))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_title(title: &Title) -> String {
    let mut lines = vec![title.to_string()];
    if let Some(tagline) = title.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("\"{}\"", tagline));
    }
    let genres = title.genre_names();
    if !genres.is_empty() {
        lines.push(genres.join(", "));
    }
    if let Some(overview) = title.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(String::new());
        lines.push(overview.to_string());
    }
    lines.join("\n")
}

fn render_availability(availability: &StreamingAvailability) -> String {
    let mut lines = vec![format!("Where to watch in {}:", availability.region.name())];
    if availability.is_empty() {
        lines.push("  Not available to stream, rent or buy".to_string());
    }
    for category in OfferCategory::ALL {
        let offers = availability.offers(category);
        if offers.is_empty() {
            continue;
        }
        let names: Vec<&str> = offers.iter().map(|o| o.provider_name.as_str()).collect();
        lines.push(format!("  {:<6} {}", category.to_string(), names.join(", ")));
    }
    if let Some(link) = &availability.external_link {
        lines.push(format!("  More: {}", link));
    }
    lines.join("\n")
}
