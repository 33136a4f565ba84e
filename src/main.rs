use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use learnpulse::config::{ConfigError, FirstTick, PollConfig};
use learnpulse::dashboard::{Dashboard, DashboardError, WidgetSummary};
use learnpulse::fetch::{FetchError, Filters, HttpSource, RecordSource, TimeRange, fetch_records};
use learnpulse::indicator;
use learnpulse::poll::PollSession;
use learnpulse::records::{ActivityItem, LeaderboardEntry, RawRecord, Record, RecordKind, SyncLogEntry};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const RENDER_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid target `{0}`; expected name=url")]
    InvalidTarget(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "learnpulse", about = "Poll dashboard endpoints and report live status")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll one or more endpoints and print status lines until interrupted.
    Watch(WatchCommand),
    /// Fetch one endpoint once and print the normalized records as JSON.
    Fetch(FetchCommand),
}

#[derive(Args, Debug)]
struct WatchCommand {
    /// Widgets as `name=url`.
    #[arg(required = true)]
    targets: Vec<String>,

    #[arg(long, default_value = "raw")]
    kind: RecordKind,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    timing: TimingArgs,
}

#[derive(Args, Debug)]
struct FetchCommand {
    url: String,

    #[arg(long, default_value = "raw")]
    kind: RecordKind,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    timing: TimingArgs,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    #[arg(long)]
    time_range: Option<TimeRange>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Self { time_range: args.time_range, department: args.department, category: args.category }
    }
}

/// Overrides on top of the `LEARNPULSE_*` environment.
#[derive(Args, Debug, Clone, Copy)]
struct TimingArgs {
    #[arg(long)]
    interval_ms: Option<u64>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[arg(long)]
    offline_after_ms: Option<u64>,
    /// Wait one full interval before the first fetch.
    #[arg(long)]
    deferred: bool,
}

impl TimingArgs {
    fn poll_config(self) -> Result<PollConfig, ConfigError> {
        let mut config = PollConfig::from_env()?;
        if let Some(ms) = self.interval_ms {
            config = config.with_interval(Duration::from_millis(ms))?;
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms))?;
        }
        if let Some(ms) = self.offline_after_ms {
            config = config.with_offline_after(Some(Duration::from_millis(ms)));
        }
        if self.deferred {
            config = config.with_first_tick(FirstTick::Deferred);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Watch(watch) => run_watch(watch).await,
        Command::Fetch(fetch) => run_fetch(fetch).await,
    }
}

async fn run_fetch(command: FetchCommand) -> Result<(), CliError> {
    let config = command.timing.poll_config()?;
    let source = HttpSource::new(command.url, config.timeout)?;
    let filters = Filters::from(command.filters);

    let body = match command.kind {
        RecordKind::Leaderboard => fetch_json::<LeaderboardEntry>(&source, &filters, config.timeout).await?,
        RecordKind::Sync => fetch_json::<SyncLogEntry>(&source, &filters, config.timeout).await?,
        RecordKind::Activity => fetch_json::<ActivityItem>(&source, &filters, config.timeout).await?,
        RecordKind::Raw => fetch_json::<RawRecord>(&source, &filters, config.timeout).await?,
    };
    println!("{body}");
    Ok(())
}

async fn fetch_json<R: Record>(source: &HttpSource, filters: &Filters, deadline: Duration) -> Result<String, CliError> {
    let records = fetch_records::<R>(source, filters, deadline).await?;
    Ok(serde_json::to_string_pretty(&records)?)
}

async fn run_watch(command: WatchCommand) -> Result<(), CliError> {
    let config = command.timing.poll_config()?;
    let filters = Filters::from(command.filters);

    let mut dashboard = Dashboard::new();
    for target in &command.targets {
        let (name, url) = parse_target(target)?;
        let source: Arc<dyn RecordSource> = Arc::new(HttpSource::new(url, config.timeout)?);
        start_widget(&mut dashboard, command.kind, name, source, filters.clone(), config)?;
    }
    tracing::info!(widgets = dashboard.len(), kind = %command.kind, "watching");

    let mut ticker = tokio::time::interval(RENDER_PERIOD);
    let mut shown: Vec<WidgetSummary> = Vec::new();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summaries = dashboard.summaries();
                if summaries != shown {
                    let now = OffsetDateTime::now_utc();
                    for summary in &summaries {
                        println!("{}", indicator::render_line(summary, now));
                    }
                    println!();
                    shown = summaries;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    dashboard.stop_all();
    Ok(())
}

fn start_widget(
    dashboard: &mut Dashboard,
    kind: RecordKind,
    name: &str,
    source: Arc<dyn RecordSource>,
    filters: Filters,
    config: PollConfig,
) -> Result<(), DashboardError> {
    match kind {
        RecordKind::Leaderboard => dashboard.add(PollSession::<LeaderboardEntry>::start(name, source, filters, config)),
        RecordKind::Sync => dashboard.add(PollSession::<SyncLogEntry>::start(name, source, filters, config)),
        RecordKind::Activity => dashboard.add(PollSession::<ActivityItem>::start(name, source, filters, config)),
        RecordKind::Raw => dashboard.add(PollSession::<RawRecord>::start(name, source, filters, config)),
    }
}

/// Split `name=url`. Both halves must be non-empty.
fn parse_target(target: &str) -> Result<(&str, &str), CliError> {
    match target.split_once('=') {
        Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => Ok((name.trim(), url.trim())),
        _ => Err(CliError::InvalidTarget(target.to_owned())),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
