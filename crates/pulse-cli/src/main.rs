//! Terminal front-end for the Pulse engine.
//!
//! Owns the application context for the duration of the run: logs in
//! against the mock backend, prints the fetched series for the chosen
//! range, follows a few live ticks, and shuts the engine down. State
//! (session, preferences) persists under the platform config directory
//! exactly as it would for a graphical front-end.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tokio::time::timeout;

use pulse_application::AppContext;
use pulse_core::auth::Credentials;
use pulse_core::metrics::{DataPoint, DateRange, Section};
use pulse_infrastructure::{FileSnapshotStore, MockBackend, load_config};

const FETCH_WAIT: Duration = Duration::from_secs(10);

fn parse_range(value: &str) -> Result<DateRange, String> {
    DateRange::from_str(value).map_err(|_| format!("unknown range '{value}' (week|month|year)"))
}

/// Pulse analytics dashboard, terminal edition.
#[derive(Parser, Debug)]
#[command(name = "pulse", version, about)]
struct Args {
    /// Email to log in with (the mock backend knows
    /// john.doe@example.com and jane.smith@example.com).
    #[arg(long, default_value = "john.doe@example.com")]
    email: String,

    /// Date range to chart: week, month or year.
    #[arg(long, value_parser = parse_range, default_value = "month")]
    range: DateRange,

    /// Number of live updates to follow before exiting.
    #[arg(long, default_value_t = 3)]
    ticks: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = load_config();

    let backend = Arc::new(MockBackend::from_config(&config));
    let store = Arc::new(FileSnapshotStore::new().context("cannot resolve snapshot directory")?);
    let context = AppContext::bootstrap(backend, store, &config).await;

    // ===== Login =====
    let session = context.auth().current();
    if session.authenticated {
        let name = session.user.map(|user| user.name).unwrap_or_default();
        println!("{} {}", "Restored session for".dimmed(), name.bold());
    } else {
        println!("{} {}", "Logging in as".dimmed(), args.email.bold());
        if !context.auth().login(&Credentials::new(&args.email)).await {
            let message = context
                .auth()
                .current()
                .error
                .unwrap_or_else(|| "login failed".to_string());
            context.shutdown().await;
            bail!("{message}");
        }
    }

    // ===== First load for the requested range =====
    context.prefs().set_date_range(args.range);
    let mut refresh = context.refresh().subscribe();
    let days = args.range.days();

    let mut attempts = 0;
    loop {
        let state = timeout(
            FETCH_WAIT,
            refresh.wait_for(|s| !s.loading && (s.is_errored() || s.data.len() == days)),
        )
        .await
        .context("fetch timed out")?
        .context("refresh state dropped")?
        .clone();

        match state.error {
            Some(message) => {
                // The upstream is deliberately flaky; retry by hand the
                // way a user would press the retry button.
                attempts += 1;
                if attempts >= 5 {
                    context.shutdown().await;
                    bail!("giving up after {attempts} failed fetches: {message}");
                }
                eprintln!("{} {}", "fetch failed:".red(), message);
                eprintln!("{}", "retrying...".dimmed());
                context.refresh().refetch();
            }
            None => {
                print_series_summary(args.range, &state.data, context.prefs().current());
                break;
            }
        }
    }

    // ===== Live feed =====
    if args.ticks > 0 {
        println!();
        println!(
            "{}",
            format!("Following {} live updates...", args.ticks).dimmed()
        );
        refresh.mark_unchanged();
        for _ in 0..args.ticks {
            if refresh.changed().await.is_err() {
                break;
            }
            let state = refresh.borrow_and_update().clone();
            if let Some(last) = state.data.last() {
                print_live_point(last);
            }
        }
    }

    context.shutdown().await;
    Ok(())
}

fn print_series_summary(
    range: DateRange,
    data: &[DataPoint],
    prefs: pulse_core::prefs::DashboardPreferences,
) {
    println!();
    println!(
        "{} {} {}",
        "Dashboard".bold(),
        format!("({range})").dimmed(),
        format!("[{} points]", data.len()).dimmed()
    );

    let sales: u64 = data.iter().map(|p| p.sales).sum();
    let users: u64 = data.iter().map(|p| p.users).sum();
    let page_views: u64 = data.iter().map(|p| p.page_views).sum();

    for section in Section::ALL {
        let visible = prefs.is_visible(section);
        let marker = if visible { "●".green() } else { "○".dimmed() };
        let chart = prefs.chart_type(section);
        let total = match section {
            Section::Sales => sales,
            Section::Users => users,
            Section::Traffic => page_views,
        };
        println!("  {marker} {:<8} {:>10}  {}", section.to_string(), total, format!("{chart} chart").dimmed());
    }

    if let (Some(first), Some(last)) = (data.first(), data.last()) {
        println!("  {} {} {} {}", "from".dimmed(), first.date, "to".dimmed(), last.date);
    }
}

fn print_live_point(point: &DataPoint) {
    println!(
        "  {} {}  sales {:>5}  users {:>4}  views {:>6}",
        "tick".cyan(),
        point.date,
        point.sales,
        point.users,
        point.page_views
    );
}
