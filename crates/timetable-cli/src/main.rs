use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use timetable_engine::{
    parity_for_date, DayAliases, DayResolver, EngineConfig, GroupTimetable, ParityAliases,
    ParityResolution, ParityResolver, ScheduleFeed, ScheduleQuery, WeekParity,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Query a university timetable feed", long_about = None)]
struct Cli {
    /// Feed JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    feed: String,

    /// Engine config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First day of week 1 (YYYY-MM-DD)
    #[arg(long, env = "TIMETABLE_SEMESTER_START")]
    semester_start: Option<NaiveDate>,

    /// Nearest-lesson lookahead horizon in minutes
    #[arg(long)]
    lookahead_minutes: Option<u32>,

    /// Reference instant (YYYY-MM-DDTHH:MM); defaults to the local clock
    #[arg(long, value_parser = parse_instant)]
    at: Option<NaiveDateTime>,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lessons for today (any parity if nothing matches the current week)
    Today { group: String },
    /// Lessons for the next teaching day
    Tomorrow { group: String },
    /// The current week's lessons, grouped by day
    Week { group: String },
    /// Lessons for a day and week given in free form
    Day {
        /// Day: 0-6, monday, понедельник, пн, mon, ...
        day: String,
        /// Week: 1, 2, odd, even, нечет, чет, ...
        week: String,
        group: String,
    },
    /// The nearest upcoming lesson
    Near { group: String },
    /// List the groups present in the feed
    Groups,
    /// Normalize a week parity expression
    Parity {
        /// Omit to print the reference week's parity
        expression: Option<String>,
    },
    /// Normalize a day expression
    ResolveDay { expression: String },
}

#[derive(Serialize)]
struct ParityOutput<'a> {
    date: NaiveDate,
    current: WeekParity,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<ParityResolution>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    // The clock is read exactly once per invocation.
    let now = cli.at.unwrap_or_else(|| Local::now().naive_local());
    debug!(%now, semester_start = %config.semester_start, "resolved reference instant");

    match &cli.command {
        Commands::Today { group } => print_json(&timetable(&cli, group, &config)?.today(now)),
        Commands::Tomorrow { group } => {
            print_json(&timetable(&cli, group, &config)?.tomorrow(now))
        }
        Commands::Week { group } => print_json(&timetable(&cli, group, &config)?.week(now)),
        Commands::Day { day, week, group } => {
            let query = ScheduleQuery::new(group.as_str())
                .with_day(day.as_str())
                .with_week(week.as_str());
            print_json(&timetable(&cli, group, &config)?.select(&query, now))
        }
        Commands::Near { group } => print_json(&timetable(&cli, group, &config)?.nearest(now)),
        Commands::Groups => {
            let feed = read_feed(&cli.feed)?;
            print_json(&feed.group_ids().collect::<Vec<_>>())
        }
        Commands::Parity { expression } => {
            let current = parity_for_date(now.date(), config.semester_start);
            let resolution = expression.as_deref().map(|e| {
                ParityResolver::new(ParityAliases::global(), config.semester_start)
                    .classify(e, now.date())
            });
            print_json(&ParityOutput {
                date: now.date(),
                current,
                code: current.code(),
                resolution,
            })
        }
        Commands::ResolveDay { expression } => {
            print_json(&DayResolver::new(DayAliases::global()).classify(expression))
        }
    }
}

/// `-v` overrides `RUST_LOG`, which overrides `LOG_LEVEL`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        crate_filter("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            crate_filter(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()))
        })
    };

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("timetable_engine={level},timetable={level}"))
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(start) = cli.semester_start {
        config.semester_start = start;
    }
    if let Some(minutes) = cli.lookahead_minutes {
        config.lookahead_minutes = minutes;
    }
    Ok(config)
}

fn read_feed(source: &str) -> Result<ScheduleFeed> {
    let text = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading feed from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("reading feed {source}"))?
    };
    Ok(ScheduleFeed::from_json(&text)?)
}

fn timetable(cli: &Cli, group: &str, config: &EngineConfig) -> Result<GroupTimetable> {
    let feed = read_feed(&cli.feed)?;
    Ok(GroupTimetable::from_feed(&feed, group, config.clone())?)
}

fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{s}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
