//! CLI entry point for the transit insights dashboard.
//!
//! Loads the ridership and performance tables once, runs the transform for
//! the selected view, and prints the derived table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_insights::{
    config::DashboardConfig,
    loader::{load_performance, load_ridership},
    output::{print_json, print_pretty, write_csv},
    overview::{describe, overview},
    transforms::{
        delay::enrich_trips,
        performance::{
            daily_trend, delay_distribution, delays_by_day_name, filter_metro_area, hourly_delays,
            regional_kpis, route_detail, summarize_clusters, summarize_routes, worst_routes,
        },
        region::{GroupDimension, Period, SortOrder, aggregate_regions},
        reshape::reshape_passengers,
        time_bucket::bucket_trips,
        types::{RouteStatRow, TripPerformance},
        variation::{demand_all_days, demand_by_time_range, demand_vs_trips},
    },
    vocab::{DayType, MetroArea},
};

#[derive(Parser)]
#[command(name = "transit_insights")]
#[command(about = "Demand, supply and punctuality views over public-transit data", long_about = None)]
struct Cli {
    /// JSON config file (defaults come from the environment)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Ridership CSV (overrides config)
    #[arg(long, global = true)]
    ridership: Option<PathBuf>,

    /// Performance CSV (overrides config)
    #[arg(long, global = true)]
    performance: Option<PathBuf>,

    /// Print derived tables as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Also write the derived table to this CSV file
    #[arg(long, global = true)]
    csv: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Network totals and service coverage ratio
    Overview {
        /// Ridership column to summarize (e.g. "DailyPassengers")
        #[arg(long = "describe")]
        column: Option<String>,
    },
    /// Demand vs. supply share per metro area or cluster
    DemandSupply {
        /// weekly or daily
        #[arg(short, long, default_value = "weekly")]
        period: Period,

        /// metro or cluster
        #[arg(short, long, default_value = "metro")]
        group_by: GroupDimension,

        /// supply, demand or name
        #[arg(short, long, default_value = "supply")]
        sort: SortOrder,
    },
    /// Passenger demand through the day
    Variation {
        /// all, workday, friday or saturday
        #[arg(short, long, default_value = "all")]
        day: String,

        /// Show trips per day next to passengers (single day only)
        #[arg(long, default_value_t = false)]
        show_trips: bool,
    },
    /// Routes with the largest average delay
    WorstRoutes {
        #[arg(short, long, default_value_t = 50)]
        min_trips: usize,

        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Drill into one line id
        #[arg(short, long)]
        route: Option<String>,
    },
    /// Delays by hour, category, day of week and date
    TimePatterns,
    /// Per-cluster delays and KPIs for one metro area
    Regional {
        /// center, north, south, inter-city or all
        #[arg(short, long, default_value = "all")]
        area: String,

        #[arg(short, long, default_value_t = 5.0)]
        delay_threshold: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/transit_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::from_env()?,
    };
    if let Some(path) = &cli.ridership {
        config.ridership_path = path.clone();
    }
    if let Some(path) = &cli.performance {
        config.performance_path = path.clone();
    }

    let sink = Sink {
        json: cli.json,
        csv: cli.csv,
    };

    match cli.command {
        Commands::Overview { column } => show_overview(&config, &sink, column.as_deref())?,
        Commands::DemandSupply {
            period,
            group_by,
            sort,
        } => show_demand_supply(&config, &sink, period, group_by, sort)?,
        Commands::Variation { day, show_trips } => {
            let day = parse_or_all::<DayType>(&day)?;
            show_variation(&config, &sink, day, show_trips)?
        }
        Commands::WorstRoutes {
            min_trips,
            top,
            route,
        } => show_worst_routes(&config, &sink, min_trips, top, route.as_deref())?,
        Commands::TimePatterns => show_time_patterns(&config, &sink)?,
        Commands::Regional {
            area,
            delay_threshold,
        } => {
            let area = parse_or_all::<MetroArea>(&area)?;
            show_regional(&config, &sink, area, delay_threshold)?
        }
    }

    Ok(())
}

/// Where derived tables go: the log (debug or JSON) and optionally a CSV file.
struct Sink {
    json: bool,
    csv: Option<String>,
}

impl Sink {
    fn emit<T: Serialize + Debug>(&self, rows: &[T]) -> Result<()> {
        self.show(rows)?;
        if let Some(path) = &self.csv {
            write_csv(path, rows)?;
            info!(path = %path, rows = rows.len(), "CSV written");
        }
        Ok(())
    }

    fn show<T: Serialize + Debug + ?Sized>(&self, value: &T) -> Result<()> {
        if self.json {
            print_json(value)
        } else {
            print_pretty(value);
            Ok(())
        }
    }
}

fn parse_or_all<T>(value: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        Ok(Some(value.parse()?))
    }
}

fn load_trips(config: &DashboardConfig) -> Result<Vec<TripPerformance>> {
    let records = load_performance(&config.performance_path)?;
    let enrichment = enrich_trips(&records);
    info!(
        trips = enrichment.trips.len(),
        excluded = enrichment.excluded.len(),
        "Delays derived"
    );
    Ok(enrichment.trips)
}

#[tracing::instrument(skip(config, sink))]
fn show_overview(config: &DashboardConfig, sink: &Sink, column: Option<&str>) -> Result<()> {
    let table = load_ridership(&config.ridership_path)?;
    let summary = overview(&table.records);
    sink.emit(std::slice::from_ref(&summary))?;

    if let Some(column) = column {
        let values = table
            .column_values(column)
            .with_context(|| format!("no numeric ridership column '{column}'"))?;
        sink.show(&describe(&values))?;
    }

    Ok(())
}

#[tracing::instrument(skip(config, sink))]
fn show_demand_supply(
    config: &DashboardConfig,
    sink: &Sink,
    period: Period,
    group_by: GroupDimension,
    sort: SortOrder,
) -> Result<()> {
    let table = load_ridership(&config.ridership_path)?;
    let groups = aggregate_regions(&table.records, group_by, period, sort);
    info!(
        dimension = group_by.label(),
        groups = groups.len(),
        "Demand vs supply computed"
    );
    sink.emit(&groups)
}

#[tracing::instrument(skip(config, sink))]
fn show_variation(
    config: &DashboardConfig,
    sink: &Sink,
    day: Option<DayType>,
    show_trips: bool,
) -> Result<()> {
    let table = load_ridership(&config.ridership_path)?;
    let passengers = reshape_passengers(&table)?;

    match day {
        None => {
            if show_trips {
                warn!("Trip counts are only shown for a single day type");
            }
            sink.emit(&demand_all_days(&passengers))
        }
        Some(day) if show_trips => {
            let records = load_performance(&config.performance_path)?;
            let buckets = bucket_trips(&records)?;
            info!(
                buckets = buckets.counts.len(),
                excluded = buckets.excluded.len(),
                "Trips bucketed"
            );
            sink.emit(&demand_vs_trips(
                &passengers,
                &buckets.counts,
                day,
                config.observation_days,
            ))
        }
        Some(day) => sink.emit(&demand_by_time_range(&passengers, day)),
    }
}

#[tracing::instrument(skip(config, sink))]
fn show_worst_routes(
    config: &DashboardConfig,
    sink: &Sink,
    min_trips: usize,
    top: usize,
    route: Option<&str>,
) -> Result<()> {
    let trips = load_trips(config)?;
    let worst = worst_routes(&summarize_routes(&trips), min_trips, top);

    if worst.is_empty() {
        info!(min_trips, "No route meets the minimum trip count");
    }
    let rows: Vec<RouteStatRow> = worst.into_iter().map(RouteStatRow::from).collect();
    sink.emit(&rows)?;

    if let Some(line_id) = route {
        match route_detail(&trips, line_id) {
            Some(detail) => sink.show(&detail)?,
            None => warn!(line_id, "Route has no trips"),
        }
    }

    Ok(())
}

#[tracing::instrument(skip(config, sink))]
fn show_time_patterns(config: &DashboardConfig, sink: &Sink) -> Result<()> {
    let trips = load_trips(config)?;

    sink.emit(&hourly_delays(&trips))?;
    sink.show(&delay_distribution(&trips))?;
    sink.show(&delays_by_day_name(&trips)?)?;
    sink.show(&daily_trend(&trips))?;

    Ok(())
}

#[tracing::instrument(skip(config, sink))]
fn show_regional(
    config: &DashboardConfig,
    sink: &Sink,
    area: Option<MetroArea>,
    delay_threshold: f64,
) -> Result<()> {
    let trips = filter_metro_area(&load_trips(config)?, area);
    info!(
        area = area.map_or("All", MetroArea::label),
        trips = trips.len(),
        "Regional performance"
    );

    sink.emit(&summarize_clusters(&trips))?;
    sink.show(&regional_kpis(&trips, delay_threshold))?;

    Ok(())
}
