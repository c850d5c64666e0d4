//! DSO planner command-line runner.
//!
//! Plans one night for a list of targets, or produces a month-by-month
//! overview for each target over a year. Results are printed as JSON on
//! stdout; progress goes to the log.
//!
//! # Usage
//!
//! ```bash
//! # Tonight at the configured site, every catalog target
//! cargo run --bin dso-planner
//!
//! # A given night in Windhoek, only targets clear of the Moon in the south
//! DSO_PLANNER_SITE=windhoek DSO_PLANNER_DATE=01.06.2025 \
//!   DSO_PLANNER_MOON=1 DSO_PLANNER_DIRECTION=S cargo run --bin dso-planner
//!
//! # Yearly overview of two targets
//! DSO_PLANNER_MODE=yearly DSO_PLANNER_YEAR=2025 DSO_PLANNER_TARGETS="M31,M42" \
//!   cargo run --bin dso-planner
//! ```
//!
//! # Environment Variables
//!
//! - `DSO_PLANNER_CONFIG`: Path to a TOML config file
//! - `DSO_PLANNER_SITE`: Site preset (`frankfurt`, `windhoek`)
//! - `DSO_PLANNER_MODE`: `tonight` (default) or `yearly`
//! - `DSO_PLANNER_DATE`: Night to plan, `dd.mm.yyyy` or `yyyy-mm-dd` (default: today)
//! - `DSO_PLANNER_TARGETS`: Comma-separated target names (default: whole catalog)
//! - `DSO_PLANNER_YEAR`: Year for the yearly overview (default: current year)
//! - `DSO_PLANNER_MOON`: Only keep targets with an acceptable Moon
//! - `DSO_PLANNER_TOP_ONLY`: Only keep targets with the Moon below the horizon
//! - `DSO_PLANNER_DIRECTION`: Only keep targets peaking in this compass direction
//! - `RUST_LOG`: Log level (default: info)

use std::env;

use anyhow::Context;
use chrono::{Datelike, Utc};
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dso_planner::api::{ClassificationFilter, MoonFilter, NightClassification, ObservationResult, PlannerConfig};
use dso_planner::models::parse_civil_date;
use dso_planner::services::{Planner, YearlyBestFinder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let config = PlannerConfig::from_env_or_default()?;
    let catalog_names: Vec<String> = config.catalog.iter().map(|e| e.name.clone()).collect();
    let planner = Planner::from_config(config)?;

    let targets = match env::var("DSO_PLANNER_TARGETS") {
        Ok(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Err(_) => catalog_names,
    };
    if targets.is_empty() {
        warn!("No targets given and the catalog is empty");
    }

    let mode = env::var("DSO_PLANNER_MODE").unwrap_or_else(|_| "tonight".to_string());
    match mode.as_str() {
        "tonight" => tonight(&planner, &targets).await,
        "yearly" => yearly(&planner, &targets).await,
        other => anyhow::bail!("Unknown DSO_PLANNER_MODE '{}', expected tonight or yearly", other),
    }
}

async fn tonight(planner: &Planner, targets: &[String]) -> anyhow::Result<()> {
    let date = match env::var("DSO_PLANNER_DATE") {
        Ok(text) => parse_civil_date(&text).map_err(anyhow::Error::msg)?,
        Err(_) => Utc::now().with_timezone(&planner.location().timezone).date_naive(),
    };
    let filter = ClassificationFilter {
        moon: MoonFilter::from_flags(flag("DSO_PLANNER_MOON"), flag("DSO_PLANNER_TOP_ONLY")),
        direction: env::var("DSO_PLANNER_DIRECTION").ok().filter(|d| !d.is_empty()),
    };

    let plan = planner.plan_night(date, targets).await?;
    let buckets = plan.classify(&filter);
    log_buckets(planner, &buckets);

    let output = json!({
        "date": plan.date,
        "location": plan.location,
        "windows": plan.windows,
        "filter": filter,
        "astronomical": names(&buckets.astronomical),
        "nautical": names(&buckets.nautical),
        "invisible": names(&buckets.invisible),
        "excluded": names(&buckets.excluded),
        "filtered": names(&buckets.filtered),
        "results": plan.results,
        "journal": plan.journal,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn yearly(planner: &Planner, targets: &[String]) -> anyhow::Result<()> {
    let year = match env::var("DSO_PLANNER_YEAR") {
        Ok(text) => text
            .trim()
            .parse()
            .with_context(|| format!("Invalid DSO_PLANNER_YEAR '{}'", text))?,
        Err(_) => Utc::now().year(),
    };

    let finder = YearlyBestFinder::new(planner);
    let mut overviews = Vec::with_capacity(targets.len());
    for name in targets {
        let target = match planner.resolver().target(name).await {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                continue;
            }
        };
        let overview = match finder.overview(&target, year).await {
            Ok(overview) => overview,
            Err(e) => {
                warn!("Skipping {}: {}", target.name, e);
                continue;
            }
        };
        for entry in &overview.journal {
            warn!("{}: {}", target.name, entry.message);
        }
        info!("{} is visible in months {:?} of {}", target.name, overview.visible_months(), year);
        overviews.push(overview);
    }
    println!("{}", serde_json::to_string_pretty(&overviews)?);
    Ok(())
}

fn log_buckets(planner: &Planner, buckets: &NightClassification<'_>) {
    let tz = planner.location().timezone;
    for (title, bucket) in [
        ("Astronomical night", &buckets.astronomical),
        ("Nautical night", &buckets.nautical),
        ("Not visible", &buckets.invisible),
    ] {
        info!("{}: {} targets", title, bucket.len());
        for result in bucket.iter() {
            info!("  {}", result.summary(tz));
            for line in result.moon.rationale().lines() {
                info!("    {}", line);
            }
        }
    }
}

fn names(bucket: &[&ObservationResult]) -> Vec<String> {
    bucket.iter().map(|r| r.target.name.clone()).collect()
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
