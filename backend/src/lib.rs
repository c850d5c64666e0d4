//! # DSO Planner
//!
//! Observation planning engine for deep-sky objects.
//!
//! For an observer site and a civil date the planner works out when a target
//! is highest during darkness, whether it stays high long enough to be worth
//! observing, and whether the Moon gets in the way. Results for a set of
//! targets are sorted into astronomical, nautical and invisible buckets.
//!
//! ## Architecture
//!
//! - [`api`]: Result types handed to callers
//! - [`config`]: TOML configuration with serde defaults
//! - [`ephemeris`]: Sun, Moon and fixed-target positions, horizon crossings
//! - [`resolver`]: Target name to coordinates and catalog metadata
//! - [`models`]: Location, time, twilight, compass and track types
//! - [`services`]: Twilight, track, visibility, Moon, classification and
//!   planning services
//!
//! ## Example
//!
//! ```no_run
//! use dso_planner::api::{ClassificationFilter, PlannerConfig};
//! use dso_planner::services::Planner;
//!
//! # async fn run() -> dso_planner::api::PlannerResult<()> {
//! let planner = Planner::from_config(PlannerConfig::from_env_or_default()?)?;
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
//! let plan = planner.plan_night(date, &["M31", "M33"]).await?;
//! let buckets = plan.classify(&ClassificationFilter::default());
//! println!("{} targets in astronomical night", buckets.astronomical.len());
//! # Ok(())
//! # }
//! ```

// Allow large error types - PlannerError carries rich context for journals
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod resolver;
pub mod services;
