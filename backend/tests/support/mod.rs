//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use dso_planner::api::PlannerConfig;
use dso_planner::resolver::CatalogEntry;
use dso_planner::services::Planner;

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn entry(name: &str, identifier: &str, ra_deg: f64, dec_deg: f64, object_type: &str) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        identifier: Some(identifier.to_string()),
        ra_deg,
        dec_deg,
        object_type: Some(object_type.to_string()),
        magnitude: None,
        major_axis_arcmin: None,
        minor_axis_arcmin: None,
    }
}

/// A handful of bright objects spread over the sky, including one that
/// never rises at mid-northern latitudes.
pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        entry("M31", "NGC 224", 10.6847, 41.2687, "G"),
        entry("M42", "NGC 1976", 83.8221, -5.3911, "GNe"),
        entry("M13", "NGC 6205", 250.4235, 36.4613, "GlC"),
        entry("M57", "NGC 6720", 283.3963, 33.0292, "PN"),
        entry("47 Tuc", "NGC 104", 6.0236, -72.0813, "GlC"),
    ]
}

pub fn config_for(site: &str) -> PlannerConfig {
    let mut config = PlannerConfig {
        catalog: catalog(),
        ..PlannerConfig::default()
    };
    config.apply_site_preset(site).unwrap();
    config
}

pub fn planner(site: &str) -> Planner {
    Planner::from_config(config_for(site)).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Run `f` with environment variables set (`Some`) or removed (`None`),
/// restoring the previous values afterwards, also on panic.
pub fn with_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvRestore::apply(changes);
    f()
}

struct EnvRestore {
    previous: HashMap<String, Option<String>>,
}

impl EnvRestore {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut previous = HashMap::new();
        for (key, value) in changes {
            previous
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { previous }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain() {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}
