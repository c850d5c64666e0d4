//! Integration tests for planning a single night with the siderust ephemeris.

mod support;

use dso_planner::api::{ClassificationFilter, CompassDirection, MoonFilter, ObservationResult, TwilightDepth};
use support::{date, planner};

fn names(bucket: &[&ObservationResult]) -> Vec<String> {
    bucket.iter().map(|r| r.target.name.clone()).collect()
}

/// Frankfurt at midsummer: the Sun never gets 18° below the horizon, so the
/// night falls back to the nautical window instead of failing.
#[tokio::test]
async fn test_frankfurt_midsummer_falls_back_to_nautical() {
    let planner = planner("frankfurt");
    let plan = planner.plan_night(date(2024, 6, 21), &["M13"]).await.unwrap();

    assert!(plan.windows.astronomical.is_none());
    assert!(plan.windows.nautical.is_some());

    let m13 = &plan.results[0];
    assert_eq!(m13.visibility.search_depth, Some(TwilightDepth::Nautical));
    assert_eq!(m13.visibility.dark_depth, Some(TwilightDepth::Nautical));
    assert!(m13.visibility.visible);
    let peak = m13.visibility.night_max.unwrap();
    assert!(peak.altitude_deg > 70.0, "M13 peak {}", peak.altitude_deg);

    let buckets = plan.classify(&ClassificationFilter::default());
    assert!(buckets.astronomical.is_empty());
    assert_eq!(names(&buckets.nautical), ["M13"]);
}

#[tokio::test]
async fn test_target_below_horizon_all_night_is_invisible() {
    let planner = planner("frankfurt");
    let plan = planner.plan_night(date(2024, 1, 10), &["47 Tuc"]).await.unwrap();

    let tuc = &plan.results[0];
    assert!(!tuc.visibility.visible);
    assert!(tuc.visibility.overall_max.altitude_deg < 0.0);

    let buckets = plan.classify(&ClassificationFilter::default());
    assert_eq!(names(&buckets.invisible), ["47 Tuc"]);
}

#[tokio::test]
async fn test_southern_target_from_windhoek() {
    let planner = planner("windhoek");
    let plan = planner.plan_night(date(2024, 10, 1), &["47 Tuc"]).await.unwrap();

    let tuc = &plan.results[0];
    assert!(tuc.visibility.visible);
    let peak = tuc.visibility.night_max.unwrap();
    assert!((peak.altitude_deg - 40.5).abs() < 1.0, "47 Tuc peak {}", peak.altitude_deg);
    assert_eq!(peak.direction, CompassDirection::S);
    assert_eq!(names(&plan.classify(&ClassificationFilter::default()).astronomical), ["47 Tuc"]);
}

#[tokio::test]
async fn test_winter_night_buckets_and_order() {
    let planner = planner("frankfurt");
    let requested = ["M57", "M42", "NGC 99999", "M31", "47 Tuc", "m 13"];
    let plan = planner.plan_night(date(2024, 1, 10), &requested).await.unwrap();

    // Request order is kept and the unknown target is journaled, not fatal
    let kept: Vec<&str> = plan.results.iter().map(|r| r.target.name.as_str()).collect();
    assert_eq!(kept, ["M57", "M42", "M31", "47 Tuc", "m 13"]);
    let failures: Vec<_> = plan.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].target.as_deref(), Some("NGC 99999"));

    let m42 = plan.results.iter().find(|r| r.target.name == "M42").unwrap();
    let peak = m42.visibility.night_max.unwrap();
    assert!((peak.altitude_deg - 34.5).abs() < 1.0, "M42 peak {}", peak.altitude_deg);
    assert_eq!(peak.direction, CompassDirection::S);
    assert_eq!(m42.target.identifier.as_deref(), Some("NGC 1976"));

    let buckets = plan.classify(&ClassificationFilter::default());
    assert!(names(&buckets.astronomical).contains(&"M42".to_string()));
    assert_eq!(names(&buckets.invisible), ["47 Tuc"]);
    let bucketed = buckets.astronomical.len()
        + buckets.nautical.len()
        + buckets.invisible.len()
        + buckets.excluded.len();
    assert_eq!(bucketed, plan.results.len());

    for bucket in [&buckets.astronomical, &buckets.nautical] {
        assert!(bucket.windows(2).all(|w| w[0].sort_instant() <= w[1].sort_instant()));
    }
}

#[tokio::test]
async fn test_direction_filter_moves_targets_out_of_buckets() {
    let planner = planner("frankfurt");
    let plan = planner.plan_night(date(2024, 1, 10), &["M42"]).await.unwrap();

    let south = ClassificationFilter {
        moon: MoonFilter::Ignore,
        direction: Some("S".into()),
    };
    assert_eq!(names(&plan.classify(&south).astronomical), ["M42"]);

    let north = ClassificationFilter {
        moon: MoonFilter::Ignore,
        direction: Some("N".into()),
    };
    let buckets = plan.classify(&north);
    assert!(buckets.astronomical.is_empty());
    assert_eq!(names(&buckets.filtered), ["M42"]);
}

#[tokio::test]
async fn test_moon_score_is_evaluated_at_peak() {
    let planner = planner("frankfurt");
    let plan = planner.plan_night(date(2024, 1, 10), &["M42"]).await.unwrap();
    let moon = &plan.results[0].moon;

    assert!(moon.unavailable_reason.is_none());
    assert!(moon.illumination_percent.is_some());
    assert_eq!(moon.is_ok, !moon.remarks.is_empty());
    // New moon on 2024-01-11
    assert!(moon.illumination_percent.unwrap() < 5.0);
    assert!(moon.rationale().contains("Nice: "));
}
