//! Service layer for the nightly analysis pipeline.
//!
//! Each module owns one step of the pipeline; [`planner`] wires them together
//! for a single night and [`yearly`] repeats that across a year.

pub mod classifier;
pub mod journal;
pub mod moon;
pub mod night_track;
pub mod planner;
pub mod twilight;
pub mod visibility;
pub mod yearly;

pub use classifier::{classify, ClassificationFilter, MoonFilter, NightClassification};
pub use journal::RunJournal;
pub use moon::MoonScorer;
pub use planner::{NightPlan, Planner};
pub use twilight::TwilightCalculator;
pub use visibility::VisibilityAnalyzer;
pub use yearly::YearlyBestFinder;
