//! Twilight depths, their night windows, and the widening fallback shared by
//! the visibility analysis and the night classification.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Solar depression level bounding a twilight window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TwilightDepth {
    /// Sun 6° below the horizon
    Civil,
    /// Sun 12° below the horizon
    Nautical,
    /// Sun 18° below the horizon
    Astronomical,
}

impl TwilightDepth {
    /// All depths, darkest first.
    pub const ALL: [TwilightDepth; 3] = [
        TwilightDepth::Astronomical,
        TwilightDepth::Nautical,
        TwilightDepth::Civil,
    ];

    /// Solar depression below the horizon, in degrees.
    pub fn depression_deg(&self) -> f64 {
        match self {
            TwilightDepth::Civil => 6.0,
            TwilightDepth::Nautical => 12.0,
            TwilightDepth::Astronomical => 18.0,
        }
    }

    /// Sun altitude threshold in degrees (negative).
    pub fn horizon_deg(&self) -> f64 {
        -self.depression_deg()
    }

    /// The next wider (brighter) depth, if any.
    pub fn broader(&self) -> Option<TwilightDepth> {
        match self {
            TwilightDepth::Astronomical => Some(TwilightDepth::Nautical),
            TwilightDepth::Nautical => Some(TwilightDepth::Civil),
            TwilightDepth::Civil => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TwilightDepth::Civil => "civil",
            TwilightDepth::Nautical => "nautical",
            TwilightDepth::Astronomical => "astronomical",
        }
    }
}

/// Interval during which the Sun stays below one depression threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilightWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TwilightWindow {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// True when `start < instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start < instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// The three twilight windows of one night.
///
/// Any window may be undefined, e.g. astronomical night near the summer
/// solstice at latitudes above roughly 48.5°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindows {
    /// Civil date on whose evening the night starts
    pub date: NaiveDate,
    pub civil: Option<TwilightWindow>,
    pub nautical: Option<TwilightWindow>,
    pub astronomical: Option<TwilightWindow>,
}

impl NightWindows {
    pub fn get(&self, depth: TwilightDepth) -> Option<TwilightWindow> {
        match depth {
            TwilightDepth::Civil => self.civil,
            TwilightDepth::Nautical => self.nautical,
            TwilightDepth::Astronomical => self.astronomical,
        }
    }

    /// Each defined window lies inside the next broader defined one.
    ///
    /// Windows cut off by the 24 h search span (polar night) may share that
    /// bound with the broader window.
    pub fn is_nested(&self) -> bool {
        self.defined()
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start && pair[1].end <= pair[0].end)
    }

    /// Checks `civil_start < nautical_start < astronomical_start <
    /// astronomical_end < nautical_end < civil_end` over the defined windows.
    pub fn is_strictly_nested(&self) -> bool {
        self.defined()
            .windows(2)
            .all(|pair| pair[0].start < pair[1].start && pair[1].end < pair[0].end)
    }

    fn defined(&self) -> Vec<TwilightWindow> {
        [self.civil, self.nautical, self.astronomical]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Pick the first defined window from `preferred` widening towards `broadest`.
///
/// With `instant` set, a window only qualifies when it strictly contains the
/// instant. Returns the depth that matched together with its window.
pub fn widen_fallback(
    windows: &NightWindows,
    preferred: TwilightDepth,
    broadest: TwilightDepth,
    instant: Option<DateTime<Utc>>,
) -> Option<(TwilightDepth, TwilightWindow)> {
    let mut depth = preferred;
    loop {
        if let Some(window) = windows.get(depth) {
            if instant.map_or(true, |t| window.contains(t)) {
                return Some((depth, window));
            }
        }
        if depth == broadest {
            return None;
        }
        depth = depth.broader()?;
    }
}
