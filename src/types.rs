// Shared data model: intervals, workout metadata, and the wall-clock newtype.
// Strong typing over strings; everything that crosses the JS boundary derives serde.

use serde::{Deserialize, Serialize};

/// Wall-clock instant in microseconds. Newtype for type safety.
///
/// The host clock (`performance.now()`) hands us milliseconds as f64;
/// converting to integer microseconds keeps delta arithmetic exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// Convert the host's millisecond clock reading. Negative or non-finite
    /// readings collapse to zero rather than panicking.
    pub fn from_millis(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0) as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Elapsed time since `earlier`, saturating to zero if the clock ran backwards.
    pub fn since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Phase classification for an interval.
///
/// `Warmup` and `Cooldown` behave like prep/rest at playback time but carry
/// their own tag so display styling and cue selection can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Prep,
    Warmup,
    Work,
    Rest,
    Cooldown,
}

impl IntervalKind {
    /// Whether this phase counts as effort (vs. recovery/preparation).
    pub fn is_work(&self) -> bool {
        matches!(self, IntervalKind::Work)
    }
}

/// One labeled, typed, fixed-duration phase of a workout.
///
/// Builders emit intervals with `index` 0; the engine rewrites indices to
/// `0..n-1` at load time and they stay stable for the life of that sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub label: String,
    pub kind: IntervalKind,
    /// Seconds. Builders never emit zero-duration intervals.
    pub duration: u32,
    #[serde(default)]
    pub index: usize,
    /// Marks a between-round rest in multi-exercise workouts, as opposed to
    /// an exercise-level rest. Display classification only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub round_break: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Interval {
    pub fn new(label: impl Into<String>, kind: IntervalKind, duration: u32) -> Self {
        Interval {
            label: label.into(),
            kind,
            duration,
            index: 0,
            round_break: false,
        }
    }

    pub fn round_break(label: impl Into<String>, duration: u32) -> Self {
        Interval {
            label: label.into(),
            kind: IntervalKind::Rest,
            duration,
            index: 0,
            round_break: true,
        }
    }
}

/// Informational summary attached to a built sequence.
///
/// `total_rounds` counts the primary repeating units the user configured
/// (rounds or reps), never the raw interval count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutMeta {
    pub workout: crate::builders::WorkoutType,
    pub total_rounds: u32,
}

/// A builder's output: the ordered sequence plus display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltWorkout {
    pub sequence: Vec<Interval>,
    pub meta: WorkoutMeta,
}

impl BuiltWorkout {
    /// Sum of all interval durations, in seconds.
    pub fn total_duration(&self) -> u32 {
        self.sequence.iter().map(|i| i.duration).sum()
    }
}
