// timer_core: interval workout timer engine (Rust/WASM).
// All timing and sequence logic lives here; the JS host is plumbing that
// supplies configurations, drives the tick loop, and renders the events.

mod builders;
mod config;
mod engine;
mod error;
mod types;

use wasm_bindgen::prelude::*;

pub use builders::{
    build, build_countdown, build_custom, build_emom, build_hiit, build_micro, build_tabata,
    build_workout, WorkoutType,
};
pub use config::{
    bounds, CountdownConfig, CustomConfig, EmomConfig, FieldBounds, HiitConfig, MicroConfig,
    TabataConfig,
};
pub use engine::{EngineState, ListenerId, TimerEngine, TimerEvent, WasmTimer};
pub use error::TimerError;
pub use types::{BuiltWorkout, Interval, IntervalKind, Timestamp, WorkoutMeta};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
