// Playback engine: drives a single playhead through a loaded interval
// sequence under wall-clock time. The host owns scheduling and feeds its
// clock into tick(); the engine owns all state and is the sole writer of it.
// Every transition mutates state first, then emits, so listeners always
// observe consistent post-transition state.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::builders::{self, WorkoutType};
use crate::types::{Interval, Timestamp};

/// Minimum wall-clock delta (microseconds) a tick must carry to be applied.
/// Remaining time renders as whole seconds, so finer deltas buy nothing.
const MIN_TICK_US: u64 = 50_000;

/// Playback state machine: idle → running ⇄ paused → finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
            EngineState::Finished => "finished",
        }
    }
}

/// One event on the playback stream. Serializes with an `event` tag so the
/// JS side can switch on `event` directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    Load { sequence: Vec<Interval> },
    Start { interval: Interval },
    Interval { interval: Interval },
    IntervalComplete { interval: Interval },
    Skipped { interval: Interval },
    Tick {
        remaining: f64,
        interval: Interval,
        position: usize,
    },
    Pause { interval: Interval },
    Resume { interval: Interval },
    Finish,
    Reset,
}

/// Handle returned by `subscribe`; pass back to `unsubscribe` to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TimerEvent)>;

/// The countdown/playback driver.
///
/// Single-threaded and cooperative: the host calls `tick(now)` from its
/// repeating scheduler with `now` taken from its monotonic clock. A tick
/// arriving after `pause()` or `reset()` is a no-op because the state check
/// at the top of `tick` rejects it; pausing drops the time anchor, so paused
/// wall time is never counted as elapsed.
pub struct TimerEngine {
    sequence: Vec<Interval>,
    position: usize,
    remaining: f64,
    state: EngineState,
    last_sample: Option<Timestamp>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl TimerEngine {
    pub fn new() -> Self {
        TimerEngine {
            sequence: Vec::new(),
            position: 0,
            remaining: 0.0,
            state: EngineState::Idle,
            last_sample: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Register a listener for every subsequent event. Listeners run
    /// synchronously, in subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TimerEvent) + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detach a listener. Returns false if the handle was already detached.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: TimerEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&event);
        }
        // Anything subscribed during dispatch landed in self.listeners.
        let added = std::mem::replace(&mut self.listeners, listeners);
        self.listeners.extend(added);
    }

    /// Load a fresh sequence: indices are rewritten to 0..n-1, the playhead
    /// returns to the first interval, and state resets to idle.
    pub fn load(&mut self, mut sequence: Vec<Interval>) {
        for (i, interval) in sequence.iter_mut().enumerate() {
            interval.index = i;
        }
        self.remaining = sequence.first().map(|i| i.duration as f64).unwrap_or(0.0);
        self.sequence = sequence;
        self.position = 0;
        self.state = EngineState::Idle;
        self.last_sample = None;
        self.emit(TimerEvent::Load {
            sequence: self.sequence.clone(),
        });
    }

    /// Begin playback. Only meaningful from idle with a non-empty sequence;
    /// anything else is a silent no-op.
    pub fn start(&mut self, now: Timestamp) {
        if self.state != EngineState::Idle || self.sequence.is_empty() {
            return;
        }
        self.state = EngineState::Running;
        self.last_sample = Some(now);
        let current = self.sequence[self.position].clone();
        self.emit(TimerEvent::Start { interval: current });
    }

    pub fn pause(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        self.state = EngineState::Paused;
        self.last_sample = None;
        let current = self.sequence[self.position].clone();
        self.emit(TimerEvent::Pause { interval: current });
    }

    /// Resume from pause, re-anchoring the time base at `now`.
    pub fn resume(&mut self, now: Timestamp) {
        if self.state != EngineState::Paused {
            return;
        }
        self.state = EngineState::Running;
        self.last_sample = Some(now);
        let current = self.sequence[self.position].clone();
        self.emit(TimerEvent::Resume { interval: current });
    }

    /// Discard the sequence and return to idle.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.position = 0;
        self.remaining = 0.0;
        self.state = EngineState::Idle;
        self.last_sample = None;
        self.emit(TimerEvent::Reset);
    }

    /// Abandon the interval in progress and advance, regardless of remaining
    /// time. The pre-skip interval is reported before the advance happens.
    pub fn skip(&mut self) {
        if self.state == EngineState::Finished {
            return;
        }
        let current = match self.sequence.get(self.position) {
            Some(interval) => interval.clone(),
            None => return,
        };
        self.emit(TimerEvent::Skipped { interval: current });
        self.advance();
    }

    /// Shared advance rule for natural expiry and skip: move the playhead
    /// forward, either into the next interval or into the finished state.
    fn advance(&mut self) {
        self.position += 1;
        if self.position >= self.sequence.len() {
            self.state = EngineState::Finished;
            self.remaining = 0.0;
            self.last_sample = None;
            self.emit(TimerEvent::Finish);
        } else {
            self.remaining = self.sequence[self.position].duration as f64;
            let current = self.sequence[self.position].clone();
            self.emit(TimerEvent::Interval { interval: current });
        }
    }

    /// Apply one wall-clock sample. No-op unless running (this is the guard
    /// that makes stale scheduled callbacks harmless) and unless at least
    /// 50ms elapsed since the last applied sample.
    pub fn tick(&mut self, now: Timestamp) {
        if self.state != EngineState::Running {
            return;
        }
        let last = match self.last_sample {
            Some(ts) => ts,
            None => return,
        };
        let delta_us = now.since(last);
        if delta_us < MIN_TICK_US {
            return;
        }
        self.last_sample = Some(now);
        self.remaining -= delta_us as f64 / 1_000_000.0;

        if self.remaining <= 0.0 {
            let expired = self.sequence[self.position].clone();
            self.emit(TimerEvent::IntervalComplete { interval: expired });
            self.advance();
        }

        if self.state == EngineState::Running {
            let current = self.sequence[self.position].clone();
            let position = self.position;
            let remaining = self.remaining.max(0.0);
            self.emit(TimerEvent::Tick {
                remaining,
                interval: current,
                position,
            });
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Remaining seconds in the current interval, clamped non-negative.
    pub fn remaining(&self) -> f64 {
        self.remaining.max(0.0)
    }

    pub fn current_interval(&self) -> Option<&Interval> {
        self.sequence.get(self.position)
    }

    /// The interval after the current one, for "up next" display.
    pub fn next_interval(&self) -> Option<&Interval> {
        self.sequence.get(self.position + 1)
    }

    pub fn sequence(&self) -> &[Interval] {
        &self.sequence
    }

    /// Sum of all interval durations in the loaded sequence, in seconds.
    pub fn total_duration(&self) -> u32 {
        self.sequence.iter().map(|i| i.duration).sum()
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// WASM-exposed timer for JavaScript interop.
///
/// The JS host registers one callback with `set_listener` and receives every
/// event as a JSON string (`{"event": "tick", ...}`), then drives playback by
/// calling `tick(performance.now())` from its animation-frame loop.
#[wasm_bindgen]
pub struct WasmTimer {
    inner: TimerEngine,
    listener: Option<ListenerId>,
}

#[wasm_bindgen]
impl WasmTimer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmTimer {
        WasmTimer {
            inner: TimerEngine::new(),
            listener: None,
        }
    }

    /// Register the JS event callback, replacing any previous one. Each
    /// event is delivered as a JSON string argument.
    pub fn set_listener(&mut self, callback: js_sys::Function) {
        if let Some(id) = self.listener.take() {
            self.inner.unsubscribe(id);
        }
        let id = self.inner.subscribe(move |event| {
            if let Ok(json) = serde_json::to_string(event) {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
        });
        self.listener = Some(id);
    }

    /// Detach the JS event callback.
    pub fn clear_listener(&mut self) {
        if let Some(id) = self.listener.take() {
            self.inner.unsubscribe(id);
        }
    }

    /// Load a pre-built sequence (JSON array of intervals).
    pub fn load_sequence(&mut self, sequence_json: &str) -> Result<(), JsValue> {
        let sequence: Vec<Interval> = serde_json::from_str(sequence_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid sequence: {}", e)))?;
        self.inner.load(sequence);
        Ok(())
    }

    /// Build a workout and load it in a single crossing.
    ///
    /// # Returns
    /// JSON string with the built `{ sequence, meta }` so the UI can render
    /// round info without a second call.
    pub fn load_workout(
        &mut self,
        workout_type: &str,
        config_json: &str,
    ) -> Result<String, JsValue> {
        let workout: WorkoutType = workout_type
            .parse()
            .map_err(|e: crate::error::TimerError| JsValue::from_str(&e.to_string()))?;
        let config: serde_json::Value = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        let built = builders::build(workout, &config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let json = serde_json::to_string(&built)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;

        self.inner.load(built.sequence);
        Ok(json)
    }

    /// Begin playback. `now_ms` is the host clock (`performance.now()`).
    pub fn start(&mut self, now_ms: f64) {
        self.inner.start(Timestamp::from_millis(now_ms));
    }

    /// Apply one clock sample from the host's scheduling loop.
    pub fn tick(&mut self, now_ms: f64) {
        self.inner.tick(Timestamp::from_millis(now_ms));
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn resume(&mut self, now_ms: f64) {
        self.inner.resume(Timestamp::from_millis(now_ms));
    }

    pub fn skip(&mut self) {
        self.inner.skip();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Current state as a string: `idle`, `running`, `paused`, or `finished`.
    pub fn state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    pub fn position(&self) -> u32 {
        self.inner.position() as u32
    }

    pub fn remaining_secs(&self) -> f64 {
        self.inner.remaining()
    }

    pub fn total_duration_secs(&self) -> u32 {
        self.inner.total_duration()
    }

    /// Current interval as JSON, or the string `null` when none is loaded.
    pub fn current_interval_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.current_interval())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// The loaded sequence as a JSON array.
    pub fn sequence_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.sequence())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl Default for WasmTimer {
    fn default() -> Self {
        Self::new()
    }
}
