// Workout sequence builders: one pure function per workout shape, mapping a
// configuration record to an ordered interval list plus display metadata.
// Builders are total over their inputs; zero counts produce prep-only (or
// empty) sequences and zero-duration phases are simply not emitted.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::config::*;
use crate::error::TimerError;
use crate::types::{BuiltWorkout, Interval, IntervalKind, WorkoutMeta};

/// Workout shape selector, as the UI layer names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Emom,
    Tabata,
    Hiit,
    Custom,
    Micro,
    Countdown,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Emom => "emom",
            WorkoutType::Tabata => "tabata",
            WorkoutType::Hiit => "hiit",
            WorkoutType::Custom => "custom",
            WorkoutType::Micro => "micro",
            WorkoutType::Countdown => "countdown",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emom" => Ok(WorkoutType::Emom),
            "tabata" => Ok(WorkoutType::Tabata),
            "hiit" => Ok(WorkoutType::Hiit),
            "custom" => Ok(WorkoutType::Custom),
            "micro" => Ok(WorkoutType::Micro),
            "countdown" => Ok(WorkoutType::Countdown),
            other => Err(TimerError::UnknownWorkoutType(other.to_string())),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn push_prep(sequence: &mut Vec<Interval>, prep: u32) {
    if prep > 0 {
        sequence.push(Interval::new("Get Ready", IntervalKind::Prep, prep));
    }
}

/// EMOM: every minute on the minute. Each round is one work interval; any
/// remainder of the 60-second minute becomes rest. Work of a full minute or
/// longer leaves no remainder.
pub fn build_emom(cfg: &EmomConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let rounds = bounds::EMOM_ROUNDS.resolve(cfg.rounds);
    let work = bounds::EMOM_WORK.resolve(cfg.work);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    for r in 1..=rounds {
        if work > 0 {
            sequence.push(Interval::new(
                format!("Minute {} Work", r),
                IntervalKind::Work,
                work,
            ));
        }
        if work < 60 {
            sequence.push(Interval::new(
                format!("Minute {} Rest", r),
                IntervalKind::Rest,
                60 - work,
            ));
        }
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Emom,
            total_rounds: rounds,
        },
    }
}

/// Tabata: fixed work/rest pairs. The rest value reaching the emission loop
/// is always concrete; an absent field resolves to the nominal default here
/// in the configuration layer, never inside the loop.
pub fn build_tabata(cfg: &TabataConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let rounds = bounds::TABATA_ROUNDS.resolve(cfg.rounds);
    let work = bounds::TABATA_WORK.resolve(cfg.work);
    let rest = bounds::TABATA_REST.resolve(cfg.rest);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    for r in 1..=rounds {
        if work > 0 {
            sequence.push(Interval::new(
                format!("Round {} Work", r),
                IntervalKind::Work,
                work,
            ));
        }
        if rest > 0 {
            sequence.push(Interval::new(
                format!("Round {} Rest", r),
                IntervalKind::Rest,
                rest,
            ));
        }
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Tabata,
            total_rounds: rounds,
        },
    }
}

/// HIIT: optional warmup and cooldown bracketing the work/rest rounds.
pub fn build_hiit(cfg: &HiitConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let warmup = bounds::HIIT_WARMUP.resolve(cfg.warmup);
    let rounds = bounds::HIIT_ROUNDS.resolve(cfg.rounds);
    let work = bounds::HIIT_WORK.resolve(cfg.work);
    let rest = bounds::HIIT_REST.resolve(cfg.rest);
    let cooldown = bounds::HIIT_COOLDOWN.resolve(cfg.cooldown);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    if warmup > 0 {
        sequence.push(Interval::new("Warm Up", IntervalKind::Warmup, warmup));
    }

    for r in 1..=rounds {
        if work > 0 {
            sequence.push(Interval::new(
                format!("Round {} Work", r),
                IntervalKind::Work,
                work,
            ));
        }
        if rest > 0 {
            sequence.push(Interval::new(
                format!("Round {} Rest", r),
                IntervalKind::Rest,
                rest,
            ));
        }
    }

    if cooldown > 0 {
        sequence.push(Interval::new("Cool Down", IntervalKind::Cooldown, cooldown));
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Hiit,
            total_rounds: rounds,
        },
    }
}

/// Custom multi-exercise: rounds of exercises with rest between exercises
/// (not after the last in a round) and a distinguishable break between
/// rounds (not after the last round).
pub fn build_custom(cfg: &CustomConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let rounds = bounds::CUSTOM_ROUNDS.resolve(cfg.rounds);
    let exercises = bounds::CUSTOM_EXERCISES.resolve(cfg.exercises_per_round);
    let work = bounds::CUSTOM_WORK.resolve(cfg.effective_work());
    let rest = bounds::CUSTOM_REST.resolve(cfg.effective_rest());
    let between = bounds::CUSTOM_BETWEEN.resolve(cfg.between_rounds);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    for r in 1..=rounds {
        for e in 1..=exercises {
            if work > 0 {
                sequence.push(Interval::new(
                    format!("Round {} · Exercise {}", r, e),
                    IntervalKind::Work,
                    work,
                ));
            }
            if e < exercises && rest > 0 {
                sequence.push(Interval::new("Rest", IntervalKind::Rest, rest));
            }
        }
        if r < rounds && between > 0 {
            sequence.push(Interval::round_break("Round Break", between));
        }
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Custom,
            total_rounds: rounds,
        },
    }
}

/// Micro: a run of short fixed-length reps, individually labeled.
pub fn build_micro(cfg: &MicroConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let reps = bounds::MICRO_REPS.resolve(cfg.reps);
    let interval = bounds::MICRO_INTERVAL.resolve(cfg.interval);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    if interval > 0 {
        for n in 1..=reps {
            sequence.push(Interval::new(
                format!("Rep {}", n),
                IntervalKind::Work,
                interval,
            ));
        }
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Micro,
            total_rounds: reps,
        },
    }
}

/// Countdown: a single timed block.
pub fn build_countdown(cfg: &CountdownConfig) -> BuiltWorkout {
    let prep = bounds::PREP.resolve(cfg.prep);
    let total = bounds::COUNTDOWN_TOTAL.resolve(cfg.total);

    let mut sequence = Vec::new();
    push_prep(&mut sequence, prep);

    if total > 0 {
        sequence.push(Interval::new("Countdown", IntervalKind::Work, total));
    }

    BuiltWorkout {
        sequence,
        meta: WorkoutMeta {
            workout: WorkoutType::Countdown,
            total_rounds: 1,
        },
    }
}

fn parse_config<T>(config: &Value) -> Result<T, TimerError>
where
    T: DeserializeOwned + Default,
{
    // A missing or non-object config means "all defaults", not a failure.
    if config.is_object() {
        serde_json::from_value(config.clone())
            .map_err(|e| TimerError::InvalidConfig(e.to_string()))
    } else {
        Ok(T::default())
    }
}

/// Dispatch a configuration to the builder for the given workout type.
pub fn build(workout: WorkoutType, config: &Value) -> Result<BuiltWorkout, TimerError> {
    Ok(match workout {
        WorkoutType::Emom => build_emom(&parse_config(config)?),
        WorkoutType::Tabata => build_tabata(&parse_config(config)?),
        WorkoutType::Hiit => build_hiit(&parse_config(config)?),
        WorkoutType::Custom => build_custom(&parse_config(config)?),
        WorkoutType::Micro => build_micro(&parse_config(config)?),
        WorkoutType::Countdown => build_countdown(&parse_config(config)?),
    })
}

/// Build a workout sequence from JavaScript.
///
/// # Arguments
/// * `workout_type` - one of `emom`, `tabata`, `hiit`, `custom`, `micro`, `countdown`
/// * `config_json` - JSON object with that type's configuration fields
///
/// # Returns
/// JSON string with `{ sequence, meta }` or an error for an unknown type or
/// malformed JSON.
#[wasm_bindgen]
pub fn build_workout(workout_type: &str, config_json: &str) -> Result<String, JsValue> {
    let workout: WorkoutType = workout_type
        .parse()
        .map_err(|e: TimerError| JsValue::from_str(&e.to_string()))?;

    let config: Value = serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

    let built = build(workout, &config).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&built)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(built: &BuiltWorkout) -> Vec<IntervalKind> {
        built.sequence.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn emom_fills_minute_remainder() {
        let built = build_emom(&EmomConfig {
            prep: Some(0),
            rounds: Some(3),
            work: Some(40),
        });
        assert_eq!(built.sequence.len(), 6);
        for pair in built.sequence.chunks(2) {
            assert_eq!(pair[0].kind, IntervalKind::Work);
            assert_eq!(pair[0].duration, 40);
            assert_eq!(pair[1].kind, IntervalKind::Rest);
            assert_eq!(pair[1].duration, 20);
        }
    }

    #[test]
    fn emom_full_minute_has_no_rest() {
        for work in [60, 90] {
            let built = build_emom(&EmomConfig {
                prep: Some(0),
                rounds: Some(4),
                work: Some(work),
            });
            assert_eq!(built.sequence.len(), 4);
            assert!(built.sequence.iter().all(|i| i.kind == IntervalKind::Work));
        }
    }

    #[test]
    fn tabata_alternates_work_rest() {
        let built = build_tabata(&TabataConfig {
            prep: Some(0),
            rounds: Some(8),
            work: Some(20),
            rest: Some(10),
        });
        assert_eq!(built.sequence.len(), 16);
        for (i, interval) in built.sequence.iter().enumerate() {
            let expected = if i % 2 == 0 {
                IntervalKind::Work
            } else {
                IntervalKind::Rest
            };
            assert_eq!(interval.kind, expected);
        }
        assert_eq!(built.meta.total_rounds, 8);
    }

    #[test]
    fn tabata_absent_rest_resolves_before_emission() {
        let built = build_tabata(&TabataConfig {
            prep: Some(0),
            rounds: Some(1),
            work: Some(20),
            rest: None,
        });
        assert_eq!(built.sequence[1].duration, 10);
    }

    #[test]
    fn hiit_brackets_rounds_with_warmup_and_cooldown() {
        let built = build_hiit(&HiitConfig {
            prep: Some(5),
            warmup: Some(60),
            rounds: Some(2),
            work: Some(40),
            rest: Some(20),
            cooldown: Some(120),
        });
        assert_eq!(
            kinds(&built),
            vec![
                IntervalKind::Prep,
                IntervalKind::Warmup,
                IntervalKind::Work,
                IntervalKind::Rest,
                IntervalKind::Work,
                IntervalKind::Rest,
                IntervalKind::Cooldown,
            ]
        );
        assert_eq!(built.sequence[1].label, "Warm Up");
        assert_eq!(built.sequence[6].label, "Cool Down");
    }

    #[test]
    fn hiit_zero_phases_are_omitted() {
        let built = build_hiit(&HiitConfig {
            prep: Some(0),
            warmup: Some(0),
            rounds: Some(2),
            work: Some(30),
            rest: Some(0),
            cooldown: Some(0),
        });
        assert_eq!(built.sequence.len(), 2);
        assert!(built.sequence.iter().all(|i| i.kind == IntervalKind::Work));
    }

    #[test]
    fn custom_interval_count() {
        // 2 rounds x (3 work + 2 exercise rests) + 1 round break = 11
        let built = build_custom(&CustomConfig {
            prep: Some(0),
            rounds: Some(2),
            exercises_per_round: Some(3),
            exercise_work: Some(45),
            exercise_rest: Some(10),
            between_rounds: Some(30),
            ..Default::default()
        });
        assert_eq!(built.sequence.len(), 11);

        let breaks: Vec<&Interval> = built.sequence.iter().filter(|i| i.round_break).collect();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].label, "Round Break");
        assert_eq!(breaks[0].duration, 30);
    }

    #[test]
    fn custom_no_rest_after_last_exercise_or_round() {
        let built = build_custom(&CustomConfig {
            prep: Some(0),
            rounds: Some(2),
            exercises_per_round: Some(2),
            exercise_work: Some(30),
            exercise_rest: Some(10),
            between_rounds: Some(60),
            ..Default::default()
        });
        // work rest work BREAK work rest work — nothing trailing
        assert_eq!(built.sequence.last().unwrap().kind, IntervalKind::Work);
        assert_eq!(built.sequence.len(), 7);
    }

    #[test]
    fn custom_legacy_flat_fields() {
        let built = build_custom(&CustomConfig {
            prep: Some(0),
            rounds: Some(3),
            work: Some(25),
            rest: Some(5),
            between_rounds: Some(0),
            ..Default::default()
        });
        // exercisesPerRound defaults to 1: one work per round, no exercise rests
        assert_eq!(built.sequence.len(), 3);
        assert!(built.sequence.iter().all(|i| i.duration == 25));
    }

    #[test]
    fn micro_labels_each_rep() {
        let built = build_micro(&MicroConfig {
            prep: Some(0),
            reps: Some(3),
            interval: Some(5),
        });
        let labels: Vec<&str> = built.sequence.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Rep 1", "Rep 2", "Rep 3"]);
        assert_eq!(built.meta.total_rounds, 3);
    }

    #[test]
    fn countdown_is_one_block() {
        let built = build_countdown(&CountdownConfig {
            prep: Some(10),
            total: Some(300),
        });
        assert_eq!(built.sequence.len(), 2);
        assert_eq!(built.sequence[1].kind, IntervalKind::Work);
        assert_eq!(built.sequence[1].duration, 300);
        assert_eq!(built.meta.total_rounds, 1);
    }

    #[test]
    fn zero_rounds_is_prep_only_never_an_error() {
        let built = build_tabata(&TabataConfig {
            prep: Some(10),
            rounds: Some(0),
            work: Some(20),
            rest: Some(10),
        });
        assert_eq!(built.sequence.len(), 1);
        assert_eq!(built.sequence[0].kind, IntervalKind::Prep);

        let built = build_micro(&MicroConfig {
            prep: Some(0),
            reps: Some(0),
            interval: Some(5),
        });
        assert!(built.sequence.is_empty());
    }

    #[test]
    fn dispatch_rejects_unknown_type() {
        assert!("yoga".parse::<WorkoutType>().is_err());
        assert_eq!("EMOM".parse::<WorkoutType>().unwrap(), WorkoutType::Emom);
    }

    #[test]
    fn dispatch_builds_from_json_value() {
        let config = serde_json::json!({ "rounds": 2, "work": 30, "rest": 15, "prep": 0 });
        let built = build(WorkoutType::Tabata, &config).unwrap();
        assert_eq!(built.sequence.len(), 4);
    }

    #[test]
    fn dispatch_treats_null_config_as_defaults() {
        let built = build(WorkoutType::Countdown, &Value::Null).unwrap();
        assert_eq!(built.total_duration(), 10 + 60);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn field() -> impl Strategy<Value = Option<u32>> {
            prop::option::of(0u32..10_000)
        }

        proptest! {
            /// No builder ever emits a zero-duration interval, for any input.
            #[test]
            fn no_zero_duration_intervals(
                prep in field(), rounds in field(), work in field(), rest in field(),
                extra_a in field(), extra_b in field()
            ) {
                let outputs = vec![
                    build_emom(&EmomConfig { prep, rounds, work }),
                    build_tabata(&TabataConfig { prep, rounds, work, rest }),
                    build_hiit(&HiitConfig {
                        prep, warmup: extra_a, rounds, work, rest, cooldown: extra_b,
                    }),
                    build_custom(&CustomConfig {
                        prep,
                        rounds,
                        exercises_per_round: extra_a,
                        exercise_work: work,
                        exercise_rest: rest,
                        between_rounds: extra_b,
                        ..Default::default()
                    }),
                    build_micro(&MicroConfig { prep, reps: rounds, interval: work }),
                    build_countdown(&CountdownConfig { prep, total: work }),
                ];
                for built in outputs {
                    prop_assert!(built.sequence.iter().all(|i| i.duration > 0));
                }
            }

            /// Tabata is always an alternating work/rest run of length 2n
            /// after the optional prep, starting with work.
            #[test]
            fn tabata_shape(rounds in 0u32..99, work in 1u32..600, rest in 1u32..600) {
                let built = build_tabata(&TabataConfig {
                    prep: Some(0),
                    rounds: Some(rounds),
                    work: Some(work),
                    rest: Some(rest),
                });
                prop_assert_eq!(built.sequence.len() as u32, rounds * 2);
                for (i, interval) in built.sequence.iter().enumerate() {
                    if i % 2 == 0 {
                        prop_assert!(interval.kind.is_work());
                    } else {
                        prop_assert_eq!(interval.kind, IntervalKind::Rest);
                    }
                }
            }

            /// EMOM rounds always sum to exactly one minute while work fits
            /// inside the minute.
            #[test]
            fn emom_minute_invariant(rounds in 1u32..20, work in 1u32..=60) {
                let built = build_emom(&EmomConfig {
                    prep: Some(0),
                    rounds: Some(rounds),
                    work: Some(work),
                });
                prop_assert_eq!(built.total_duration(), rounds * 60);
            }
        }
    }
}
