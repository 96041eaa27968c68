// Per-workout configuration records deserialized from the JS form layer.
// Field names are camelCase on the wire. Numeric parsing is lenient: a value
// that is not a non-negative integer counts as absent and resolves to the
// field's default; present values clamp to the field's declared bounds.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default value and clamp range for one numeric configuration field.
#[derive(Debug, Clone, Copy)]
pub struct FieldBounds {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl FieldBounds {
    pub const fn new(default: u32, min: u32, max: u32) -> Self {
        FieldBounds { default, min, max }
    }

    /// Resolve a raw field value: absent falls back to the default,
    /// present clamps into `[min, max]`.
    pub fn resolve(&self, raw: Option<u32>) -> u32 {
        match raw {
            Some(v) => v.clamp(self.min, self.max),
            None => self.default,
        }
    }
}

/// Declared defaults and bounds, per workout type.
pub mod bounds {
    use super::FieldBounds;

    pub const PREP: FieldBounds = FieldBounds::new(10, 0, 300);

    pub const EMOM_ROUNDS: FieldBounds = FieldBounds::new(10, 0, 99);
    pub const EMOM_WORK: FieldBounds = FieldBounds::new(60, 0, 3600);

    pub const TABATA_ROUNDS: FieldBounds = FieldBounds::new(8, 0, 99);
    pub const TABATA_WORK: FieldBounds = FieldBounds::new(20, 0, 3600);
    pub const TABATA_REST: FieldBounds = FieldBounds::new(10, 0, 3600);

    pub const HIIT_WARMUP: FieldBounds = FieldBounds::new(0, 0, 600);
    pub const HIIT_ROUNDS: FieldBounds = FieldBounds::new(8, 0, 99);
    pub const HIIT_WORK: FieldBounds = FieldBounds::new(40, 0, 3600);
    pub const HIIT_REST: FieldBounds = FieldBounds::new(20, 0, 3600);
    pub const HIIT_COOLDOWN: FieldBounds = FieldBounds::new(0, 0, 600);

    pub const CUSTOM_ROUNDS: FieldBounds = FieldBounds::new(3, 0, 99);
    pub const CUSTOM_EXERCISES: FieldBounds = FieldBounds::new(1, 0, 50);
    pub const CUSTOM_WORK: FieldBounds = FieldBounds::new(45, 0, 3600);
    pub const CUSTOM_REST: FieldBounds = FieldBounds::new(15, 0, 3600);
    pub const CUSTOM_BETWEEN: FieldBounds = FieldBounds::new(60, 0, 3600);

    pub const MICRO_REPS: FieldBounds = FieldBounds::new(10, 0, 500);
    pub const MICRO_INTERVAL: FieldBounds = FieldBounds::new(5, 0, 600);

    pub const COUNTDOWN_TOTAL: FieldBounds = FieldBounds::new(60, 0, 35_999);
}

/// Lenient numeric field: accepts integers, integral floats, and numeric
/// strings (form inputs often arrive stringly). Anything else, including
/// negative values, is treated as absent.
fn lenient<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmomConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub work: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabataConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub work: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rest: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiitConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub warmup: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub work: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rest: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub cooldown: Option<u32>,
}

/// Multi-exercise workout configuration.
///
/// `work`/`rest` are legacy flat aliases: older share links and presets carry
/// them instead of `exerciseWork`/`exerciseRest`. The alias is only read when
/// the newer field is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub exercises_per_round: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub exercise_work: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub exercise_rest: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub between_rounds: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub work: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub rest: Option<u32>,
}

impl CustomConfig {
    /// Per-exercise work seconds, honoring the legacy flat alias.
    pub fn effective_work(&self) -> Option<u32> {
        self.exercise_work.or(self.work)
    }

    /// Per-exercise rest seconds, honoring the legacy flat alias.
    pub fn effective_rest(&self) -> Option<u32> {
        self.exercise_rest.or(self.rest)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub reps: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub interval: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub prep: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<u32>,
}
