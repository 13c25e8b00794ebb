use serde::{Deserialize, Deserializer, Serialize};

use super::{hydration_entry::HydrationEntry, language::Language};

/// 2 liters
pub const DEFAULT_DAILY_GOAL: u32 = 2000;

/// Everything that is persisted to the storage slot.
///
/// Missing, `null` or zero fields in a saved payload fall back to their
/// defaults instead of failing the whole load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HydrationState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<HydrationEntry>,

    #[serde(default = "default_daily_goal", deserialize_with = "daily_goal_or_default")]
    pub daily_goal: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub language: Language,
}

impl Default for HydrationState {
    fn default() -> Self {
        Self {
            entries: vec![],
            daily_goal: DEFAULT_DAILY_GOAL,
            language: Language::default(),
        }
    }
}

fn default_daily_goal() -> u32 {
    DEFAULT_DAILY_GOAL
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn daily_goal_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?
        .filter(|goal| *goal > 0)
        .unwrap_or(DEFAULT_DAILY_GOAL))
}
