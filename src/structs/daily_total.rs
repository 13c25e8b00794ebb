use serde::{Deserialize, Serialize};

/// Total intake for one calendar day, one bar of the charts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: String,
    pub amount: u64,
}
