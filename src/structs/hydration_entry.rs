use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::clock::DateBasis;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HydrationEntry {
    /// `<epoch millis>-<random fraction>`. Collisions are only practically unlikely.
    pub id: String,

    /// Amount of water drank in milliliters
    pub amount: u32,

    /// Timestamp of when the drink was recorded, in epoch milliseconds
    pub timestamp: i64,

    /// Calendar date (`YYYY-MM-DD`) of `timestamp`, frozen at creation
    pub date: String,
}

impl HydrationEntry {
    pub fn new(amount: u32, created_at: DateTime<Utc>, basis: DateBasis) -> Self {
        let timestamp = created_at.timestamp_millis();

        Self {
            id: format!("{timestamp}-{}", rand::random::<f64>()),
            amount,
            timestamp,
            date: basis.date_key(created_at),
        }
    }
}
