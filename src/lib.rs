//! Hydration log: timestamped water intake entries, a daily goal, date-bucketed
//! totals for charts, and best-effort persistence to a single key-value slot.

pub mod aggregate;
pub mod clock;
pub mod commands;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod storage;
pub mod store;
pub mod structs;
pub(crate) mod tasks;

pub use store::{HydrationStore, StateChange, SubscriptionId};
pub use structs::{
    daily_total::DailyTotal, hydration_entry::HydrationEntry, hydration_state::HydrationState,
    language::Language,
};
