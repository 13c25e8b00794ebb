pub mod daily_total;
pub mod hydration_entry;
pub mod hydration_state;
pub mod language;
