//! What the screens call. Input validation lives here, in front of the store.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    aggregate::Progress,
    clock::{format_date, parse_date},
    i18n::translate,
    store::HydrationStore,
    structs::{hydration_entry::HydrationEntry, language::Language},
};

pub const MIN_ENTRY_ML: u32 = 1;
pub const MAX_ENTRY_ML: u32 = 2000;
pub const MIN_GOAL_ML: u32 = 500;
pub const MAX_GOAL_ML: u32 = 5000;

pub const QUICK_ADD_AMOUNTS: [u32; 3] = [250, 500, 750];
pub const PRESET_GOALS: [u32; 4] = [1500, 2000, 2500, 3000];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("amount must be at least {min} ml", min = MIN_ENTRY_ML)]
    InvalidAmount(u32),

    #[error("amount of {0} ml is over the {max} ml limit per entry", max = MAX_ENTRY_ML)]
    AmountTooLarge(u32),

    #[error("goal of {0} ml is outside {min}-{max} ml", min = MIN_GOAL_ML, max = MAX_GOAL_ML)]
    InvalidGoal(u32),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl CommandError {
    pub fn translation_key(&self) -> &'static str {
        match self {
            CommandError::InvalidAmount(_) => "invalidAmount",
            CommandError::AmountTooLarge(_) => "tooMuch",
            CommandError::InvalidGoal(_) => "invalidGoal",
            CommandError::InvalidDate(_) => "invalidDate",
        }
    }

    pub fn localized(&self, language: Language) -> &'static str {
        translate(self.translation_key(), language)
    }
}

pub fn validate_amount(amount: u32) -> Result<u32, CommandError> {
    match amount {
        a if a < MIN_ENTRY_ML => Err(CommandError::InvalidAmount(a)),
        a if a > MAX_ENTRY_ML => Err(CommandError::AmountTooLarge(a)),
        a => Ok(a),
    }
}

pub fn validate_goal(goal: u32) -> Result<u32, CommandError> {
    if (MIN_GOAL_ML..=MAX_GOAL_ML).contains(&goal) {
        Ok(goal)
    } else {
        Err(CommandError::InvalidGoal(goal))
    }
}

/// The logged entry and where today stands afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct DrinkReceipt {
    pub entry: HydrationEntry,
    pub progress: Progress,
}

pub fn record_drink(store: &HydrationStore, amount: u32) -> Result<DrinkReceipt, CommandError> {
    let amount = validate_amount(amount)?;
    let entry = store.add_entry(amount);

    Ok(DrinkReceipt {
        entry,
        progress: store.today_progress(),
    })
}

pub fn update_daily_goal(store: &HydrationStore, goal: u32) -> Result<u32, CommandError> {
    let goal = validate_goal(goal)?;
    store.set_daily_goal(goal);
    Ok(goal)
}

pub fn day_total(store: &HydrationStore, date: &str) -> Result<u64, CommandError> {
    let date = parse_date(date).ok_or_else(|| CommandError::InvalidDate(date.to_string()))?;
    Ok(store.date_total(&format_date(date)))
}

pub fn get_latest_drink(store: &HydrationStore) -> Option<HydrationEntry> {
    trace!("[get_latest_drink] Reading latest drink");

    store.entries().last().cloned()
}

pub fn list_drinks(store: &HydrationStore) -> Vec<HydrationEntry> {
    trace!("[list_drinks] Reading drink history");

    store.entries()
}

/// Totals for every day that has entries, over the whole history
pub fn list_drinks_group_day(store: &HydrationStore) -> BTreeMap<String, u64> {
    let entries = store.entries();
    debug!(entries = entries.len(), "[list_drinks_group_day] Grouping drinks by day");

    let mut grouped_drinks: BTreeMap<String, u64> = BTreeMap::new();

    for entry in &entries {
        *grouped_drinks.entry(entry.date.clone()).or_insert(0) += u64::from(entry.amount);
    }

    grouped_drinks
}
