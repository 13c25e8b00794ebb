use std::{
    str::FromStr,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Format of every stored and queried calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used for back-dated imports and tests.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Which calendar an instant is projected onto when deriving its date.
///
/// The projection happens once, when an entry is created. Changing the basis
/// (or the machine's time zone) later does not rewrite stored dates.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateBasis {
    #[default]
    Utc,
    Local,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown date basis {0:?}, expected `utc` or `local`")]
pub struct UnknownDateBasis(pub String);

impl DateBasis {
    pub fn calendar_date(self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DateBasis::Utc => instant.date_naive(),
            DateBasis::Local => instant.with_timezone(&Local).date_naive(),
        }
    }

    pub fn date_key(self, instant: DateTime<Utc>) -> String {
        format_date(self.calendar_date(instant))
    }
}

impl FromStr for DateBasis {
    type Err = UnknownDateBasis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(DateBasis::Utc),
            "local" => Ok(DateBasis::Local),
            _ => Err(UnknownDateBasis(s.to_string())),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}
