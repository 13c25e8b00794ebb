//! Pure read-side aggregation over the entry log.
//!
//! Entries are grouped by their stored `date` string, never by re-deriving a
//! date from the timestamp.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::{
    clock::format_date,
    structs::{daily_total::DailyTotal, hydration_entry::HydrationEntry},
};

/// Length of the trailing window used for the monthly chart
pub const MONTHLY_WINDOW_DAYS: u64 = 30;

/// Length of the bar chart shown under the monthly statistics
pub const CHART_DAYS: usize = 14;

pub fn date_total(entries: &[HydrationEntry], date: &str) -> u64 {
    entries
        .iter()
        .filter(|entry| entry.date == date)
        .map(|entry| u64::from(entry.amount))
        .sum()
}

/// Daily totals for the 30 calendar days ending at `today`, oldest first.
///
/// Every day of the window is present, with 0 when nothing was logged.
/// Entries outside the window are ignored.
pub fn monthly_data(entries: &[HydrationEntry], today: NaiveDate) -> Vec<DailyTotal> {
    let mut window: Vec<DailyTotal> = (0..MONTHLY_WINDOW_DAYS)
        .rev()
        .filter_map(|days_back| today.checked_sub_days(Days::new(days_back)))
        .map(|date| DailyTotal {
            date: format_date(date),
            amount: 0,
        })
        .collect();

    let buckets: HashMap<String, usize> = window
        .iter()
        .enumerate()
        .map(|(index, day)| (day.date.clone(), index))
        .collect();

    for entry in entries {
        if let Some(&index) = buckets.get(entry.date.as_str()) {
            window[index].amount += u64::from(entry.amount);
        }
    }

    window
}

/// The newest `days` buckets of a window
pub fn recent_days(window: &[DailyTotal], days: usize) -> &[DailyTotal] {
    &window[window.len().saturating_sub(days)..]
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Mean over every day of the window, empty days included, rounded
    pub average: u64,
    pub best_day: u64,
    pub goals_met: usize,
    pub active_days: usize,
}

impl MonthlyStats {
    pub fn from_window(window: &[DailyTotal], daily_goal: u32) -> Self {
        let total: u64 = window.iter().map(|day| day.amount).sum();
        let average = if window.is_empty() {
            0
        } else {
            (total as f64 / window.len() as f64).round() as u64
        };

        Self {
            average,
            best_day: window.iter().map(|day| day.amount).max().unwrap_or(0),
            goals_met: window
                .iter()
                .filter(|day| day.amount >= u64::from(daily_goal))
                .count(),
            active_days: window.iter().filter(|day| day.amount > 0).count(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    GoalReached,
    AlmostThere,
    Halfway,
}

impl Milestone {
    /// Translation key of the congratulation message
    pub fn message_key(self) -> &'static str {
        match self {
            Milestone::GoalReached => "goalReached",
            Milestone::AlmostThere => "almostThere",
            Milestone::Halfway => "halfway",
        }
    }
}

/// How far a day's intake is towards the daily goal
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub consumed: u64,
    pub goal: u32,
    /// Capped at 100
    pub percentage: f64,
    pub remaining: u64,
    pub milestone: Option<Milestone>,
}

impl Progress {
    pub fn new(consumed: u64, goal: u32) -> Self {
        let ratio = if goal == 0 {
            1.0
        } else {
            consumed as f64 / f64::from(goal)
        };
        let milestone = match ratio {
            r if r >= 1.0 => Some(Milestone::GoalReached),
            r if r >= 0.75 => Some(Milestone::AlmostThere),
            r if r >= 0.5 => Some(Milestone::Halfway),
            _ => None,
        };

        Self {
            consumed,
            goal,
            percentage: (ratio * 100.0).min(100.0),
            remaining: u64::from(goal).saturating_sub(consumed),
            milestone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(amount: u32, date: &str) -> HydrationEntry {
        HydrationEntry {
            id: format!("{date}-{amount}"),
            amount,
            timestamp: 0,
            date: date.to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_total_sums_only_matching_dates() {
        let entries = vec![
            entry(250, "2024-05-01"),
            entry(500, "2024-05-01"),
            entry(300, "2024-05-02"),
        ];

        assert_eq!(date_total(&entries, "2024-05-01"), 750);
        assert_eq!(date_total(&entries, "2024-05-02"), 300);
        assert_eq!(date_total(&entries, "2024-05-03"), 0);
        assert_eq!(date_total(&entries, "not a date"), 0);
    }

    #[test]
    fn monthly_window_is_thirty_contiguous_days_ending_today() {
        let today = day(2024, 3, 1);
        let window = monthly_data(&[], today);

        assert_eq!(window.len(), 30);
        assert_eq!(window.first().unwrap().date, "2024-02-01");
        assert_eq!(window.last().unwrap().date, "2024-03-01");
        assert!(window.iter().all(|d| d.amount == 0));

        for pair in window.windows(2) {
            let a = NaiveDate::parse_from_str(&pair[0].date, "%Y-%m-%d").unwrap();
            let b = NaiveDate::parse_from_str(&pair[1].date, "%Y-%m-%d").unwrap();
            assert_eq!(b - a, chrono::Duration::days(1));
        }
    }

    #[test]
    fn monthly_window_ignores_entries_outside_it() {
        let today = day(2024, 6, 30);
        let entries = vec![
            // newest entry first to show output order is calendar order
            entry(100, "2024-06-30"),
            entry(200, "2024-06-01"),
            entry(400, "2024-05-31"),
            entry(800, "2024-07-01"),
            entry(50, "2024-06-01"),
        ];

        let window = monthly_data(&entries, today);
        assert_eq!(window[0], DailyTotal { date: "2024-06-01".into(), amount: 250 });
        assert_eq!(window[29], DailyTotal { date: "2024-06-30".into(), amount: 100 });

        let inside: u64 = window.iter().map(|d| d.amount).sum();
        assert_eq!(inside, 350);
    }

    #[test]
    fn recent_days_takes_the_newest_buckets() {
        let window = monthly_data(&[], day(2024, 6, 30));

        let recent = recent_days(&window, CHART_DAYS);
        assert_eq!(recent.len(), 14);
        assert_eq!(recent[0].date, "2024-06-17");
        assert_eq!(recent_days(&window, 100).len(), 30);
    }

    #[test]
    fn monthly_stats_match_the_chart_cards() {
        let today = day(2024, 6, 30);
        let entries = vec![
            entry(2000, "2024-06-30"),
            entry(1000, "2024-06-29"),
            entry(1500, "2024-06-29"),
            entry(500, "2024-06-10"),
        ];
        let window = monthly_data(&entries, today);

        let stats = MonthlyStats::from_window(&window, 2000);
        assert_eq!(
            stats,
            MonthlyStats {
                average: 167,
                best_day: 2500,
                goals_met: 2,
                active_days: 3,
            }
        );
        assert_eq!(MonthlyStats::from_window(&[], 2000).average, 0);
    }

    #[test]
    fn progress_thresholds() {
        assert_eq!(Progress::new(0, 2000).milestone, None);
        assert_eq!(Progress::new(999, 2000).milestone, None);
        assert_eq!(Progress::new(1000, 2000).milestone, Some(Milestone::Halfway));
        assert_eq!(Progress::new(1500, 2000).milestone, Some(Milestone::AlmostThere));
        assert_eq!(Progress::new(2000, 2000).milestone, Some(Milestone::GoalReached));

        let over = Progress::new(2600, 2000);
        assert_eq!(over.percentage, 100.0);
        assert_eq!(over.remaining, 0);

        let partial = Progress::new(500, 2000);
        assert_eq!(partial.percentage, 25.0);
        assert_eq!(partial.remaining, 1500);
    }
}
