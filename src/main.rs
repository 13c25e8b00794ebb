use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hydrate_tracker::{
    aggregate::{recent_days, CHART_DAYS},
    commands::{self, CommandError, PRESET_GOALS, QUICK_ADD_AMOUNTS},
    config::TrackerConfig,
    i18n::translate,
    logging, HydrationStore, Language,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Log water intake and track it against a daily goal")]
struct Cli {
    /// Directory holding the saved data (overrides config and HYDRATE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a drink, in milliliters
    Add { amount: u32 },
    /// Log one of the quick-add sizes (250, 500 or 750 ml)
    Quick {
        #[arg(value_parser = quick_amount)]
        amount: u32,
    },
    /// Set the daily goal, in milliliters
    Goal { goal: u32 },
    /// Set the display language
    Language { language: Language },
    /// Today's summary
    Today,
    /// Total for one day
    Day { date: String },
    /// Daily totals, newest days of the last 30
    Month {
        #[arg(long, default_value_t = CHART_DAYS)]
        days: usize,
    },
    /// Statistics over the last 30 days
    Stats,
    /// Every logged drink
    History,
}

fn quick_amount(raw: &str) -> Result<u32, String> {
    let amount: u32 = raw.parse().map_err(|e| format!("{e}"))?;
    if QUICK_ADD_AMOUNTS.contains(&amount) {
        Ok(amount)
    } else {
        Err(format!("quick-add amounts are {QUICK_ADD_AMOUNTS:?}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = TrackerConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let log_guards = logging::init(&config)?;
    info!(data_dir = ?config.data_dir, "Starting hydrate-tracker");

    let store = HydrationStore::from_config(&config);
    store.load_data().await;

    let result = run(&store, cli.command);
    let language = store.language();

    store.shutdown().await;

    if let Err(error) = result {
        eprintln!(
            "{}: {}",
            translate("error", language),
            error.localized(language)
        );
        drop(log_guards);
        std::process::exit(1);
    }

    Ok(())
}

fn run(store: &HydrationStore, command: Command) -> Result<(), CommandError> {
    let t = |key: &'static str| translate(key, store.language());

    match command {
        Command::Add { amount } | Command::Quick { amount } => {
            let receipt = commands::record_drink(store, amount)?;
            println!("+{} ml ({})", receipt.entry.amount, receipt.entry.date);
            println!(
                "{}: {} / {} ml ({:.0}%)",
                t("consumed"),
                receipt.progress.consumed,
                receipt.progress.goal,
                receipt.progress.percentage
            );
            if let Some(milestone) = receipt.progress.milestone {
                println!("{}", t(milestone.message_key()));
            }
        }
        Command::Goal { goal } => {
            commands::update_daily_goal(store, goal)?;
            println!("{} ({goal} ml)", t("goalUpdated"));
        }
        Command::Language { language } => {
            store.set_language(language);
            println!("{}: {language}", translate("language", language));
        }
        Command::Today => {
            let progress = store.today_progress();
            println!("{}", t("todaySummary"));
            println!("  {}: {} ml", t("consumed"), progress.consumed);
            println!("  {}: {} ml", t("remaining"), progress.remaining);
            println!("  {}: {:.0}%", t("progress"), progress.percentage);
            println!("  {}: {} ml", t("currentGoal"), progress.goal);
            if !PRESET_GOALS.contains(&progress.goal) {
                println!("  {}: {PRESET_GOALS:?}", t("recommendedGoals"));
            }
        }
        Command::Day { date } => {
            let total = commands::day_total(store, &date)?;
            println!("{date}: {total} ml");
        }
        Command::Month { days } => {
            let goal = u64::from(store.daily_goal());
            let window = store.monthly_data();
            println!("{}", t("monthlyProgress"));
            for day in recent_days(&window, days) {
                let mark = if day.amount >= goal { "*" } else { " " };
                println!("{mark} {}  {:>5} ml", day.date, day.amount);
            }
        }
        Command::Stats => {
            let stats = store.monthly_stats();
            println!("{}", t("monthlyProgress"));
            println!("  {}: {} ml", t("average"), stats.average);
            println!("  {}: {} ml", t("bestDay"), stats.best_day);
            println!("  {}: {}", t("goalsMet"), stats.goals_met);
            println!("  {}: {}", t("activeDays"), stats.active_days);
            println!("  {}: {} ml", t("dailyGoal"), store.daily_goal());
        }
        Command::History => {
            let drinks = commands::list_drinks(store);
            if drinks.is_empty() {
                println!("{}", t("noEntries"));
            }
            for drink in drinks {
                println!("{}  {:>5} ml  {}", drink.date, drink.amount, drink.id);
            }
        }
    }

    Ok(())
}
