use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::TrackerConfig;

pub const LOG_FILE_PREFIX: &str = "hydrate-tracker.log";
pub const ENV_SENTRY_DSN: &str = "SENTRY_DSN";

/// Keeps log writers alive. Drop it last, after the store has been shut down.
pub struct LogGuards {
    _file: WorkerGuard,
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Daily log files in the log directory at `RUST_LOG` level (default `info`),
/// warnings and errors on stderr, and error events to Sentry when `SENTRY_DSN` is set.
pub fn init(config: &TrackerConfig) -> anyhow::Result<LogGuards> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let sentry_guard = std::env::var(ENV_SENTRY_DSN)
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(
            sentry_guard
                .as_ref()
                .map(|_| sentry::integrations::tracing::layer()),
        )
        .try_init()?;

    Ok(LogGuards {
        _file: file_guard,
        _sentry: sentry_guard,
    })
}
