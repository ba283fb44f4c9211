//! Blue/green access-log watcher.
//!
//! Configuration comes from environment variables only; see
//! [`watcher::config`] for the full list.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use watcher::{build_notifier, run_watcher, LogTailer, Monitor, TailTimings, WatcherConfig};

/// Lines buffered between the tail loop and the monitor.
const LINE_BUFFER: usize = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = WatcherConfig::from_env().context("invalid watcher configuration")?;
    log_banner(&config);

    let notifier = build_notifier(&config);
    let monitor = Monitor::new(&config, notifier);

    let (line_tx, line_rx) = mpsc::channel::<String>(LINE_BUFFER);
    let tailer = LogTailer::new(&config.log_file, TailTimings::default());
    let tail_handle = tokio::spawn(async move { tailer.follow(line_tx).await });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
        }
    };
    run_watcher(monitor, line_rx, tail_handle, shutdown).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn log_banner(config: &WatcherConfig) {
    info!("Blue/Green deployment monitor starting");
    info!(
        log_file = %config.log_file.display(),
        error_rate_threshold = config.error_rate_threshold,
        window_size = config.window_size,
        alert_cooldown_secs = config.alert_cooldown.as_secs(),
        webhook_timeout_secs = config.webhook_timeout.as_secs(),
        alerts_enabled = config.alerts_enabled(),
        "Watcher configured"
    );
    if config.slack_webhook_url.is_none() {
        warn!("SLACK_WEBHOOK_URL not set, alerts will only be logged");
    } else if config.notify_disabled {
        warn!("NOTIFY_DISABLED set, alerts will only be logged");
    }
}
