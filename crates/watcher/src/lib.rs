//! Blue/green access-log watcher.
//!
//! Tails the nginx access log and raises cooldown-gated Slack alerts when
//!
//! - the share of 5xx-looking upstream outcomes in a sliding window of recent
//!   requests reaches a threshold,
//! - nginx fails over between upstreams inside a single request, or
//! - the pool serving traffic changes (blue/green switch).
//!
//! All detector state lives in one [`Monitor`] owned by a single task; the
//! [`LogTailer`] feeds it raw lines over a channel.

pub mod config;
pub mod detect;
pub mod monitor;
pub mod parser;
pub mod tail;
pub mod window;

pub use config::{ConfigError, WatcherConfig};
pub use monitor::{Monitor, MonitorStats};
pub use parser::{parse_line, LogRecord};
pub use tail::{LogTailer, TailState, TailTimings};
pub use window::SlidingWindow;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use notify::{Notifier, NotifyChannel, SlackChannel};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Build the notifier described by `config`.
#[must_use]
pub fn build_notifier(config: &WatcherConfig) -> Notifier {
    match (&config.slack_webhook_url, config.notify_disabled) {
        (Some(url), false) => {
            let slack: Arc<dyn NotifyChannel> = Arc::new(SlackChannel::new(url.clone()));
            Notifier::with_channels(vec![slack], config.alert_cooldown, config.webhook_timeout)
        }
        _ => Notifier::disabled(config.alert_cooldown),
    }
}

/// Feed tailed lines into `monitor` until the tail task ends or `shutdown`
/// resolves.
///
/// `shutdown` is polled across iterations, so a signal that arrives while a
/// line is being processed is acted on as soon as that line is done.
pub async fn run_watcher<S>(
    mut monitor: Monitor,
    mut lines: mpsc::Receiver<String>,
    mut tail: JoinHandle<Result<()>>,
    shutdown: S,
) -> Result<MonitorStats>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(line) = lines.recv() => {
                monitor.process_line(&line).await;
            }
            result = &mut tail => {
                let stats = monitor.stats();
                info!(lines = stats.lines, records = stats.records, "Tail loop exited");
                return match result {
                    Ok(Ok(())) => Ok(stats),
                    Ok(Err(e)) => {
                        error!(error = %e, "Tail loop failed");
                        Err(e)
                    }
                    Err(e) => {
                        warn!(error = %e, "Tail loop panicked");
                        Err(e.into())
                    }
                };
            }
            () = &mut shutdown => {
                let stats = monitor.stats();
                info!(
                    lines = stats.lines,
                    records = stats.records,
                    alerts_raised = stats.alerts_raised,
                    alerts_sent = stats.alerts_sent,
                    "Shutdown requested, stopping watcher"
                );
                tail.abort();
                return Ok(stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn switch_line(pool: &str) -> String {
        format!("pool={pool} release={pool}-1 upstream_status=200 upstream=10.0.0.1:80")
    }

    #[test]
    fn test_notifier_follows_config() {
        let mut config = WatcherConfig::default();
        assert!(!build_notifier(&config).has_channels());

        config.slack_webhook_url = Some("https://hooks.example/abc".to_string());
        assert_eq!(build_notifier(&config).channel_count(), 1);

        config.notify_disabled = true;
        assert!(!build_notifier(&config).has_channels());
    }

    #[tokio::test]
    async fn test_shutdown_during_webhook_call_is_not_lost() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let config = WatcherConfig {
            slack_webhook_url: Some(server.uri()),
            ..WatcherConfig::default()
        };
        let monitor = Monitor::new(&config, build_notifier(&config));

        let (line_tx, line_rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        // stands in for a tail loop that never finishes on its own
        let tail = tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let run = tokio::spawn(run_watcher(monitor, line_rx, tail, async {
            stop_rx.await.ok();
        }));

        line_tx.send(switch_line("blue")).await.unwrap();
        line_tx.send(switch_line("green")).await.unwrap();

        // fire while the pool switch alert is still waiting on the webhook
        while server.received_requests().await.unwrap_or_default().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        stop_tx.send(()).unwrap();

        let stats = timeout(Duration::from_secs(5), run)
            .await
            .expect("shutdown was not observed")
            .unwrap()
            .unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.alerts_sent, 1);
    }

    #[tokio::test]
    async fn test_run_returns_tail_error() {
        let config = WatcherConfig::default();
        let monitor = Monitor::new(&config, build_notifier(&config));
        let (_line_tx, line_rx) = mpsc::channel::<String>(1);
        let tail = tokio::spawn(async { Err(anyhow::anyhow!("failed to open log file")) });

        let result = run_watcher(monitor, line_rx, tail, std::future::pending()).await;
        assert!(result.unwrap_err().to_string().contains("failed to open"));
    }
}
