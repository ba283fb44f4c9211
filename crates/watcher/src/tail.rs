//! Follows the access log as nginx appends to it.
//!
//! The follower waits for the file to appear, opens it once, seeks to the end
//! and forwards every complete line it reads afterwards. Historical content is
//! never replayed.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, SeekFrom};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Sleep intervals of the follow loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailTimings {
    /// Between existence checks while the file is missing.
    pub file_poll: Duration,
    /// After a read that found no new data.
    pub idle: Duration,
    /// After a read error.
    pub error_backoff: Duration,
}

impl Default for TailTimings {
    fn default() -> Self {
        Self {
            file_poll: Duration::from_secs(2),
            idle: Duration::from_millis(500),
            error_backoff: Duration::from_secs(1),
        }
    }
}

/// Lifecycle of the follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    WaitingForFile,
    Streaming,
}

/// Tails one file and pushes new lines into a channel.
#[derive(Debug, Clone)]
pub struct LogTailer {
    path: PathBuf,
    timings: TailTimings,
}

impl LogTailer {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, timings: TailTimings) -> Self {
        Self {
            path: path.into(),
            timings,
        }
    }

    /// Run until the receiving side goes away.
    ///
    /// Only a failure to open the file once it exists ends the loop early.
    pub async fn follow(&self, lines: mpsc::Sender<String>) -> Result<()> {
        let mut state = TailState::WaitingForFile;
        debug!(path = %self.path.display(), ?state, "Tail loop starting");

        self.wait_for_file().await;
        let reader = open_at_end(&self.path).await?;

        state = TailState::Streaming;
        info!(path = %self.path.display(), ?state, "Streaming new log lines");

        stream_lines(reader, self.timings, lines).await;
        Ok(())
    }

    /// Poll until the file exists.
    pub async fn wait_for_file(&self) {
        let mut announced = false;
        loop {
            if fs::metadata(&self.path).await.is_ok() {
                return;
            }
            if !announced {
                info!(path = %self.path.display(), "Waiting for log file to be created");
                announced = true;
            } else {
                debug!(path = %self.path.display(), "Log file still missing");
            }
            sleep(self.timings.file_poll).await;
        }
    }
}

/// Open `path` positioned at its current end.
pub async fn open_at_end(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::End(0))
        .await
        .with_context(|| format!("failed to seek to end of {}", path.display()))?;

    Ok(reader)
}

/// Forward complete lines from `reader` until `lines` is closed.
///
/// A line read without its newline means the writer is mid-append; the
/// fragment is held back as raw bytes until the rest arrives. Bytes are only
/// decoded once the line is complete, so a multibyte character split across
/// two writes survives, and invalid sequences become U+FFFD.
pub async fn stream_lines(
    mut reader: BufReader<File>,
    timings: TailTimings,
    lines: mpsc::Sender<String>,
) {
    let mut pending: Vec<u8> = Vec::new();

    loop {
        match reader.read_until(b'\n', &mut pending).await {
            Ok(0) => sleep(timings.idle).await,
            Ok(_) if pending.last() != Some(&b'\n') => sleep(timings.idle).await,
            Ok(_) => {
                let raw = std::mem::take(&mut pending);
                let decoded = String::from_utf8_lossy(&raw);
                if matches!(decoded, Cow::Owned(_)) {
                    debug!(bytes = raw.len(), "Replaced invalid UTF-8 in log line");
                }
                let line = decoded.trim_end_matches(['\n', '\r']).to_string();
                if lines.send(line).await.is_err() {
                    debug!("Line receiver dropped, stopping tail loop");
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading log file");
                sleep(timings.error_backoff).await;
            }
        }
    }
}
