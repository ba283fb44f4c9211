//! nginx access-log line parsing.
//!
//! The upstream nginx `log_format` appends routing fields to every line:
//!
//! ```text
//! ... pool=blue release=blue-1.0.3 upstream_status=502, 200 upstream=172.18.0.2:3000, 172.18.0.3:3000 ...
//! ```
//!
//! Only those four fields are extracted; everything else on the line is ignored.

use regex::Regex;
use std::sync::LazyLock;

/// Value nginx writes for `$upstream_status` when no upstream was contacted.
pub const NO_UPSTREAM: &str = "-";

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"pool=(?P<pool>\w+)\s+release=(?P<release>[\w.-]+)\s+upstream_status=(?P<upstream_status>[\d,\s-]+)\s+upstream=(?P<upstream>[\d.:,\s]+)",
    )
    .expect("access log pattern is valid")
});

/// Routing fields of one access-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub pool: String,
    pub release: String,
    /// Raw `$upstream_status`, one status per attempt.
    pub upstream_status: String,
    /// Upstream addresses in attempt order.
    pub upstreams: Vec<String>,
    pub failover_detected: bool,
}

impl LogRecord {
    /// Status of the final upstream attempt, or `None` when no upstream was
    /// contacted.
    #[must_use]
    pub fn final_status(&self) -> Option<&str> {
        let raw = self.upstream_status.trim();
        if raw.is_empty() || raw == NO_UPSTREAM {
            return None;
        }
        raw.rsplit(',').next().map(str::trim)
    }
}

/// Parse one access-log line. Lines without the routing fields yield `None`.
#[must_use]
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = LINE_PATTERN.captures(line)?;

    let upstreams: Vec<String> = caps["upstream"]
        .split(',')
        .map(|u| u.trim().to_string())
        .collect();
    let failover_detected = upstreams.len() > 1;

    Some(LogRecord {
        pool: caps["pool"].to_string(),
        release: caps["release"].to_string(),
        upstream_status: caps["upstream_status"].to_string(),
        upstreams,
        failover_detected,
    })
}
