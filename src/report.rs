//! Session report: a one-shot JSON export of a finished session.
//!
//! Written at shutdown when `--export` is given. The report is write-only;
//! the tracker never reads it back.

use crate::core::tracker::{ActionTracker, StatsSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// The current report format version.
pub const REPORT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "apm-meter";

/// A finished session's per-interval history plus its summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Producer name
    pub producer: String,
    /// Report format version
    pub version: String,
    /// Unique id for this session
    pub session_id: Uuid,
    /// Device label (hostname)
    pub device: String,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session finished
    pub finished_at: DateTime<Utc>,
    /// Interval length used for the session, in seconds
    pub interval_secs: u64,
    /// Raw action count per completed interval
    pub apm_per_interval: Vec<u64>,
    /// Effective action count per completed interval
    pub eapm_per_interval: Vec<u64>,
    /// Final derived statistics
    pub summary: StatsSnapshot,
}

/// Builds session reports. Created once at session start so the session id
/// and start time are stable.
pub struct ReportBuilder {
    session_id: Uuid,
    device: String,
    started_at: DateTime<Utc>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        let device = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            session_id: Uuid::new_v4(),
            device,
            started_at: Utc::now(),
        }
    }

    /// Get this session's unique id.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Build a report from the tracker's current state.
    pub fn build(&self, tracker: &ActionTracker, interval: Duration) -> SessionReport {
        SessionReport {
            producer: PRODUCER_NAME.to_string(),
            version: REPORT_VERSION.to_string(),
            session_id: self.session_id,
            device: self.device.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            interval_secs: interval.as_secs(),
            apm_per_interval: tracker.apm_history().to_vec(),
            eapm_per_interval: tracker.eapm_history().to_vec(),
            summary: tracker.snapshot(),
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a report as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &SessionReport) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::KeyId;

    #[test]
    fn test_report_carries_tracker_history() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(1));
        tracker.on_keyboard_press(KeyId(2));
        tracker.complete_interval();
        tracker.on_keyboard_press(KeyId(3));
        tracker.complete_interval();

        let builder = ReportBuilder::new();
        let report = builder.build(&tracker, Duration::from_secs(1));

        assert_eq!(report.producer, PRODUCER_NAME);
        assert_eq!(report.apm_per_interval, vec![2, 1]);
        assert_eq!(report.eapm_per_interval, vec![2, 1]);
        assert_eq!(report.summary.completed_intervals, 2);
        assert_eq!(report.interval_secs, 1);
    }

    #[test]
    fn test_session_id_is_stable_across_builds() {
        let tracker = ActionTracker::new();
        let builder = ReportBuilder::new();

        let first = builder.build(&tracker, Duration::from_secs(1));
        let second = builder.build(&tracker, Duration::from_secs(1));
        assert_eq!(first.session_id, second.session_id);
        assert_eq!(first.session_id, builder.session_id());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let tracker = ActionTracker::new();
        let report = ReportBuilder::new().build(&tracker, Duration::from_secs(2));

        let json = serde_json::to_string(&report).unwrap();
        let parsed: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, REPORT_VERSION);
        assert_eq!(parsed.interval_secs, 2);
    }
}
