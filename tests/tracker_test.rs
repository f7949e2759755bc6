//! Integration tests for the tracking pipeline: events in, statistics out.

use apm_meter::collector::types::{InputEvent, KeyId, KeyboardEvent, MouseButton, MouseEvent};
use apm_meter::core::ActionTracker;
use apm_meter::report::ReportBuilder;
use std::time::Duration;

/// Feed a full synthetic session through the tracker the way the main loop
/// does: record events, tick intervals, read the snapshot each tick.
#[test]
fn test_multi_interval_session() {
    let mut tracker = ActionTracker::new();

    // Interval 1: a four-key burst plus a click
    for code in [10, 11, 12, 13] {
        tracker.record(&InputEvent::Keyboard(KeyboardEvent::new(KeyId(code))));
    }
    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Left)));

    let tick1 = tracker.snapshot();
    assert_eq!(tick1.current_apm, 5);
    assert_eq!(tick1.current_eapm, 5);
    assert_eq!(tick1.peak_apm, 5);
    assert_eq!(tick1.average_apm, 5.0);
    tracker.complete_interval();

    // Interval 2: held key auto-repeating
    for _ in 0..8 {
        tracker.record(&InputEvent::Keyboard(KeyboardEvent::new(KeyId(30))));
    }

    let tick2 = tracker.snapshot();
    assert_eq!(tick2.current_apm, 8);
    assert_eq!(tick2.current_eapm, 1);
    assert_eq!(tick2.peak_apm, 8);
    assert_eq!(tick2.peak_eapm, 5);
    tracker.complete_interval();

    // Interval 3: idle
    let tick3 = tracker.snapshot();
    assert_eq!(tick3.current_apm, 0);
    assert_eq!(tick3.average_apm, 6.5); // (5 + 8 + 0) / 2 completed intervals
    tracker.complete_interval();

    assert_eq!(tracker.apm_history(), &[5, 8, 0]);
    assert_eq!(tracker.eapm_history(), &[5, 1, 0]);
    assert_eq!(tracker.cumulative_actions(), 13);
    assert_eq!(tracker.cumulative_effective_actions(), 6);
}

#[test]
fn test_repeats_collapse_only_within_an_interval() {
    let mut tracker = ActionTracker::new();

    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Left)));
    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Left)));
    assert_eq!(tracker.current_eapm(), 1);
    tracker.complete_interval();

    // The same button right after the boundary is effective again.
    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Left)));
    assert_eq!(tracker.current_eapm(), 1);

    // Alternation is always effective.
    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Right)));
    tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Left)));
    assert_eq!(tracker.current_eapm(), 3);
    assert_eq!(tracker.current_apm(), 3);
}

#[test]
fn test_snapshot_matches_report_summary() {
    let mut tracker = ActionTracker::new();
    for code in 0..3 {
        tracker.record(&InputEvent::Keyboard(KeyboardEvent::new(KeyId(code))));
    }
    tracker.complete_interval();

    let report = ReportBuilder::new().build(&tracker, Duration::from_secs(1));
    assert_eq!(report.summary, tracker.snapshot());
    assert_eq!(report.apm_per_interval, tracker.apm_history());
    assert_eq!(report.eapm_per_interval, tracker.eapm_history());
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod collector_tests {
    use apm_meter::collector::{check_permission, Collector, CollectorConfig};

    #[test]
    fn test_collector_lifecycle() {
        let mut collector = Collector::new(CollectorConfig::default());
        assert!(!collector.is_running());

        collector.start().expect("Failed to start collector");
        assert!(collector.is_running());

        // Starting twice is an error
        assert!(collector.start().is_err());

        collector.stop();
        assert!(!collector.is_running());
    }

    #[test]
    fn test_fallback_collector_emits_nothing() {
        let mut collector = Collector::new(CollectorConfig::default());
        collector.start().expect("Failed to start collector");
        assert!(collector.try_recv().is_none());
        collector.stop();
    }

    #[test]
    fn test_permission_check_is_open_on_fallback() {
        assert!(check_permission());
    }
}
