//! The action tracker: interval counters and running statistics.
//!
//! Raw actions (key presses and mouse clicks) accumulate in the current
//! interval; an external timer calls [`ActionTracker::complete_interval`] once
//! per fixed wall-clock interval, which snapshots the interval's counts into
//! history and resets the counters. All derived statistics are computed on
//! demand from the histories plus the in-progress counters.

use crate::collector::types::{ActionId, InputEvent, KeyId, MouseButton};
use crate::core::dedup::{CollapseRepeats, EffectivenessPolicy};
use serde::{Deserialize, Serialize};

/// Counts raw and effective actions per interval and keeps per-interval
/// history for peak and average statistics.
///
/// "No interval completed yet" is represented by empty histories; there is no
/// sentinel counter.
pub struct ActionTracker {
    keystrokes: u64,
    mouse_clicks: u64,
    effective_actions: u64,
    apm_history: Vec<u64>,
    eapm_history: Vec<u64>,
    cumulative_actions: u64,
    cumulative_effective_actions: u64,
    policy: Box<dyn EffectivenessPolicy>,
}

impl ActionTracker {
    /// Create a tracker with the default repeat-collapsing policy.
    pub fn new() -> Self {
        Self::with_policy(Box::new(CollapseRepeats::new()))
    }

    /// Create a tracker with a custom effectiveness policy.
    pub fn with_policy(policy: Box<dyn EffectivenessPolicy>) -> Self {
        Self {
            keystrokes: 0,
            mouse_clicks: 0,
            effective_actions: 0,
            apm_history: Vec::new(),
            eapm_history: Vec::new(),
            cumulative_actions: 0,
            cumulative_effective_actions: 0,
            policy,
        }
    }

    /// Record a key press. Never fails; the key is opaque.
    pub fn on_keyboard_press(&mut self, key: KeyId) {
        self.keystrokes += 1;
        if self.policy.observe(ActionId::Key(key)) {
            self.effective_actions += 1;
        }
    }

    /// Record a mouse click. Mirrors the keyboard handler.
    pub fn on_mouse_click(&mut self, button: MouseButton) {
        self.mouse_clicks += 1;
        if self.policy.observe(ActionId::Button(button)) {
            self.effective_actions += 1;
        }
    }

    /// Dispatch a collector event to the matching handler.
    pub fn record(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Keyboard(e) => self.on_keyboard_press(e.key),
            InputEvent::Mouse(e) => self.on_mouse_click(e.button),
        }
    }

    /// Close the current interval.
    ///
    /// Appends the interval's raw and effective counts to the histories,
    /// folds them into the cumulative sums, then resets the interval counters
    /// and the policy's per-interval state.
    pub fn complete_interval(&mut self) {
        let apm = self.current_apm();
        let eapm = self.current_eapm();

        self.apm_history.push(apm);
        self.eapm_history.push(eapm);
        self.cumulative_actions += apm;
        self.cumulative_effective_actions += eapm;

        self.keystrokes = 0;
        self.mouse_clicks = 0;
        self.effective_actions = 0;
        self.policy.reset();
    }

    /// Key presses in the current (uncommitted) interval.
    pub fn keystrokes(&self) -> u64 {
        self.keystrokes
    }

    /// Mouse clicks in the current (uncommitted) interval.
    pub fn mouse_clicks(&self) -> u64 {
        self.mouse_clicks
    }

    /// Effective actions in the current (uncommitted) interval.
    pub fn effective_actions(&self) -> u64 {
        self.effective_actions
    }

    /// Number of completed intervals.
    pub fn completed_intervals(&self) -> usize {
        self.apm_history.len()
    }

    /// Raw action count per completed interval, oldest first.
    pub fn apm_history(&self) -> &[u64] {
        &self.apm_history
    }

    /// Effective action count per completed interval, oldest first.
    pub fn eapm_history(&self) -> &[u64] {
        &self.eapm_history
    }

    /// Sum of all committed raw counts.
    pub fn cumulative_actions(&self) -> u64 {
        self.cumulative_actions
    }

    /// Sum of all committed effective counts.
    pub fn cumulative_effective_actions(&self) -> u64 {
        self.cumulative_effective_actions
    }

    /// Raw actions observed in the current interval so far.
    pub fn current_apm(&self) -> u64 {
        self.keystrokes + self.mouse_clicks
    }

    /// Effective actions observed in the current interval so far.
    pub fn current_eapm(&self) -> u64 {
        self.effective_actions
    }

    /// Highest raw count ever observed, including the in-progress interval's
    /// provisional value.
    pub fn peak_apm(&self) -> u64 {
        let committed = self.apm_history.iter().copied().max().unwrap_or(0);
        committed.max(self.current_apm())
    }

    /// Highest effective count ever observed, including the in-progress
    /// interval's provisional value.
    pub fn peak_eapm(&self) -> u64 {
        let committed = self.eapm_history.iter().copied().max().unwrap_or(0);
        committed.max(self.current_eapm())
    }

    /// Average raw count per completed interval, with the in-progress value
    /// added to the numerator.
    ///
    /// Before any interval completes this is the in-progress value itself;
    /// the division only happens once at least one interval exists.
    pub fn average_apm(&self) -> f64 {
        match self.completed_intervals() {
            0 => self.current_apm() as f64,
            n => (self.cumulative_actions + self.current_apm()) as f64 / n as f64,
        }
    }

    /// Average effective count per completed interval. See [`Self::average_apm`].
    pub fn average_eapm(&self) -> f64 {
        match self.completed_intervals() {
            0 => self.current_eapm() as f64,
            n => (self.cumulative_effective_actions + self.current_eapm()) as f64 / n as f64,
        }
    }

    /// Bundle all derived statistics for the display and report boundaries.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            current_apm: self.current_apm(),
            current_eapm: self.current_eapm(),
            peak_apm: self.peak_apm(),
            peak_eapm: self.peak_eapm(),
            average_apm: self.average_apm(),
            average_eapm: self.average_eapm(),
            completed_intervals: self.completed_intervals(),
        }
    }

    /// End-of-session text block for the terminal.
    pub fn summary(&self) -> String {
        format!(
            "Session Statistics:\n\
             - Intervals completed: {}\n\
             - Total actions: {}\n\
             - Total effective actions: {}\n\
             - Peak APM: {}\n\
             - Peak EAPM: {}\n\
             - Average APM: {:.1}\n\
             - Average EAPM: {:.1}",
            self.completed_intervals(),
            self.cumulative_actions,
            self.cumulative_effective_actions,
            self.peak_apm(),
            self.peak_eapm(),
            self.average_apm(),
            self.average_eapm(),
        )
    }
}

impl Default for ActionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One reading of every derived statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub current_apm: u64,
    pub current_eapm: u64,
    pub peak_apm: u64,
    pub peak_eapm: u64,
    pub average_apm: f64,
    pub average_eapm: f64,
    pub completed_intervals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{ActionId, KeyId, MouseButton};
    use crate::core::dedup::CountAll;

    #[test]
    fn test_single_keypress() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(30));

        assert_eq!(tracker.current_apm(), 1);
        assert_eq!(tracker.current_eapm(), 1);
        assert_eq!(tracker.peak_apm(), 1);
        assert_eq!(tracker.peak_eapm(), 1);
        assert_eq!(tracker.average_apm(), 1.0);
        assert_eq!(tracker.average_eapm(), 1.0);
    }

    #[test]
    fn test_distinct_presses_before_first_interval() {
        let mut tracker = ActionTracker::new();
        for code in 0..7 {
            tracker.on_keyboard_press(KeyId(code));
        }

        assert_eq!(tracker.current_apm(), 7);
        assert_eq!(tracker.current_eapm(), 7);
        assert_eq!(tracker.completed_intervals(), 0);
    }

    #[test]
    fn test_one_completed_interval_then_quiet() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(1));
        tracker.on_keyboard_press(KeyId(2));
        tracker.on_keyboard_press(KeyId(2)); // repeat, raw only
        tracker.complete_interval();

        assert_eq!(tracker.apm_history(), &[3]);
        assert_eq!(tracker.eapm_history(), &[2]);
        assert_eq!(tracker.cumulative_actions(), 3);
        assert_eq!(tracker.cumulative_effective_actions(), 2);

        // No new actions: average equals the committed interval's count.
        assert_eq!(tracker.current_apm(), 0);
        assert_eq!(tracker.average_apm(), 3.0);
        assert_eq!(tracker.average_eapm(), 2.0);
        assert_eq!(tracker.peak_apm(), 3);
    }

    #[test]
    fn test_mixed_sources_sum_regardless_of_order() {
        let mut forward = ActionTracker::new();
        forward.on_keyboard_press(KeyId(1));
        forward.on_mouse_click(MouseButton::Left);
        forward.on_keyboard_press(KeyId(2));

        let mut reversed = ActionTracker::new();
        reversed.on_keyboard_press(KeyId(2));
        reversed.on_mouse_click(MouseButton::Left);
        reversed.on_keyboard_press(KeyId(1));

        assert_eq!(forward.current_apm(), 3);
        assert_eq!(reversed.current_apm(), 3);
        assert_eq!(forward.keystrokes(), 2);
        assert_eq!(forward.mouse_clicks(), 1);
    }

    #[test]
    fn test_derived_queries_are_idempotent() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(4));
        tracker.on_mouse_click(MouseButton::Right);
        tracker.complete_interval();
        tracker.on_keyboard_press(KeyId(4));

        let first = tracker.snapshot();
        let second = tracker.snapshot();
        assert_eq!(first, second);
        assert_eq!(tracker.peak_apm(), tracker.peak_apm());
        assert_eq!(tracker.average_apm(), tracker.average_apm());
    }

    #[test]
    fn test_invariants_after_many_intervals() {
        let mut tracker = ActionTracker::new();
        for round in 0..10u32 {
            for code in 0..=round {
                tracker.on_keyboard_press(KeyId(code));
            }
            tracker.complete_interval();
        }

        assert_eq!(tracker.completed_intervals(), 10);
        assert_eq!(tracker.apm_history().len(), tracker.eapm_history().len());
        assert_eq!(
            tracker.cumulative_actions(),
            tracker.apm_history().iter().sum::<u64>()
        );
        assert_eq!(
            tracker.cumulative_effective_actions(),
            tracker.eapm_history().iter().sum::<u64>()
        );
    }

    #[test]
    fn test_peak_includes_uncommitted_interval() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(1));
        tracker.complete_interval();

        // The in-progress interval exceeds everything committed.
        for code in 0..5 {
            tracker.on_keyboard_press(KeyId(code));
        }
        assert_eq!(tracker.peak_apm(), 5);

        tracker.complete_interval();
        assert_eq!(tracker.peak_apm(), 5);
    }

    #[test]
    fn test_repeat_collapsing_within_interval() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(8));
        tracker.on_keyboard_press(KeyId(8));
        tracker.on_keyboard_press(KeyId(8));

        assert_eq!(tracker.current_apm(), 3);
        assert_eq!(tracker.current_eapm(), 1);
    }

    #[test]
    fn test_repeat_state_clears_at_interval_boundary() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(8));
        tracker.complete_interval();

        // Same key again: a fresh interval has no preceding action.
        tracker.on_keyboard_press(KeyId(8));
        assert_eq!(tracker.current_eapm(), 1);
    }

    #[test]
    fn test_custom_policy_counts_everything() {
        let mut tracker = ActionTracker::with_policy(Box::new(CountAll));
        tracker.on_keyboard_press(KeyId(8));
        tracker.on_keyboard_press(KeyId(8));

        assert_eq!(tracker.current_eapm(), 2);
    }

    #[test]
    fn test_record_dispatches_by_event_kind() {
        use crate::collector::types::{InputEvent, KeyboardEvent, MouseEvent};

        let mut tracker = ActionTracker::new();
        tracker.record(&InputEvent::Keyboard(KeyboardEvent::new(KeyId(3))));
        tracker.record(&InputEvent::Mouse(MouseEvent::click(MouseButton::Middle)));

        assert_eq!(tracker.keystrokes(), 1);
        assert_eq!(tracker.mouse_clicks(), 1);
        assert_eq!(
            InputEvent::Mouse(MouseEvent::click(MouseButton::Middle)).action_id(),
            ActionId::Button(MouseButton::Middle)
        );
    }

    #[test]
    fn test_summary_mentions_totals() {
        let mut tracker = ActionTracker::new();
        tracker.on_keyboard_press(KeyId(1));
        tracker.complete_interval();

        let summary = tracker.summary();
        assert!(summary.contains("Intervals completed: 1"));
        assert!(summary.contains("Total actions: 1"));
        assert!(summary.contains("Peak APM: 1"));
    }
}
