//! Effectiveness policies: which raw actions count toward EAPM.
//!
//! The tracker treats the rule as pluggable. The default collapses immediate
//! repeats of the same action; identity is exact equality of the opaque
//! [`ActionId`].

use crate::collector::types::ActionId;

/// Decides whether a raw action contributes to the effective count.
///
/// Policies may keep per-interval state; `reset` is called every time an
/// interval completes.
pub trait EffectivenessPolicy: Send {
    /// Observe the next action in the current interval. Returns `true` when
    /// the action should count as effective.
    fn observe(&mut self, action: ActionId) -> bool;

    /// Clear any per-interval state.
    fn reset(&mut self);
}

/// Collapses consecutive repeats of the identical action into a single
/// effective contribution.
#[derive(Debug, Default)]
pub struct CollapseRepeats {
    last: Option<ActionId>,
}

impl CollapseRepeats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectivenessPolicy for CollapseRepeats {
    fn observe(&mut self, action: ActionId) -> bool {
        let effective = self.last != Some(action);
        self.last = Some(action);
        effective
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Counts every raw action as effective.
#[derive(Debug, Default)]
pub struct CountAll;

impl EffectivenessPolicy for CountAll {
    fn observe(&mut self, _action: ActionId) -> bool {
        true
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{KeyId, MouseButton};

    #[test]
    fn test_collapse_repeats_basic() {
        let mut policy = CollapseRepeats::new();
        let a = ActionId::Key(KeyId(1));
        let b = ActionId::Key(KeyId(2));

        assert!(policy.observe(a));
        assert!(!policy.observe(a));
        assert!(!policy.observe(a));
        assert!(policy.observe(b));
        assert!(policy.observe(a));
    }

    #[test]
    fn test_collapse_repeats_reset_forgets_last_action() {
        let mut policy = CollapseRepeats::new();
        let a = ActionId::Button(MouseButton::Left);

        assert!(policy.observe(a));
        policy.reset();
        assert!(policy.observe(a));
    }

    #[test]
    fn test_key_and_button_are_distinct_actions() {
        let mut policy = CollapseRepeats::new();

        assert!(policy.observe(ActionId::Key(KeyId(5))));
        assert!(policy.observe(ActionId::Button(MouseButton::Left)));
        assert!(policy.observe(ActionId::Key(KeyId(5))));
    }

    #[test]
    fn test_count_all_never_filters() {
        let mut policy = CountAll;
        let a = ActionId::Key(KeyId(9));

        assert!(policy.observe(a));
        assert!(policy.observe(a));
    }
}
