//! Core tracking logic: action counting, repeat collapsing, and derived
//! statistics.

pub mod dedup;
pub mod tracker;

pub use dedup::{CollapseRepeats, CountAll, EffectivenessPolicy};
pub use tracker::{ActionTracker, StatsSnapshot};
