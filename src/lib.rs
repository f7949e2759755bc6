//! APM Meter - live actions-per-minute gauge for keyboard and mouse input.
//!
//! This library counts a user's raw input actions (key presses and mouse
//! clicks) and their "effective" subset (immediate repeats collapsed), then
//! derives per-interval, peak, and average statistics for a live display.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         APM Meter                          │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌──────────────┐   ┌─────────────┐      │
//! │  │  Collector  │──▶│ ActionTracker│──▶│   Display   │      │
//! │  │ (OS hooks)  │   │ (1s ticks)   │   │ (stats line)│      │
//! │  └─────────────┘   └──────────────┘   └─────────────┘      │
//! │                           │                                │
//! │                           ▼                                │
//! │                    ┌─────────────┐                         │
//! │                    │   Session   │                         │
//! │                    │   Report    │                         │
//! │                    └─────────────┘                         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use apm_meter::core::ActionTracker;
//! use apm_meter::collector::types::KeyId;
//!
//! let mut tracker = ActionTracker::new();
//! tracker.on_keyboard_press(KeyId(30));
//! tracker.on_keyboard_press(KeyId(30)); // repeat: raw but not effective
//!
//! assert_eq!(tracker.current_apm(), 2);
//! assert_eq!(tracker.current_eapm(), 1);
//!
//! // An external timer closes each interval.
//! tracker.complete_interval();
//! assert_eq!(tracker.apm_history(), &[2]);
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod display;
pub mod report;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorConfig, CollectorError, InputEvent};
pub use config::{Config, SourceConfig};
pub use core::{ActionTracker, CollapseRepeats, EffectivenessPolicy, StatsSnapshot};
pub use display::LiveDisplay;
pub use report::{ReportBuilder, SessionReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
