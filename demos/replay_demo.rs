//! Demonstration of the tracking pipeline on synthetic input.
//!
//! This example shows how to:
//! 1. Create an ActionTracker
//! 2. Feed it key presses and clicks
//! 3. Tick intervals and render the live readout
//! 4. Build a session report
//!
//! Run with: cargo run --example replay_demo
//!
//! No hooks are installed; the input is replayed, so it works anywhere.

use std::thread;
use std::time::Duration;

use apm_meter::{
    collector::types::{KeyId, MouseButton},
    core::ActionTracker,
    display::LiveDisplay,
    report::ReportBuilder,
    VERSION,
};

fn main() {
    println!("APM Meter - Replay Demo (v{VERSION})");
    println!("====================================");
    println!();

    let mut tracker = ActionTracker::new();
    let mut display = LiveDisplay::new();
    let report_builder = ReportBuilder::new();
    let interval = Duration::from_millis(500);

    println!("Session ID: {}", report_builder.session_id());
    println!();

    // Each entry is one interval's worth of synthetic input:
    // (distinct key presses, repeats of the last key, clicks)
    let script: &[(u32, u32, u32)] = &[
        (4, 0, 1),
        (9, 0, 0),
        (2, 6, 0), // held key auto-repeating
        (0, 0, 0), // idle interval
        (12, 0, 3),
    ];

    for (tick, &(distinct, repeats, clicks)) in script.iter().enumerate() {
        for code in 0..distinct {
            tracker.on_keyboard_press(KeyId(code));
        }
        for _ in 0..repeats {
            tracker.on_keyboard_press(KeyId(distinct.saturating_sub(1)));
        }
        for _ in 0..clicks {
            tracker.on_mouse_click(MouseButton::Left);
        }

        let stats = tracker.snapshot();
        display.render(&stats).expect("Failed to write display");
        tracker.complete_interval();

        if tick + 1 < script.len() {
            thread::sleep(interval);
        }
    }

    display.finish().expect("Failed to write display");
    println!();
    println!("{}", tracker.summary());
    println!();

    // Show the session report JSON
    let report = report_builder.build(&tracker, interval);
    let json = serde_json::to_string_pretty(&report).unwrap();
    println!("Session report:");
    for line in json.lines() {
        println!("  {line}");
    }
    println!();
    println!("Demo complete!");
}
