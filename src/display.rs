//! Live terminal readout of tracker statistics.
//!
//! The display reads one [`StatsSnapshot`] per interval tick and redraws a
//! single status line in place. It knows nothing about the tracker beyond the
//! snapshot it is handed.

use crate::core::tracker::StatsSnapshot;
use std::io::{self, Write};

/// Redraws one status line per tick using carriage return + erase-line.
pub struct LiveDisplay {
    stdout: io::Stdout,
}

impl LiveDisplay {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    /// Redraw the stats line in place.
    pub fn render(&mut self, stats: &StatsSnapshot) -> io::Result<()> {
        let mut out = self.stdout.lock();
        write!(
            out,
            "\r\x1b[2KAPM {:>4}  EAPM {:>4}  |  peak {}/{}  |  avg {:.1}/{:.1}  |  intervals {}",
            stats.current_apm,
            stats.current_eapm,
            stats.peak_apm,
            stats.peak_eapm,
            stats.average_apm,
            stats.average_eapm,
            stats.completed_intervals,
        )?;
        out.flush()
    }

    /// Terminate the in-place line so subsequent output starts fresh.
    pub fn finish(&mut self) -> io::Result<()> {
        let mut out = self.stdout.lock();
        writeln!(out)?;
        out.flush()
    }
}

impl Default for LiveDisplay {
    fn default() -> Self {
        Self::new()
    }
}
