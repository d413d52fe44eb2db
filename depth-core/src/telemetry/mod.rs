//! Poll diagnostics kept in a fixed-size ring.

use core::fmt;

use heapless::HistoryBuf;

use crate::mission::{MissionPhase, PollOutcome, PollReport};

/// Number of records retained by [`DiagnosticLog`].
pub const DIAGNOSTIC_CAPACITY: usize = 32;

/// One poll, stamped with its tick number.
///
/// Renders as a single `key=value` line, e.g.
/// `tick=12 depth=-35 delta=+25 ascent=41% status=ascending alarm=rate fired=-30`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagnosticRecord {
    pub tick: u32,
    pub report: PollReport,
}

impl DiagnosticRecord {
    #[must_use]
    pub const fn new(tick: u32, report: PollReport) -> Self {
        Self { tick, report }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.report;
        let status = match (report.outcome, report.phase) {
            (PollOutcome::Halted, _) => "halted",
            (_, MissionPhase::Complete) => "complete",
            (PollOutcome::Idle, MissionPhase::Ascending) => "idle",
            (PollOutcome::Moved, MissionPhase::Ascending) => "ascending",
        };

        write!(
            f,
            "tick={} depth={} delta={:+} ascent={}% status={}",
            self.tick, report.depth, report.delta, report.ascent, status
        )?;
        if report.clamped {
            f.write_str(" clamp=floor")?;
        }
        if report.rate_exceeded {
            f.write_str(" alarm=rate")?;
        }
        for (index, threshold) in report.fired.iter().enumerate() {
            let prefix = if index == 0 { " fired=" } else { "," };
            write!(f, "{prefix}{}", threshold.depth)?;
        }
        Ok(())
    }
}

/// Ring of the most recent diagnostic records.
pub struct DiagnosticLog {
    records: HistoryBuf<DiagnosticRecord, DIAGNOSTIC_CAPACITY>,
    next_tick: u32,
}

impl DiagnosticLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: HistoryBuf::new(),
            next_tick: 0,
        }
    }

    /// Stamps `report` with the next tick and stores it, evicting the oldest
    /// record once full. Idle polls advance the tick but are not retained.
    pub fn record(&mut self, report: PollReport) -> Option<&DiagnosticRecord> {
        let tick = self.next_tick;
        self.next_tick = self.next_tick.wrapping_add(1);
        if report.outcome == PollOutcome::Idle {
            return None;
        }
        self.records.write(DiagnosticRecord::new(tick, report));
        self.records.recent()
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.oldest_ordered()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&DiagnosticRecord> {
        self.records.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.recent().is_none()
    }

    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.next_tick
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.next_tick = 0;
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}
