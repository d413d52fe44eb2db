#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! Atomics mirror the latest poll and the hardware counters so the periodic
//! status line can read a [`StatusSnapshot`] without borrowing the monitor.

use depth_core::depth::Depth;
use depth_core::mission::{MissionPhase, PollReport};
use portable_atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

/// Last depth reported by the poll loop.
static DEPTH: AtomicI32 = AtomicI32::new(0);
/// Ascent progress as a percentage.
static ASCENT: AtomicU8 = AtomicU8::new(0);
/// Set once the surface threshold has fired.
static MISSION_COMPLETE: AtomicBool = AtomicBool::new(false);
/// Number of feedback requests dropped because the queue was full.
static DROPPED_FEEDBACK: AtomicU32 = AtomicU32::new(0);
/// Glitched encoder transitions reported by the decoder.
static GLITCHES: AtomicU32 = AtomicU32::new(0);
/// Count of floor clamps since boot.
static FLOOR_CLAMPS: AtomicU32 = AtomicU32::new(0);
/// Display writes the TM1637 did not acknowledge.
static DISPLAY_NACKS: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of the stored metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub depth: Depth,
    pub ascent: u8,
    pub mission_complete: bool,
    pub dropped_feedback: u32,
    pub glitches: u32,
    pub floor_clamps: u32,
    pub display_nacks: u32,
}

/// Mirrors the outcome of a poll.
pub fn record_report(report: &PollReport) {
    DEPTH.store(report.depth, Ordering::Relaxed);
    ASCENT.store(report.ascent, Ordering::Relaxed);
    MISSION_COMPLETE.store(report.phase == MissionPhase::Complete, Ordering::Relaxed);
    if report.clamped {
        FLOOR_CLAMPS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Stores the boot depth before the first poll.
pub fn record_initial_depth(depth: Depth) {
    DEPTH.store(depth, Ordering::Relaxed);
    ASCENT.store(0, Ordering::Relaxed);
    MISSION_COMPLETE.store(false, Ordering::Relaxed);
}

/// Bumps the dropped-feedback counter and returns the new total.
pub fn record_dropped_feedback() -> u32 {
    DROPPED_FEEDBACK.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

/// Bumps the display acknowledge-failure counter and returns the new total.
pub fn record_display_nack() -> u32 {
    DISPLAY_NACKS.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

/// Publishes the decoder's glitch counter.
pub fn record_glitches(total: u32) {
    GLITCHES.store(total, Ordering::Relaxed);
}

/// Builds a [`StatusSnapshot`] from the stored metrics.
pub fn snapshot() -> StatusSnapshot {
    StatusSnapshot {
        depth: DEPTH.load(Ordering::Relaxed),
        ascent: ASCENT.load(Ordering::Relaxed),
        mission_complete: MISSION_COMPLETE.load(Ordering::Relaxed),
        dropped_feedback: DROPPED_FEEDBACK.load(Ordering::Relaxed),
        glitches: GLITCHES.load(Ordering::Relaxed),
        floor_clamps: FLOOR_CLAMPS.load(Ordering::Relaxed),
        display_nacks: DISPLAY_NACKS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use depth_core::alerts::FiredThresholds;
    use depth_core::mission::PollOutcome;

    use super::*;

    #[test]
    fn report_updates_depth_phase_and_clamps() {
        let before = snapshot().floor_clamps;
        let report = PollReport {
            outcome: PollOutcome::Moved,
            phase: MissionPhase::Complete,
            depth: 0,
            delta: 15,
            ascent: 100,
            clamped: true,
            rate_exceeded: true,
            fired: FiredThresholds::new(),
        };
        record_report(&report);

        let snapshot = snapshot();
        assert_eq!(snapshot.depth, 0);
        assert_eq!(snapshot.ascent, 100);
        assert!(snapshot.mission_complete);
        assert!(snapshot.floor_clamps > before);
    }

    #[test]
    fn glitches_reach_the_snapshot() {
        record_glitches(7);
        assert_eq!(snapshot().glitches, 7);
    }

    #[test]
    fn display_nacks_are_counted() {
        let first = record_display_nack();
        assert!(snapshot().display_nacks >= first);
    }

    #[test]
    fn dropped_feedback_is_monotonic() {
        let first = record_dropped_feedback();
        let second = record_dropped_feedback();
        assert!(second > first);
    }
}
