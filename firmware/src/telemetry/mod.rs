//! Diagnostic recording and logging helpers.
//!
//! Wraps the shared [`DiagnosticLog`] ring and mirrors every retained poll to
//! defmt on the target or stdout on host builds. A status line with the
//! hardware counters goes out every [`STATUS_PERIOD_TICKS`] polls.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use depth_core::config::{ConfigError, MissionConfig};
use depth_core::mission::PollReport;
use depth_core::telemetry::{DiagnosticLog, DiagnosticRecord};

use crate::status::StatusSnapshot;

/// Polls between status lines (five seconds at the lander tick).
pub const STATUS_PERIOD_TICKS: u32 = 25;

/// Records poll diagnostics and logs each retained record.
pub struct TelemetryRecorder {
    log: DiagnosticLog,
}

impl TelemetryRecorder {
    pub const fn new() -> Self {
        Self {
            log: DiagnosticLog::new(),
        }
    }

    /// Stores `report`; idle polls only advance the tick counter.
    pub fn record(&mut self, report: PollReport) -> Option<u32> {
        let record = self.log.record(report)?;
        log_record(record);
        Some(record.tick)
    }

    /// `true` on the polls that should also log a status line.
    pub const fn status_due(&self) -> bool {
        let ticks = self.log.ticks();
        ticks != 0 && ticks % STATUS_PERIOD_TICKS == 0
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs the mission parameters once at boot.
pub fn log_boot(config: &MissionConfig) {
    emit_boot(
        config.initial_depth,
        config.thresholds.len(),
        config.rate_limit,
        config.poll_interval.as_millis(),
    );
}

/// Logs a configuration rejected at boot.
pub fn log_fault(error: &ConfigError) {
    emit_fault(error);
}

/// Logs a feedback request lost to a full queue.
pub fn log_dropped_feedback(label: &'static str, total: u32) {
    emit_dropped(label, total);
}

/// Logs the counters mirrored in [`crate::status`].
pub fn log_status(snapshot: &StatusSnapshot) {
    emit_status(snapshot);
}

/// Logs a display write the TM1637 did not acknowledge.
pub fn log_display_nack(total: u32) {
    emit_display_nack(total);
}

fn log_record(record: &DiagnosticRecord) {
    emit_record(record);
}

#[cfg(target_os = "none")]
fn emit_record(record: &DiagnosticRecord) {
    defmt::info!("telemetry:poll {}", defmt::Display2Format(record));
}

#[cfg(not(target_os = "none"))]
fn emit_record(record: &DiagnosticRecord) {
    println!("telemetry:poll {record}");
}

#[cfg(target_os = "none")]
fn emit_boot(initial_depth: i32, thresholds: usize, rate_limit: i32, tick_ms: u128) {
    defmt::info!(
        "telemetry:boot floor={} thresholds={} rate={} tick={}ms",
        initial_depth,
        thresholds,
        rate_limit,
        tick_ms
    );
}

#[cfg(not(target_os = "none"))]
fn emit_boot(initial_depth: i32, thresholds: usize, rate_limit: i32, tick_ms: u128) {
    println!(
        "telemetry:boot floor={initial_depth} thresholds={thresholds} rate={rate_limit} tick={tick_ms}ms"
    );
}

#[cfg(target_os = "none")]
fn emit_fault(error: &ConfigError) {
    defmt::error!("telemetry:fault {}", error);
}

#[cfg(not(target_os = "none"))]
fn emit_fault(error: &ConfigError) {
    println!("telemetry:fault {error}");
}

#[cfg(target_os = "none")]
fn emit_dropped(label: &'static str, total: u32) {
    defmt::warn!("telemetry:feedback dropped {} total={}", label, total);
}

#[cfg(not(target_os = "none"))]
fn emit_dropped(label: &'static str, total: u32) {
    println!("telemetry:feedback dropped {label} total={total}");
}

#[cfg(target_os = "none")]
fn emit_status(snapshot: &StatusSnapshot) {
    defmt::info!(
        "telemetry:status depth={} ascent={}% complete={} dropped={} glitches={} clamps={} nacks={}",
        snapshot.depth,
        snapshot.ascent,
        snapshot.mission_complete,
        snapshot.dropped_feedback,
        snapshot.glitches,
        snapshot.floor_clamps,
        snapshot.display_nacks
    );
}

#[cfg(not(target_os = "none"))]
fn emit_status(snapshot: &StatusSnapshot) {
    println!(
        "telemetry:status depth={} ascent={}% complete={} dropped={} glitches={} clamps={} nacks={}",
        snapshot.depth,
        snapshot.ascent,
        snapshot.mission_complete,
        snapshot.dropped_feedback,
        snapshot.glitches,
        snapshot.floor_clamps,
        snapshot.display_nacks
    );
}

#[cfg(target_os = "none")]
fn emit_display_nack(total: u32) {
    defmt::warn!("telemetry:display no acknowledge total={}", total);
}

#[cfg(not(target_os = "none"))]
fn emit_display_nack(total: u32) {
    println!("telemetry:display no acknowledge total={total}");
}

#[cfg(test)]
mod tests {
    use depth_core::alerts::{AlertThreshold, FiredThresholds};
    use depth_core::mission::{MissionPhase, PollOutcome};

    use super::*;

    fn report(outcome: PollOutcome, depth: i32) -> PollReport {
        PollReport {
            outcome,
            phase: MissionPhase::Ascending,
            depth,
            delta: 1,
            ascent: 0,
            clamped: false,
            rate_exceeded: false,
            fired: FiredThresholds::new(),
        }
    }

    #[test]
    fn idle_polls_are_not_retained() {
        let mut recorder = TelemetryRecorder::new();

        assert_eq!(recorder.record(report(PollOutcome::Idle, -60)), None);
        assert_eq!(recorder.record(report(PollOutcome::Moved, -59)), Some(1));
    }

    #[test]
    fn fired_polls_are_retained() {
        let mut recorder = TelemetryRecorder::new();
        let mut moved = report(PollOutcome::Moved, -29);
        let _ = moved.fired.push(AlertThreshold::checkpoint(-30));

        assert_eq!(recorder.record(moved), Some(0));
    }

    #[test]
    fn status_line_is_due_once_per_period() {
        let mut recorder = TelemetryRecorder::new();
        assert!(!recorder.status_due());

        let mut due = 0;
        for _ in 0..STATUS_PERIOD_TICKS * 3 {
            let _ = recorder.record(report(PollOutcome::Idle, -60));
            if recorder.status_due() {
                due += 1;
            }
        }
        assert_eq!(due, 3);
    }
}
