//! Cooperative poll loop tying the depth pipeline together.
//!
//! Each tick [`DepthMonitor::poll`] drains the [`PositionStore`], maps the
//! counter onto a clamped depth, runs the rate guard and the alert engine, and
//! pushes the results into a [`FeedbackSink`]. The monitor is the only writer
//! of `previous` depth and the only caller of [`PositionStore::force_reset`].

use crate::alerts::{AlertEngine, AlertThreshold, FiredThresholds, ThresholdKind};
use crate::config::{ConfigError, MissionConfig};
use crate::depth::{Depth, ascent_progress, map_depth};
use crate::feedback::{Feedback, FeedbackSink, GlyphPattern, Rgb, completion_melody};
use crate::position::PositionStore;
use crate::rate::RateGuard;

use core::time::Duration;

/// Coarse mission lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissionPhase {
    Ascending,
    /// Surface reached; encoder motion no longer changes depth.
    Complete,
}

/// What a single poll did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No encoder activity since the previous poll.
    Idle,
    /// Motion was mapped onto a new depth.
    Moved,
    /// Motion arrived after mission completion and was ignored.
    Halted,
}

/// Summary of one poll, consumed by diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub phase: MissionPhase,
    pub depth: Depth,
    /// Net encoder delta drained this poll.
    pub delta: i32,
    /// Percentage of the climb from floor to surface.
    pub ascent: u8,
    /// The floor clamp fired and the store was reset.
    pub clamped: bool,
    pub rate_exceeded: bool,
    pub fired: FiredThresholds,
}

/// Poll-side mission state.
#[derive(Clone, Debug)]
pub struct DepthMonitor {
    initial_depth: Depth,
    surface_depth: Depth,
    previous: Depth,
    alerts: AlertEngine,
    rate: RateGuard,
    blink_count: u8,
    tick: Duration,
    phase: MissionPhase,
}

impl DepthMonitor {
    /// Validates `config` and builds a monitor resting on the floor.
    pub fn new(config: &MissionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = config.surface().ok_or(ConfigError::MissingSurface)?;

        Ok(Self {
            initial_depth: config.initial_depth,
            surface_depth: surface.depth,
            previous: config.initial_depth,
            alerts: AlertEngine::new(&config.thresholds),
            rate: RateGuard::new(config.rate_limit, config.alarm),
            blink_count: config.blink_count,
            tick: config.poll_interval,
            phase: MissionPhase::Ascending,
        })
    }

    /// Shows the starting depth and arms the status lamp.
    pub fn start<S>(&self, sink: &mut S)
    where
        S: FeedbackSink + ?Sized,
    {
        sink.emit(Feedback::number(self.previous));
        sink.emit(Feedback::Lamp(Rgb::BLUE));
    }

    /// Runs one iteration of the poll loop.
    pub fn poll<S>(&mut self, store: &PositionStore, sink: &mut S) -> PollReport
    where
        S: FeedbackSink + ?Sized,
    {
        let change = store.read_and_clear_change();

        if self.phase == MissionPhase::Complete {
            if change.has_motion() {
                sink.emit(Feedback::ShowGlyphs(GlyphPattern::DONE));
                return self.report(PollOutcome::Halted, change.delta);
            }
            return self.report(PollOutcome::Idle, 0);
        }

        if !change.has_motion() {
            return self.report(PollOutcome::Idle, 0);
        }

        let reading = map_depth(self.initial_depth, change.count);
        if reading.reset_required {
            store.force_reset();
        }

        let previous = self.previous;
        let current = reading.depth;
        let rate_exceeded = self.rate.check(previous, current, sink);

        sink.emit(Feedback::number(current));

        let fired = self.alerts.evaluate(previous, current);
        for threshold in &fired {
            self.signal(threshold, current, sink);
        }
        if self.alerts.surface_reached() {
            self.phase = MissionPhase::Complete;
        }
        self.previous = current;

        PollReport {
            outcome: PollOutcome::Moved,
            phase: self.phase,
            depth: current,
            delta: change.delta,
            ascent: self.ascent(),
            clamped: reading.reset_required,
            rate_exceeded,
            fired,
        }
    }

    /// Starts a fresh mission: counter zeroed, thresholds re-armed, depth
    /// back on the floor.
    pub fn restart(&mut self, store: &PositionStore) {
        store.force_reset();
        let _ = store.read_and_clear_change();
        self.alerts.rearm();
        self.previous = self.initial_depth;
        self.phase = MissionPhase::Ascending;
    }

    #[must_use]
    pub const fn depth(&self) -> Depth {
        self.previous
    }

    #[must_use]
    pub const fn phase(&self) -> MissionPhase {
        self.phase
    }

    #[must_use]
    pub const fn initial_depth(&self) -> Depth {
        self.initial_depth
    }

    #[must_use]
    pub const fn surface_depth(&self) -> Depth {
        self.surface_depth
    }

    #[must_use]
    pub const fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    #[must_use]
    pub fn ascent(&self) -> u8 {
        ascent_progress(self.initial_depth, self.surface_depth, self.previous)
    }

    fn signal<S>(&self, threshold: &AlertThreshold, current: Depth, sink: &mut S)
    where
        S: FeedbackSink + ?Sized,
    {
        match threshold.kind {
            ThresholdKind::Checkpoint => sink.emit(Feedback::BlinkNumber {
                value: current,
                times: self.blink_count,
            }),
            ThresholdKind::Surface => {
                sink.emit(Feedback::Melody(completion_melody(self.tick)));
                sink.emit(Feedback::BlinkGlyphs {
                    glyphs: GlyphPattern::DONE,
                    times: self.blink_count,
                });
                sink.emit(Feedback::Lamp(Rgb::GREEN));
            }
        }
    }

    fn report(&self, outcome: PollOutcome, delta: i32) -> PollReport {
        PollReport {
            outcome,
            phase: self.phase,
            depth: self.previous,
            delta,
            ascent: self.ascent(),
            clamped: false,
            rate_exceeded: false,
            fired: FiredThresholds::new(),
        }
    }
}

/// Fatal boot path: park the gauge on `nOPE` with a red lamp.
pub fn fault<S>(sink: &mut S)
where
    S: FeedbackSink + ?Sized,
{
    sink.emit(Feedback::ShowGlyphs(GlyphPattern::NOPE));
    sink.emit(Feedback::Lamp(Rgb::RED));
}

#[cfg(test)]
mod tests {
    use heapless::Vec;

    use super::*;
    use crate::quadrature::RawStep;

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Feedback, 16>,
    }

    impl FeedbackSink for RecordingSink {
        fn emit(&mut self, feedback: Feedback) {
            let _ = self.events.push(feedback);
        }
    }

    fn turn(store: &PositionStore, detents: i32) {
        let step = if detents >= 0 {
            RawStep::Clockwise
        } else {
            RawStep::CounterClockwise
        };
        for _ in 0..detents.unsigned_abs() {
            store.apply_step(step);
        }
    }

    fn monitor() -> DepthMonitor {
        DepthMonitor::new(&MissionConfig::lander()).expect("lander config is valid")
    }

    #[test]
    fn idle_poll_emits_nothing() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        let report = monitor.poll(&store, &mut sink);
        assert_eq!(report.outcome, PollOutcome::Idle);
        assert_eq!(report.depth, -60);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn slow_climb_updates_display_only() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, 1);
        let report = monitor.poll(&store, &mut sink);
        assert_eq!(report.depth, -59);
        assert!(!report.rate_exceeded);
        assert_eq!(sink.events.as_slice(), &[Feedback::number(-59)]);
    }

    #[test]
    fn fast_climb_sounds_alarm_before_display() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, 5);
        let report = monitor.poll(&store, &mut sink);
        assert!(report.rate_exceeded);
        assert!(matches!(sink.events[0], Feedback::Tone(_)));
        assert_eq!(sink.events[1], Feedback::number(-55));
    }

    #[test]
    fn descending_below_floor_clamps_and_resets_store() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, -5);
        let report = monitor.poll(&store, &mut sink);
        assert_eq!(report.depth, -60);
        assert!(report.clamped);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn checkpoint_blinks_current_depth() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, 31);
        let report = monitor.poll(&store, &mut sink);
        assert_eq!(report.fired.len(), 1);
        assert!(sink.events.contains(&Feedback::BlinkNumber {
            value: -29,
            times: 3
        }));
    }

    #[test]
    fn surface_completes_mission_and_freezes_depth() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, 60);
        let report = monitor.poll(&store, &mut sink);
        assert_eq!(report.phase, MissionPhase::Complete);
        assert_eq!(report.fired.len(), 3);
        assert!(sink.events.contains(&Feedback::Lamp(Rgb::GREEN)));

        sink.events.clear();
        turn(&store, -10);
        let halted = monitor.poll(&store, &mut sink);
        assert_eq!(halted.outcome, PollOutcome::Halted);
        assert_eq!(halted.depth, 0);
        assert_eq!(
            sink.events.as_slice(),
            &[Feedback::ShowGlyphs(GlyphPattern::DONE)]
        );
    }

    #[test]
    fn restart_rearms_thresholds() {
        let store = PositionStore::new();
        let mut monitor = monitor();
        let mut sink = RecordingSink::default();

        turn(&store, 60);
        let _ = monitor.poll(&store, &mut sink);
        monitor.restart(&store);
        assert_eq!(monitor.phase(), MissionPhase::Ascending);
        assert_eq!(monitor.depth(), -60);

        turn(&store, 31);
        assert_eq!(monitor.poll(&store, &mut sink).fired.len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MissionConfig::lander().with_rate_limit(-1);
        assert!(matches!(
            DepthMonitor::new(&config),
            Err(ConfigError::NonPositiveRateLimit)
        ));
    }

    #[test]
    fn fault_shows_nope() {
        let mut sink = RecordingSink::default();
        fault(&mut sink);
        assert_eq!(
            sink.events.as_slice(),
            &[
                Feedback::ShowGlyphs(GlyphPattern::NOPE),
                Feedback::Lamp(Rgb::RED)
            ]
        );
    }
}
