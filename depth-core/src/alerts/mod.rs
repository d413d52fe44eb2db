//! Edge-triggered depth threshold alerts.
//!
//! Each configured threshold is a two-state machine. A threshold moves from
//! [`ThresholdState::Armed`] to [`ThresholdState::Fired`] only on the poll
//! where the previous depth was strictly below it and the current depth is at
//! or above it. `Fired` holds for the rest of the mission: dropping back under
//! a threshold and climbing through it again raises nothing. Only
//! [`AlertEngine::rearm`] (mission restart) returns thresholds to `Armed`.

use heapless::Vec;

use crate::depth::Depth;

/// Upper bound on configured thresholds (checkpoints plus surface).
pub const MAX_THRESHOLDS: usize = 8;

/// Thresholds newly fired by one [`AlertEngine::evaluate`] call, ascending.
pub type FiredThresholds = Vec<AlertThreshold, MAX_THRESHOLDS>;

/// What reaching a threshold means for the mission.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdKind {
    /// Intermediate level: blink the depth to warn the pilot.
    Checkpoint,
    /// Terminal level: the ascent is complete.
    Surface,
}

/// Depth level watched by the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertThreshold {
    pub depth: Depth,
    pub kind: ThresholdKind,
}

impl AlertThreshold {
    pub const fn checkpoint(depth: Depth) -> Self {
        Self {
            depth,
            kind: ThresholdKind::Checkpoint,
        }
    }

    pub const fn surface(depth: Depth) -> Self {
        Self {
            depth,
            kind: ThresholdKind::Surface,
        }
    }

    /// Checkpoint placed at `percent` of the initial depth, truncated toward
    /// zero (50 % of −60 m is −30 m).
    pub const fn fraction_of(initial: Depth, percent: u8) -> Self {
        Self::checkpoint(initial * percent as i32 / 100)
    }

    #[must_use]
    pub const fn is_surface(&self) -> bool {
        matches!(self.kind, ThresholdKind::Surface)
    }

    /// Edge test: strictly below before, at or above now.
    #[must_use]
    pub const fn crossed(&self, previous: Depth, current: Depth) -> bool {
        previous < self.depth && current >= self.depth
    }
}

/// Per-threshold alert state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdState {
    Armed,
    Fired,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Slot {
    threshold: AlertThreshold,
    state: ThresholdState,
}

/// Stateful crossing detector over an ascending list of thresholds.
#[derive(Clone, Debug)]
pub struct AlertEngine {
    slots: Vec<Slot, MAX_THRESHOLDS>,
}

impl AlertEngine {
    /// Builds an engine with every threshold armed. Ordering and surface
    /// placement are checked by [`crate::config::MissionConfig::validate`].
    #[must_use]
    pub fn new(thresholds: &[AlertThreshold]) -> Self {
        let slots = thresholds
            .iter()
            .take(MAX_THRESHOLDS)
            .map(|threshold| Slot {
                threshold: *threshold,
                state: ThresholdState::Armed,
            })
            .collect();
        Self { slots }
    }

    /// Tests every threshold against the same `(previous, current)` pair in
    /// ascending order and returns those that fired on this call.
    pub fn evaluate(&mut self, previous: Depth, current: Depth) -> FiredThresholds {
        let mut fired = FiredThresholds::new();
        for slot in &mut self.slots {
            if slot.state == ThresholdState::Armed && slot.threshold.crossed(previous, current) {
                slot.state = ThresholdState::Fired;
                // Both vectors share MAX_THRESHOLDS capacity.
                let _ = fired.push(slot.threshold);
            }
        }
        fired
    }

    /// Returns every threshold to `Armed` for a fresh mission.
    pub fn rearm(&mut self) {
        for slot in &mut self.slots {
            slot.state = ThresholdState::Armed;
        }
    }

    /// State of the threshold at `index`, if configured.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<ThresholdState> {
        self.slots.get(index).map(|slot| slot.state)
    }

    /// Iterates thresholds with their current state.
    pub fn iter(&self) -> impl Iterator<Item = (AlertThreshold, ThresholdState)> + '_ {
        self.slots.iter().map(|slot| (slot.threshold, slot.state))
    }

    /// `true` once the terminal threshold has fired.
    #[must_use]
    pub fn surface_reached(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.threshold.is_surface() && slot.state == ThresholdState::Fired)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: [AlertThreshold; 3] = [
        AlertThreshold::checkpoint(-30),
        AlertThreshold::checkpoint(-15),
        AlertThreshold::surface(0),
    ];

    fn depths(fired: &FiredThresholds) -> Vec<Depth, MAX_THRESHOLDS> {
        fired.iter().map(|threshold| threshold.depth).collect()
    }

    #[test]
    fn crossing_fires_once() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        assert_eq!(depths(&engine.evaluate(-35, -25)).as_slice(), &[-30]);
        assert_eq!(engine.state(0), Some(ThresholdState::Fired));
        assert!(engine.evaluate(-25, -20).is_empty());
    }

    #[test]
    fn landing_exactly_on_threshold_fires() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        assert_eq!(depths(&engine.evaluate(-31, -30)).as_slice(), &[-30]);
    }

    #[test]
    fn starting_on_threshold_does_not_fire() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        assert!(engine.evaluate(-30, -29).is_empty());
        assert_eq!(engine.state(0), Some(ThresholdState::Armed));
    }

    #[test]
    fn flat_and_downward_moves_never_fire() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        assert!(engine.evaluate(-25, -25).is_empty());
        assert!(engine.evaluate(-10, -40).is_empty());
        assert!(engine.iter().all(|(_, state)| state == ThresholdState::Armed));
    }

    #[test]
    fn large_jump_fires_all_spanned_thresholds_in_order() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        let fired = engine.evaluate(-60, 5);
        assert_eq!(depths(&fired).as_slice(), &[-30, -15, 0]);
        assert!(fired[2].is_surface());
        assert!(engine.surface_reached());
    }

    #[test]
    fn recrossing_after_descent_stays_silent() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        assert_eq!(engine.evaluate(-35, -28).len(), 1);
        assert!(engine.evaluate(-28, -40).is_empty());
        assert!(engine.evaluate(-40, -28).is_empty());
    }

    #[test]
    fn rearm_restores_every_threshold() {
        let mut engine = AlertEngine::new(&THRESHOLDS);
        let _ = engine.evaluate(-60, 5);
        engine.rearm();
        assert!(!engine.surface_reached());
        assert_eq!(engine.evaluate(-60, -20).len(), 1);
    }

    #[test]
    fn fraction_of_initial_depth_matches_lander_checkpoints() {
        assert_eq!(AlertThreshold::fraction_of(-60, 50).depth, -30);
        assert_eq!(AlertThreshold::fraction_of(-60, 25).depth, -15);
        assert_eq!(AlertThreshold::fraction_of(-50, 33).depth, -16);
    }
}
