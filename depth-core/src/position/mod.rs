//! Shared position counter between the encoder interrupt and the poll loop.
//!
//! [`PositionStore`] is the only mutable state crossing execution contexts.
//! Every access runs inside `critical_section::with`, so a read-and-clear from
//! the poll loop can never observe half of an interrupt-side update even when
//! the counter is wider than the target's native atomic width.

use core::cell::Cell;

use critical_section::Mutex;

use crate::quadrature::RawStep;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct PositionState {
    count: i32,
    pending: i32,
    moved: bool,
}

/// Net motion observed since the previous [`PositionStore::read_and_clear_change`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionChange {
    /// Signed sum of every step applied since the last read.
    pub delta: i32,
    /// Counter value captured in the same critical section as `delta`.
    pub count: i32,
    /// Whether any step (even ones netting to zero) arrived since the last read.
    pub moved: bool,
}

impl PositionChange {
    /// Returns `true` when the poll loop has motion to act on.
    #[must_use]
    pub const fn has_motion(&self) -> bool {
        self.moved
    }
}

/// Critical-section protected position counter.
pub struct PositionStore {
    state: Mutex<Cell<PositionState>>,
}

impl PositionStore {
    /// Creates a store with a zeroed counter; usable in `static` items.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(PositionState {
                count: 0,
                pending: 0,
                moved: false,
            })),
        }
    }

    /// Applies a decoded step. Called from the encoder interrupt.
    pub fn apply_step(&self, step: RawStep) {
        let delta = step.delta();
        if delta == 0 {
            return;
        }

        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.count = state.count.saturating_add(delta);
            state.pending = state.pending.saturating_add(delta);
            state.moved = true;
            cell.set(state);
        });
    }

    /// Returns the accumulated delta since the previous call and clears it.
    ///
    /// Steps landing between two calls coalesce into a single net delta.
    pub fn read_and_clear_change(&self) -> PositionChange {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let change = PositionChange {
                delta: state.pending,
                count: state.count,
                moved: state.moved,
            };
            state.pending = 0;
            state.moved = false;
            cell.set(state);
            change
        })
    }

    /// Snaps the counter back to zero after a floor violation.
    ///
    /// Pending motion is left untouched so steps arriving after the last read
    /// still surface on the next poll.
    pub fn force_reset(&self) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.count = 0;
            cell.set(state);
        });
    }

    /// Current counter value.
    pub fn count(&self) -> i32 {
        critical_section::with(|cs| self.state.borrow(cs).get().count)
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_accumulate_into_single_delta() {
        let store = PositionStore::new();
        for _ in 0..5 {
            store.apply_step(RawStep::Clockwise);
        }
        store.apply_step(RawStep::CounterClockwise);

        let change = store.read_and_clear_change();
        assert_eq!(change.delta, 4);
        assert_eq!(change.count, 4);
        assert!(change.has_motion());

        let idle = store.read_and_clear_change();
        assert_eq!(idle.delta, 0);
        assert_eq!(idle.count, 4);
        assert!(!idle.has_motion());
    }

    #[test]
    fn motion_netting_to_zero_is_still_reported() {
        let store = PositionStore::new();
        store.apply_step(RawStep::Clockwise);
        store.apply_step(RawStep::CounterClockwise);

        let change = store.read_and_clear_change();
        assert_eq!(change.delta, 0);
        assert!(change.has_motion());
    }

    #[test]
    fn still_steps_do_not_mark_motion() {
        let store = PositionStore::new();
        store.apply_step(RawStep::Still);
        assert!(!store.read_and_clear_change().has_motion());
    }

    #[test]
    fn force_reset_zeroes_counter_but_keeps_pending() {
        let store = PositionStore::new();
        store.apply_step(RawStep::CounterClockwise);
        let _ = store.read_and_clear_change();

        store.apply_step(RawStep::Clockwise);
        store.force_reset();
        assert_eq!(store.count(), 0);

        let change = store.read_and_clear_change();
        assert_eq!(change.delta, 1);
        assert_eq!(change.count, 0);
    }
}
