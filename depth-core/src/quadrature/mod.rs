//! Quadrature decoding for the depth control dial.
//!
//! The decoder turns level changes on the dial's CLK and DT lines into signed
//! unit steps. It runs inside the pin-change interrupt, so every operation is
//! a table lookup plus a few integer updates: no allocation, no formatting,
//! and no calls back into the poll loop.

/// Logic levels sampled from both encoder lines in a single read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinLevels {
    pub clk: bool,
    pub dt: bool,
}

impl PinLevels {
    pub const fn new(clk: bool, dt: bool) -> Self {
        Self { clk, dt }
    }

    /// Packs the levels into the 2-bit state `(clk << 1) | dt`.
    #[must_use]
    pub const fn bits(self) -> u8 {
        ((self.clk as u8) << 1) | (self.dt as u8)
    }

    /// Inverse of [`PinLevels::bits`]; only the two low bits are used.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            clk: bits & 0b10 != 0,
            dt: bits & 0b01 != 0,
        }
    }
}

/// Signed unit step applied to the shared position counter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawStep {
    CounterClockwise,
    Still,
    Clockwise,
}

impl RawStep {
    /// Signed contribution of the step (`-1`, `0`, or `+1`).
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            RawStep::CounterClockwise => -1,
            RawStep::Still => 0,
            RawStep::Clockwise => 1,
        }
    }
}

/// Classification of a single 2-bit state change.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Forward,
    Backward,
    Unchanged,
    /// Both lines changed at once; direction cannot be recovered.
    Glitch,
}

use Transition::{Backward as B, Forward as F, Glitch as G, Unchanged as U};

/// Indexed by `(previous << 2) | current`. Gray sequence `00 → 01 → 11 → 10`
/// is clockwise.
const TRANSITIONS: [Transition; 16] = [
    U, F, B, G, //
    B, U, G, F, //
    F, G, U, B, //
    G, B, F, U, //
];

/// Classifies the move from `previous` to `current`.
#[must_use]
pub const fn classify(previous: PinLevels, current: PinLevels) -> Transition {
    TRANSITIONS[((previous.bits() << 2) | current.bits()) as usize]
}

/// Number of valid transitions folded into one emitted step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    EveryTransition,
    HalfCycle,
    /// One step per full quadrature cycle, matching a clicked detent.
    Detent,
}

impl Resolution {
    #[must_use]
    pub const fn transitions_per_step(self) -> i8 {
        match self {
            Resolution::EveryTransition => 1,
            Resolution::HalfCycle => 2,
            Resolution::Detent => 4,
        }
    }
}

/// Interrupt-side decoder state.
#[derive(Clone, Debug)]
pub struct QuadratureDecoder {
    previous: PinLevels,
    resolution: Resolution,
    accumulated: i8,
    glitches: u32,
}

impl QuadratureDecoder {
    /// Creates a decoder seeded with the levels observed at start-up.
    pub const fn new(resolution: Resolution, initial: PinLevels) -> Self {
        Self {
            previous: initial,
            resolution,
            accumulated: 0,
            glitches: 0,
        }
    }

    /// Feeds the freshly sampled levels and returns the step to apply.
    ///
    /// Glitches are counted and discarded along with any partial step, so the
    /// next step boundary is measured from the glitched state. Opposing
    /// transitions inside one resolution unit cancel, which filters contact
    /// bounce on the dial.
    pub fn update(&mut self, current: PinLevels) -> RawStep {
        let transition = classify(self.previous, current);
        self.previous = current;

        let per_step = self.resolution.transitions_per_step();
        match transition {
            Transition::Forward => self.accumulated += 1,
            Transition::Backward => self.accumulated -= 1,
            Transition::Unchanged => return RawStep::Still,
            Transition::Glitch => {
                self.glitches = self.glitches.saturating_add(1);
                self.accumulated = 0;
                return RawStep::Still;
            }
        }

        if self.accumulated >= per_step {
            self.accumulated = 0;
            RawStep::Clockwise
        } else if self.accumulated <= -per_step {
            self.accumulated = 0;
            RawStep::CounterClockwise
        } else {
            RawStep::Still
        }
    }

    /// Number of transitions discarded as glitches since construction.
    #[must_use]
    pub const fn glitches(&self) -> u32 {
        self.glitches
    }

    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Last levels the decoder observed.
    #[must_use]
    pub const fn levels(&self) -> PinLevels {
        self.previous
    }
}

/// Clockwise Gray sequence starting from the `00` state.
pub const CLOCKWISE_SEQUENCE: [PinLevels; 4] = [
    PinLevels::from_bits(0b01),
    PinLevels::from_bits(0b11),
    PinLevels::from_bits(0b10),
    PinLevels::from_bits(0b00),
];

/// Returns the levels one valid transition away from `from` in the given
/// direction. Used by simulators that synthesise dial motion.
#[must_use]
pub const fn next_levels(from: PinLevels, clockwise: bool) -> PinLevels {
    let next = match (from.bits(), clockwise) {
        (0b00, true) | (0b11, false) => 0b01,
        (0b01, true) | (0b10, false) => 0b11,
        (0b11, true) | (0b00, false) => 0b10,
        _ => 0b00,
    };
    PinLevels::from_bits(next)
}
