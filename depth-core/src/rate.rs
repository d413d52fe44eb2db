//! Climb-rate guard.
//!
//! The guard compares successive polled depths and raises the alarm tone on
//! every poll where the climb exceeds the limit. It keeps no state of its own
//! and never clamps or rejects motion.

use crate::depth::Depth;
use crate::feedback::{Feedback, FeedbackSink, Tone};

/// Returns `true` when `current - previous` exceeds `limit`.
#[must_use]
pub const fn rate_exceeded(previous: Depth, current: Depth, limit: i32) -> bool {
    current.saturating_sub(previous) > limit
}

/// Rate limit paired with the alarm tone it raises.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RateGuard {
    limit: i32,
    alarm: Tone,
}

impl RateGuard {
    pub const fn new(limit: i32, alarm: Tone) -> Self {
        Self { limit, alarm }
    }

    #[must_use]
    pub const fn limit(&self) -> i32 {
        self.limit
    }

    /// Checks one poll and requests the alarm tone when the climb is too fast.
    pub fn check<S>(&self, previous: Depth, current: Depth, sink: &mut S) -> bool
    where
        S: FeedbackSink + ?Sized,
    {
        let exceeded = rate_exceeded(previous, current, self.limit);
        if exceeded {
            sink.emit(Feedback::Tone(self.alarm));
        }
        exceeded
    }
}
