#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Feedback links between the poll loop and the output task.
//!
//! The poll task never waits on the display or buzzer. Requests are split by
//! how they may be coalesced:
//! - readouts (`ShowNumber`, `ShowGlyphs`, `Clear`) keep only the latest value
//! - rate-alarm tones keep only the latest tone
//! - alert payloads (blinks, melodies, lamp changes) are queued in order and
//!   never replaced by newer readouts
//!
//! The alert queue holds every alert a single mission can raise, so a
//! threshold crossing is not lost while the panel is busy blinking.

use depth_core::alerts::MAX_THRESHOLDS;
use depth_core::feedback::{Feedback, FeedbackSink, Tone};
use embassy_futures::select::{Either3, select3};
#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;

use crate::status;
use crate::telemetry;

/// Alerts one mission can queue: the boot lamp, one blink per checkpoint, and
/// the three surface requests, plus the fault lamp.
pub const ALERT_QUEUE_DEPTH: usize = MAX_THRESHOLDS + 4;

#[cfg(target_os = "none")]
type FeedbackMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type FeedbackMutex = NoopRawMutex;

/// Queue carrying alert payloads to the output task.
pub type AlertQueue = Channel<FeedbackMutex, Feedback, ALERT_QUEUE_DEPTH>;

/// How the output task receives a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Route {
    Readout,
    Alarm,
    Alert,
}

const fn route(feedback: &Feedback) -> Route {
    match feedback {
        Feedback::ShowNumber { .. } | Feedback::ShowGlyphs(_) | Feedback::Clear => Route::Readout,
        Feedback::Tone(_) => Route::Alarm,
        Feedback::BlinkNumber { .. }
        | Feedback::BlinkGlyphs { .. }
        | Feedback::Melody(_)
        | Feedback::Lamp(_) => Route::Alert,
    }
}

/// Shared state between the feedback sink and the output task.
pub struct FeedbackLinks {
    alerts: AlertQueue,
    readout: Signal<FeedbackMutex, Feedback>,
    alarm: Signal<FeedbackMutex, Tone>,
}

impl FeedbackLinks {
    pub const fn new() -> Self {
        Self {
            alerts: Channel::new(),
            readout: Signal::new(),
            alarm: Signal::new(),
        }
    }

    /// Sink for the poll loop.
    pub const fn sink(&self) -> ChannelFeedback<'_> {
        ChannelFeedback { links: self }
    }

    /// Waits for the next request. Queued alerts go first so the display
    /// ends on the newest readout, then the readout, then the alarm tone.
    pub async fn next(&self) -> Feedback {
        match select3(self.alerts.receive(), self.readout.wait(), self.alarm.wait()).await {
            Either3::First(feedback) | Either3::Second(feedback) => feedback,
            Either3::Third(tone) => Feedback::Tone(tone),
        }
    }

    /// Non-waiting form of [`FeedbackLinks::next`] with the same priority.
    pub fn try_next(&self) -> Option<Feedback> {
        self.alerts
            .try_receive()
            .ok()
            .or_else(|| self.readout.try_take())
            .or_else(|| self.alarm.try_take().map(Feedback::Tone))
    }
}

impl Default for FeedbackLinks {
    fn default() -> Self {
        Self::new()
    }
}

/// [`FeedbackSink`] that routes requests onto [`FeedbackLinks`].
pub struct ChannelFeedback<'a> {
    links: &'a FeedbackLinks,
}

impl FeedbackSink for ChannelFeedback<'_> {
    fn emit(&mut self, feedback: Feedback) {
        match route(&feedback) {
            Route::Readout => self.links.readout.signal(feedback),
            Route::Alarm => {
                if let Feedback::Tone(tone) = feedback {
                    self.links.alarm.signal(tone);
                }
            }
            Route::Alert => {
                // A blink leaves its own value on the display, newer than any
                // pending readout.
                if matches!(
                    feedback,
                    Feedback::BlinkNumber { .. } | Feedback::BlinkGlyphs { .. }
                ) {
                    self.links.readout.reset();
                }
                if let Err(TrySendError::Full(dropped)) = self.links.alerts.try_send(feedback) {
                    let total = status::record_dropped_feedback();
                    telemetry::log_dropped_feedback(dropped.label(), total);
                }
            }
        }
    }
}
