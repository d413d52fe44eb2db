//! Output vocabulary shared by every feedback sink.
//!
//! The poll loop never talks to display or buzzer drivers directly. It emits
//! [`Feedback`] requests into a [`FeedbackSink`]; the firmware forwards them to
//! a dedicated task and the emulator prints them. Emitting is fire-and-forget:
//! blinking and tone playback are the sink's concern.

use core::time::Duration;

use heapless::Vec;

pub mod segments;

pub use segments::{GlyphPattern, encode_number};

/// Maximum notes carried by a single [`Feedback::Melody`].
pub const MAX_MELODY_NOTES: usize = 4;

/// Buzzer request.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tone {
    pub frequency_hz: u16,
    pub duration: Duration,
}

impl Tone {
    pub const fn new(frequency_hz: u16, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

/// Notes played back to back.
pub type Melody = Vec<Tone, MAX_MELODY_NOTES>;

/// Status lamp intensities.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// A single request for the display, buzzer, or lamp.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Feedback {
    /// Show a decimal number, optionally lighting the separator.
    ShowNumber { value: i32, separator: bool },
    ShowGlyphs(GlyphPattern),
    Clear,
    /// Alternate the number with a blank display `times` times.
    BlinkNumber { value: i32, times: u8 },
    BlinkGlyphs { glyphs: GlyphPattern, times: u8 },
    Tone(Tone),
    Melody(Melody),
    Lamp(Rgb),
}

impl Feedback {
    /// Plain depth readout without separator.
    #[must_use]
    pub const fn number(value: i32) -> Self {
        Feedback::ShowNumber {
            value,
            separator: false,
        }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Feedback::ShowNumber { .. } => "show-number",
            Feedback::ShowGlyphs(_) => "show-glyphs",
            Feedback::Clear => "clear",
            Feedback::BlinkNumber { .. } => "blink-number",
            Feedback::BlinkGlyphs { .. } => "blink-glyphs",
            Feedback::Tone(_) => "tone",
            Feedback::Melody(_) => "melody",
            Feedback::Lamp(_) => "lamp",
        }
    }
}

/// Consumer of feedback requests. Implementations must not block the caller
/// for longer than one display update.
pub trait FeedbackSink {
    fn emit(&mut self, feedback: Feedback);
}

impl<S> FeedbackSink for &mut S
where
    S: FeedbackSink + ?Sized,
{
    fn emit(&mut self, feedback: Feedback) {
        (**self).emit(feedback);
    }
}

/// Two-note "tada" played on reaching the surface: one tick at 440 Hz, then
/// four ticks at 600 Hz.
#[must_use]
pub fn completion_melody(tick: Duration) -> Melody {
    let mut melody = Melody::new();
    // Capacity is larger than the two notes pushed here.
    let _ = melody.push(Tone::new(440, tick));
    let _ = melody.push(Tone::new(600, tick.saturating_mul(4)));
    melody
}
