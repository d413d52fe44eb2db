//! Board peripherals driven by the output task.
//!
//! Pin map (STM32G0B1KE):
//! - `PA0` / `PA1`: encoder CLK / DT (EXTI, pull-up)
//! - `PB6` / `PB7`: TM1637 CLK / DIO (open drain)
//! - `PA6`: piezo buzzer
//! - `PA7` / `PB4` / `PB5`: status lamp red / green / blue

#![cfg(target_os = "none")]

pub mod buzzer;
pub mod lamp;
pub mod tm1637;

use depth_core::feedback::{Feedback, GlyphPattern, encode_number};
use embassy_time::{Duration, Timer};

use self::buzzer::Buzzer;
use self::lamp::Lamp;
use self::tm1637::Tm1637;
use crate::{status, telemetry};

/// Half period of a blink cycle.
pub const BLINK_DELAY: Duration = Duration::from_millis(300);

/// Every output device the feedback task renders onto.
pub struct FeedbackPanel<'d> {
    display: Tm1637<'d>,
    buzzer: Buzzer<'d>,
    lamp: Lamp<'d>,
}

impl<'d> FeedbackPanel<'d> {
    pub fn new(display: Tm1637<'d>, buzzer: Buzzer<'d>, lamp: Lamp<'d>) -> Self {
        Self {
            display,
            buzzer,
            lamp,
        }
    }

    /// Renders a single request. Blinks, tones and melodies hold the task
    /// until they finish.
    pub async fn render(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::ShowNumber { value, separator } => {
                self.show(encode_number(value, separator));
            }
            Feedback::ShowGlyphs(glyphs) => self.show(glyphs),
            Feedback::Clear => self.show(GlyphPattern::BLANK),
            Feedback::BlinkNumber { value, times } => {
                self.blink(encode_number(value, false), times).await;
            }
            Feedback::BlinkGlyphs { glyphs, times } => self.blink(glyphs, times).await,
            Feedback::Tone(tone) => self.buzzer.play(tone).await,
            Feedback::Melody(melody) => {
                for tone in melody {
                    self.buzzer.play(tone).await;
                }
            }
            Feedback::Lamp(color) => self.lamp.set(color),
        }
    }

    fn show(&mut self, glyphs: GlyphPattern) {
        if self.display.show(glyphs).is_err() {
            telemetry::log_display_nack(status::record_display_nack());
        }
    }

    /// Ends with `glyphs` left on the display.
    async fn blink(&mut self, glyphs: GlyphPattern, times: u8) {
        for _ in 0..times {
            self.show(GlyphPattern::BLANK);
            Timer::after(BLINK_DELAY).await;
            self.show(glyphs);
            Timer::after(BLINK_DELAY).await;
        }
    }
}
