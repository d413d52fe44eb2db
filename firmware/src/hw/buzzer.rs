//! Piezo buzzer driven by toggling a push-pull pin.

#![cfg(target_os = "none")]

use depth_core::feedback::Tone;
use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Ticker, Timer};

pub struct Buzzer<'d> {
    pin: Output<'d>,
}

impl<'d> Buzzer<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }

    /// Plays `tone` as a square wave. A zero frequency is a rest.
    pub async fn play(&mut self, tone: Tone) {
        let duration_us = u64::try_from(tone.duration.as_micros()).unwrap_or(u64::MAX);
        if tone.frequency_hz == 0 {
            Timer::after(Duration::from_micros(duration_us)).await;
            return;
        }

        let half_period_us = 500_000 / u64::from(tone.frequency_hz);
        let toggles = duration_us / half_period_us.max(1);
        let mut ticker = Ticker::every(Duration::from_micros(half_period_us));
        for _ in 0..toggles {
            self.pin.toggle();
            ticker.next().await;
        }
        self.pin.set_low();
    }
}
