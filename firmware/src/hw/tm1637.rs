//! Bit-banged TM1637 four-digit display driver.
//!
//! The TM1637 uses a two-wire bus that looks like I2C without addressing:
//! data is shifted LSB first and the chip pulls DIO low on the ninth clock to
//! acknowledge each byte. Both lines are open drain with external pull-ups.

#![cfg(target_os = "none")]

use depth_core::feedback::GlyphPattern;
use embassy_stm32::gpio::OutputOpenDrain;
use embassy_time::{Duration, block_for};

/// Data command: write, auto-increment address.
const CMD_DATA_AUTO: u8 = 0x40;
/// Address command for digit 0.
const CMD_ADDRESS: u8 = 0xC0;
/// Display control: on, with brightness in the low three bits.
const CMD_DISPLAY_ON: u8 = 0x88;

const BIT_DELAY: Duration = Duration::from_micros(5);

/// Display brightness, `0..=7`.
const BRIGHTNESS: u8 = 7;

/// The chip did not pull DIO low on an acknowledge clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoAcknowledge;

pub struct Tm1637<'d> {
    clk: OutputOpenDrain<'d>,
    dio: OutputOpenDrain<'d>,
}

impl<'d> Tm1637<'d> {
    pub fn new(clk: OutputOpenDrain<'d>, dio: OutputOpenDrain<'d>) -> Self {
        let mut display = Self { clk, dio };
        display.clk.set_high();
        display.dio.set_high();
        display
    }

    /// Writes all four digits. The whole frame is always clocked out; an
    /// error reports that at least one byte went unacknowledged.
    pub fn show(&mut self, glyphs: GlyphPattern) -> Result<(), NoAcknowledge> {
        let mut acked = true;

        self.start();
        acked &= self.write_byte(CMD_DATA_AUTO);
        self.stop();

        self.start();
        acked &= self.write_byte(CMD_ADDRESS);
        for segments in glyphs.segments() {
            acked &= self.write_byte(segments);
        }
        self.stop();

        self.start();
        acked &= self.write_byte(CMD_DISPLAY_ON | BRIGHTNESS);
        self.stop();

        if acked { Ok(()) } else { Err(NoAcknowledge) }
    }

    fn start(&mut self) {
        self.dio.set_low();
        block_for(BIT_DELAY);
    }

    fn stop(&mut self) {
        self.dio.set_low();
        block_for(BIT_DELAY);
        self.clk.set_high();
        block_for(BIT_DELAY);
        self.dio.set_high();
        block_for(BIT_DELAY);
    }

    /// Returns `true` when the chip acknowledged the byte.
    fn write_byte(&mut self, byte: u8) -> bool {
        for bit in 0..8 {
            self.clk.set_low();
            block_for(BIT_DELAY);
            if byte & (1 << bit) == 0 {
                self.dio.set_low();
            } else {
                self.dio.set_high();
            }
            block_for(BIT_DELAY);
            self.clk.set_high();
            block_for(BIT_DELAY);
        }

        // Release DIO and clock the acknowledge bit.
        self.clk.set_low();
        self.dio.set_high();
        block_for(BIT_DELAY);
        self.clk.set_high();
        block_for(BIT_DELAY);
        let acked = self.dio.is_low();
        self.clk.set_low();
        block_for(BIT_DELAY);
        acked
    }
}
