#![cfg(target_os = "none")]

use depth_core::feedback::Rgb;
use embassy_stm32::gpio::Output;

/// Channel intensity at or above which a digital lamp channel lights.
const ON_THRESHOLD: u8 = 128;

/// Common-cathode RGB lamp on three digital pins.
pub struct Lamp<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
}

impl<'d> Lamp<'d> {
    pub fn new(red: Output<'d>, green: Output<'d>, blue: Output<'d>) -> Self {
        Self { red, green, blue }
    }

    pub fn set(&mut self, color: Rgb) {
        drive(&mut self.red, color.red);
        drive(&mut self.green, color.green);
        drive(&mut self.blue, color.blue);
    }
}

fn drive(pin: &mut Output<'_>, intensity: u8) {
    if intensity >= ON_THRESHOLD {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
