#![no_std]

// Shared logic for the lander ascent controller.
//
// Everything the encoder-to-depth pipeline needs lives here so the firmware
// and the host emulator drive the same state machines. The crate avoids the
// Rust standard library and allocates nothing after construction.

pub mod alerts;
pub mod config;
pub mod console;
pub mod depth;
pub mod feedback;
pub mod mission;
pub mod position;
pub mod quadrature;
pub mod rate;
pub mod telemetry;
