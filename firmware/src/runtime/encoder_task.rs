use depth_core::quadrature::{PinLevels, QuadratureDecoder, Resolution};
use embassy_futures::select::select;
use embassy_stm32::exti::ExtiInput;

use super::POSITION;
use crate::status;

/// Decodes every edge on either encoder line into the shared counter.
///
/// Only the decoder update and the counter mutation happen here; everything
/// else belongs to the poll loop.
#[embassy_executor::task]
pub async fn run(
    mut clk: ExtiInput<'static>,
    mut dt: ExtiInput<'static>,
    resolution: Resolution,
    initial: PinLevels,
) -> ! {
    let mut decoder = QuadratureDecoder::new(resolution, initial);
    let mut glitches = 0;

    loop {
        select(clk.wait_for_any_edge(), dt.wait_for_any_edge()).await;

        let levels = PinLevels::new(clk.is_high(), dt.is_high());
        POSITION.apply_step(decoder.update(levels));

        if decoder.glitches() != glitches {
            glitches = decoder.glitches();
            status::record_glitches(glitches);
        }
    }
}
