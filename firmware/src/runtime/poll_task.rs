use depth_core::mission::DepthMonitor;
use embassy_time::{Duration, Ticker};

use super::{FEEDBACK, POSITION};
use crate::status;
use crate::telemetry::{self, TelemetryRecorder};

#[embassy_executor::task]
pub async fn run(
    mut monitor: DepthMonitor,
    interval: Duration,
    mut recorder: TelemetryRecorder,
) -> ! {
    let mut sink = FEEDBACK.sink();
    monitor.start(&mut sink);

    let mut ticker = Ticker::every(interval);
    loop {
        ticker.next().await;
        let report = monitor.poll(&POSITION, &mut sink);
        status::record_report(&report);
        let _ = recorder.record(report);
        if recorder.status_due() {
            telemetry::log_status(&status::snapshot());
        }
    }
}
