use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use depth_core::config::MissionConfig;
use depth_core::mission::{self, DepthMonitor};
use depth_core::position::PositionStore;
use depth_core::quadrature::PinLevels;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, OutputOpenDrain, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use static_cell::StaticCell;

use crate::feedback::FeedbackLinks;
use crate::hw::FeedbackPanel;
use crate::hw::buzzer::Buzzer;
use crate::hw::lamp::Lamp;
use crate::hw::tm1637::Tm1637;
use crate::status;
use crate::telemetry::{self, TelemetryRecorder};

mod encoder_task;
mod feedback_task;
mod poll_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        cortex_m::interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                cortex_m::interrupt::enable();
            }
        }
    }
}

/// Encoder counter shared between the edge task and the poll loop.
pub(super) static POSITION: PositionStore = PositionStore::new();
pub(super) static FEEDBACK: FeedbackLinks = FeedbackLinks::new();
static CONFIG: StaticCell<MissionConfig> = StaticCell::new();

/// Runs the encoder task above thread mode so edges preempt the poll loop.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn USART3_4_5_6_LPUART1() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let hal::Peripherals {
        PA0,
        PA1,
        PA6,
        PA7,
        PB4,
        PB5,
        PB6,
        PB7,
        EXTI0,
        EXTI1,
        ..
    } = hal::init(hal::Config::default());

    let panel = FeedbackPanel::new(
        Tm1637::new(
            OutputOpenDrain::new(PB6, Level::High, Speed::Low),
            OutputOpenDrain::new(PB7, Level::High, Speed::Low),
        ),
        Buzzer::new(Output::new(PA6, Level::Low, Speed::Low)),
        Lamp::new(
            Output::new(PA7, Level::Low, Speed::Low),
            Output::new(PB4, Level::Low, Speed::Low),
            Output::new(PB5, Level::Low, Speed::Low),
        ),
    );

    spawner
        .spawn(feedback_task::run(&FEEDBACK, panel))
        .expect("failed to spawn feedback task");

    let config: &'static MissionConfig = CONFIG.init(MissionConfig::lander());
    let monitor = match DepthMonitor::new(config) {
        Ok(monitor) => monitor,
        Err(error) => {
            telemetry::log_fault(&error);
            mission::fault(&mut FEEDBACK.sink());
            core::future::pending::<()>().await;
            return;
        }
    };
    telemetry::log_boot(config);
    status::record_initial_depth(config.initial_depth);

    let clk = ExtiInput::new(PA0, EXTI0, Pull::Up);
    let dt = ExtiInput::new(PA1, EXTI1, Pull::Up);
    let initial = PinLevels::new(clk.is_high(), dt.is_high());

    interrupt::USART3_4_5_6_LPUART1.set_priority(Priority::P1);
    let high = EXECUTOR_HIGH.start(interrupt::USART3_4_5_6_LPUART1);
    high.spawn(encoder_task::run(clk, dt, config.resolution, initial))
        .expect("failed to spawn encoder task");

    spawner
        .spawn(poll_task::run(
            monitor,
            embassy_duration(config.poll_interval),
            TelemetryRecorder::new(),
        ))
        .expect("failed to spawn poll task");

    core::future::pending::<()>().await;
}

fn embassy_duration(duration: core::time::Duration) -> embassy_time::Duration {
    embassy_time::Duration::from_micros(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
}
