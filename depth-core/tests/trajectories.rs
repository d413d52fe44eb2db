use depth_core::alerts::AlertThreshold;
use depth_core::config::MissionConfig;
use depth_core::feedback::{Feedback, FeedbackSink};
use depth_core::mission::{DepthMonitor, MissionPhase};
use depth_core::position::PositionStore;
use depth_core::quadrature::RawStep;

const SEEDS: u64 = 64;
const POLLS_PER_RUN: usize = 400;

struct NullSink;

impl FeedbackSink for NullSink {
    fn emit(&mut self, _feedback: Feedback) {}
}

/// Knuth MMIX linear congruential generator.
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        u32::try_from(self.0 >> 33).expect("31-bit value")
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// Applies up to three bursts of mixed direction and returns the net count.
fn burst(store: &PositionStore, rng: &mut Lcg) -> i32 {
    let mut net = 0;
    for _ in 0..rng.below(4) {
        // Slight clockwise bias so some runs reach the surface.
        let clockwise = rng.below(100) < 55;
        for _ in 0..rng.below(13) {
            let step = if clockwise {
                RawStep::Clockwise
            } else {
                RawStep::CounterClockwise
            };
            store.apply_step(step);
            net += step.delta();
        }
    }
    net
}

fn sweep(config: &MissionConfig) {
    let floor = config.initial_depth;
    let mut completed_runs = 0;
    let mut clamped_polls = 0;

    for seed in 0..SEEDS {
        let mut rng = Lcg(seed);
        let store = PositionStore::new();
        let mut monitor = DepthMonitor::new(config).expect("valid config");
        let mut sink = NullSink;
        let mut fire_counts = vec![0_u32; config.thresholds.len()];
        let mut expected_count = 0;

        for poll in 0..POLLS_PER_RUN {
            let net = burst(&store, &mut rng);
            let ascending = monitor.phase() == MissionPhase::Ascending;
            let previous = monitor.depth();
            let report = monitor.poll(&store, &mut sink);

            assert!(
                report.depth >= floor,
                "seed {seed} poll {poll}: depth {} below floor {floor}",
                report.depth
            );

            if ascending {
                expected_count += net;
                // The mapper clamps and zeroes the counter below the floor.
                if expected_count < 0 {
                    expected_count = 0;
                }
                assert_eq!(report.depth, floor + expected_count, "seed {seed} poll {poll}");
            } else {
                assert!(report.fired.is_empty(), "seed {seed} poll {poll}: fired after surface");
                assert_eq!(report.depth, previous);
            }
            if report.clamped {
                clamped_polls += 1;
            }

            for fired in &report.fired {
                assert!(
                    previous < fired.depth && fired.depth <= report.depth,
                    "seed {seed} poll {poll}: {} fired moving {previous} -> {}",
                    fired.depth,
                    report.depth
                );
                let index = config
                    .thresholds
                    .iter()
                    .position(|threshold| threshold == fired)
                    .expect("fired threshold is configured");
                fire_counts[index] += 1;
            }
            assert!(
                report
                    .fired
                    .windows(2)
                    .all(|pair| pair[0].depth < pair[1].depth),
                "seed {seed} poll {poll}: fires out of order"
            );
        }

        assert!(
            fire_counts.iter().all(|&count| count <= 1),
            "seed {seed}: a threshold fired more than once: {fire_counts:?}"
        );
        if monitor.phase() == MissionPhase::Complete {
            completed_runs += 1;
            assert!(fire_counts.iter().all(|&count| count == 1));
        }
    }

    // The sweep must exercise both the surface and the floor clamp.
    assert!(completed_runs > 0);
    assert!(clamped_polls > 0);
}

#[test]
fn lander_mission_holds_invariants_over_random_trajectories() {
    sweep(&MissionConfig::lander());
}

#[test]
fn dense_thresholds_hold_invariants_over_random_trajectories() {
    let config = MissionConfig::new(
        -40,
        &[
            AlertThreshold::checkpoint(-35),
            AlertThreshold::checkpoint(-34),
            AlertThreshold::checkpoint(-20),
            AlertThreshold::checkpoint(-10),
            AlertThreshold::checkpoint(-9),
            AlertThreshold::surface(0),
        ],
    )
    .expect("valid config");
    sweep(&config);
}
