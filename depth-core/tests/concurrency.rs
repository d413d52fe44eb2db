use std::sync::Arc;
use std::thread;

use depth_core::position::PositionStore;
use depth_core::quadrature::{
    CLOCKWISE_SEQUENCE, PinLevels, QuadratureDecoder, RawStep, Resolution, next_levels,
};

#[test]
fn steps_between_polls_coalesce_into_one_delta() {
    let store = PositionStore::new();
    for _ in 0..7 {
        store.apply_step(RawStep::Clockwise);
    }
    store.apply_step(RawStep::CounterClockwise);

    let change = store.read_and_clear_change();
    assert_eq!(change.delta, 6);
    assert_eq!(change.count, 6);
    assert!(change.moved);

    let quiet = store.read_and_clear_change();
    assert_eq!(quiet.delta, 0);
    assert!(!quiet.moved);
}

#[test]
fn back_and_forth_still_counts_as_motion() {
    let store = PositionStore::new();
    store.apply_step(RawStep::Clockwise);
    store.apply_step(RawStep::CounterClockwise);

    let change = store.read_and_clear_change();
    assert_eq!(change.delta, 0);
    assert!(change.has_motion());
}

#[test]
fn concurrent_writers_lose_no_steps() {
    let store = Arc::new(PositionStore::new());
    let writers: Vec<_> = [RawStep::Clockwise, RawStep::Clockwise, RawStep::CounterClockwise]
        .into_iter()
        .map(|step| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    store.apply_step(step);
                }
            })
        })
        .collect();

    let mut drained = 0;
    for _ in 0..100 {
        drained += store.read_and_clear_change().delta;
    }
    for writer in writers {
        writer.join().expect("writer thread");
    }
    drained += store.read_and_clear_change().delta;

    assert_eq!(drained, 10_000);
    assert_eq!(store.count(), 10_000);
}

#[test]
fn decoded_detents_feed_the_store() {
    let store = PositionStore::new();
    let mut levels = CLOCKWISE_SEQUENCE[0];
    let mut decoder = QuadratureDecoder::new(Resolution::Detent, levels);

    for _ in 0..3 * 4 {
        levels = next_levels(levels, true);
        store.apply_step(decoder.update(levels));
    }
    for _ in 0..4 {
        levels = next_levels(levels, false);
        store.apply_step(decoder.update(levels));
    }

    assert_eq!(store.count(), 2);
    assert_eq!(decoder.glitches(), 0);
}

#[test]
fn glitch_transitions_do_not_move_the_counter() {
    let store = PositionStore::new();
    let start = PinLevels::new(false, false);
    let mut decoder = QuadratureDecoder::new(Resolution::EveryTransition, start);

    store.apply_step(decoder.update(PinLevels::new(true, true)));
    store.apply_step(decoder.update(PinLevels::new(false, false)));

    assert_eq!(store.count(), 0);
    assert_eq!(decoder.glitches(), 2);
}
