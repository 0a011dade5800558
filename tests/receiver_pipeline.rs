//! End-to-end host tests: edges in, de-duplicated payloads out.
#![cfg(feature = "host")]

mod common;

use common::{RecordingSink, Rig, DELIMITER_MICROS, PAYLOAD};
use dio_rx::notice::{NullSink, ProtocolNotice};
use dio_rx::shared_constants::{PACKET_FINAL_TIMEOUT, TRAIN_TIMEOUT};

#[test]
fn clean_packet_surfaces_exactly_once() {
    let mut rig = Rig::new(1_000);
    let mut sink = RecordingSink::default();

    rig.feed_packet(PAYLOAD);
    rig.clock.advance(PACKET_FINAL_TIMEOUT);

    let reception = rig
        .receiver
        .receive(rig.clock.now(), &mut sink)
        .expect("one clean packet");
    assert_eq!(reception.bits, PAYLOAD);
    assert!(sink.notices.is_empty());

    assert!(rig.receiver.receive(rig.clock.now(), &mut sink).is_none());
}

#[test]
fn a_train_surfaces_as_one_event() {
    let mut rig = Rig::new(0);
    let mut sink = RecordingSink::default();

    // One button press: the same packet four times, ~10 ms apart. Poll
    // between packets like the firmware's pump does.
    let mut surfaced = 0;
    for _ in 0..4 {
        rig.feed_packet(PAYLOAD);
        rig.clock.advance(PACKET_FINAL_TIMEOUT);
        while rig.receiver.receive(rig.clock.now(), &mut sink).is_some() {
            surfaced += 1;
        }
    }
    assert_eq!(surfaced, 1, "the train collapses to one event");

    // Quiet polling through the rest of the settling window stays quiet.
    for _ in 0..8 {
        rig.clock.advance(TRAIN_TIMEOUT / 16);
        assert!(rig.receiver.receive(rig.clock.now(), &mut sink).is_none());
    }
    assert!(sink.notices.is_empty(), "repeats are not anomalies");

    // The next press after the window is a fresh event.
    rig.clock.advance(TRAIN_TIMEOUT);
    rig.feed_packet(PAYLOAD);
    rig.clock.advance(PACKET_FINAL_TIMEOUT);
    assert!(rig.receiver.receive(rig.clock.now(), &mut sink).is_some());
}

#[test]
fn corrupted_packet_yields_notice_and_no_payload() {
    let mut rig = Rig::new(0);
    // Step past the boot settling window so notices carry conviction.
    rig.clock.advance(2 * TRAIN_TIMEOUT);

    let mut gaps = common::encode_packet(PAYLOAD);
    let narrow_at = gaps
        .iter()
        .position(|&gap| gap == common::NARROW_MICROS)
        .expect("payload has narrow gaps");
    gaps[narrow_at] = 300;

    rig.gap_rise(DELIMITER_MICROS);
    for gap in gaps {
        rig.gap_rise(gap);
    }
    rig.clock.advance(PACKET_FINAL_TIMEOUT);

    let mut sink = RecordingSink::default();
    assert!(rig.receiver.receive(rig.clock.now(), &mut sink).is_none());
    assert_eq!(sink.notices, [ProtocolNotice::WrongPeakSpacing]);
}

#[test]
fn truncated_packet_yields_missing_gap_notice() {
    let mut rig = Rig::new(0);
    rig.clock.advance(2 * TRAIN_TIMEOUT);

    let gaps = common::encode_packet(PAYLOAD);
    rig.gap_rise(DELIMITER_MICROS);
    for &gap in &gaps[..64] {
        rig.gap_rise(gap);
    }
    // The closing delimiter rotates the 64-gap reception out.
    rig.gap_rise(DELIMITER_MICROS);

    let mut sink = RecordingSink::default();
    assert!(rig.receiver.receive(rig.clock.now(), &mut sink).is_none());
    assert_eq!(sink.notices, [ProtocolNotice::Missing1Gap]);
}

#[test]
fn decoding_succeeds_across_the_counter_wrap() {
    // The packet's edges straddle the 32-bit counter wrap.
    let mut rig = Rig::new(u32::MAX - 40_000);

    rig.feed_packet(PAYLOAD);
    let last_edge = rig.clock.now();
    assert!(last_edge < u32::MAX - 40_000, "the packet crossed the wrap");

    rig.clock.advance(PACKET_FINAL_TIMEOUT);
    let mut sink = RecordingSink::default();
    let reception = rig
        .receiver
        .receive(rig.clock.now(), &mut sink)
        .expect("wrap must not confuse durations");
    assert_eq!(reception.bits, PAYLOAD);
    assert_eq!(reception.micros, last_edge);
    assert!(sink.notices.is_empty());
}

#[test]
fn payloads_surface_in_edge_order() {
    let mut rig = Rig::new(0);
    let payloads = [0x1111_1111u32, 0x2222_2222, 0x3333_3333];

    for &bits in &payloads {
        rig.feed_packet(bits);
    }
    rig.clock.advance(PACKET_FINAL_TIMEOUT);

    let mut surfaced = Vec::new();
    while let Some(reception) = rig.receiver.receive(rig.clock.now(), &mut NullSink) {
        surfaced.push((reception.bits, reception.micros));
    }
    assert_eq!(
        surfaced.iter().map(|&(bits, _)| bits).collect::<Vec<_>>(),
        payloads
    );
    assert!(
        surfaced.windows(2).all(|pair| pair[0].1 <= pair[1].1),
        "timestamps non-decreasing"
    );
}
