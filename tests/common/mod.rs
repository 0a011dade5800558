//! Shared harness for the host-side pipeline tests.
#![allow(dead_code)] // not every test file uses every helper

use std::cell::Cell;
use std::rc::Rc;

use dio_rx::gap_ring::{EdgeProducer, GapRing, PacketDrain};
use dio_rx::gap_width::GapWidth;
use dio_rx::micros::MicrosClock;
use dio_rx::notice::{EventSink, ProtocolNotice};
use dio_rx::packet_buffer::PacketBuffer;
use dio_rx::receiver::Receiver;

/// A microsecond counter the test advances by hand.
#[derive(Clone, Debug)]
pub struct FakeClock(Rc<Cell<u32>>);

impl FakeClock {
    pub fn new(start: u32) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn now(&self) -> u32 {
        self.0.get()
    }

    pub fn advance(&self, micros: u32) {
        self.0.set(self.0.get().wrapping_add(micros));
    }
}

impl MicrosClock for FakeClock {
    fn now_micros(&self) -> u32 {
        self.0.get()
    }
}

/// Sink that records every notice it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub notices: Vec<ProtocolNotice>,
}

impl EventSink for RecordingSink {
    fn notice_value(&mut self, notice: ProtocolNotice, _value: u32) {
        self.notices.push(notice);
    }

    fn notice_text(&mut self, notice: ProtocolNotice, _text: &str) {
        self.notices.push(notice);
    }
}

/// Gap durations in µs for one packet of `bits`: the preamble, then per
/// bit (MSB first) a wide/narrow pair whose ordering encodes the bit.
/// The trailing narrow run automatically ends up equal to `bits & 1`.
pub fn encode_packet(bits: u32) -> Vec<u32> {
    let mut gaps = vec![PREAMBLE_MICROS];
    for position in (0..32).rev() {
        if (bits >> position) & 1 == 1 {
            gaps.push(WIDE_MICROS);
            gaps.push(NARROW_MICROS);
        } else {
            gaps.push(NARROW_MICROS);
            gaps.push(WIDE_MICROS);
        }
    }
    gaps
}

pub const PREAMBLE_MICROS: u32 = 2720;
pub const NARROW_MICROS: u32 = 500;
pub const WIDE_MICROS: u32 = 1600;
pub const DELIMITER_MICROS: u32 = 10_000;

/// The payload used by most end-to-end tests.
pub const PAYLOAD: u32 = 0xB3F0_5AA5;

/// Build a buffer directly from a gap sequence, as the producer would,
/// with edges starting at `start_micros`.
pub fn buffer_from_gaps(start_micros: u32, gaps: &[u32]) -> PacketBuffer {
    let buffer = PacketBuffer::new();
    buffer.restart(start_micros);
    let mut now = start_micros;
    for &gap in gaps {
        now = now.wrapping_add(gap);
        let width = GapWidth::from_gap(gap).expect("test gap must not be a delimiter");
        buffer.append(width, now);
    }
    buffer
}

/// A producer, a façade and the clock they share, wired to a leaked ring.
pub struct Rig {
    pub clock: FakeClock,
    pub producer: EdgeProducer<FakeClock>,
    pub receiver: Receiver,
}

impl Rig {
    pub fn new(start_micros: u32) -> Self {
        let ring: &'static GapRing = Box::leak(Box::new(GapRing::new()));
        let clock = FakeClock::new(start_micros);
        let (producer, drain) = ring.split(clock.clone()).expect("fresh ring");
        let mut receiver = Receiver::new(drain);
        receiver.setup(start_micros);
        Self {
            clock,
            producer,
            receiver,
        }
    }

    /// One rising edge right now.
    pub fn rise(&mut self) -> bool {
        self.producer.handle_rise().is_err()
    }

    /// Advance the clock by `gap` and raise an edge; returns whether the
    /// producer reported an overrun.
    pub fn gap_rise(&mut self, gap: u32) -> bool {
        self.clock.advance(gap);
        self.rise()
    }

    /// Feed a whole packet (opening delimiter plus 65 gaps); returns the
    /// number of overruns the producer reported.
    pub fn feed_packet(&mut self, bits: u32) -> usize {
        let mut overruns = usize::from(self.gap_rise(DELIMITER_MICROS));
        for gap in encode_packet(bits) {
            overruns += usize::from(self.gap_rise(gap));
        }
        overruns
    }
}

/// Split a leaked ring for tests that poke the drain directly.
pub fn split_ring(clock: &FakeClock) -> (EdgeProducer<FakeClock>, PacketDrain) {
    let ring: &'static GapRing = Box::leak(Box::new(GapRing::new()));
    ring.split(clock.clone()).expect("fresh ring")
}
