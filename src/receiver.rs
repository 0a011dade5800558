//! Main-loop façade over the ring, the demodulator and the train tracker.

use crate::demodulator::{decode, Reception};
use crate::gap_ring::PacketDrain;
use crate::notice::EventSink;
use crate::packet_train::PacketTrain;

/// Drains finalised buffers, decodes them and de-duplicates the packet
/// train, surfacing at most one fresh payload per poll.
pub struct Receiver {
    drain: PacketDrain,
    train: PacketTrain,
}

impl Receiver {
    #[must_use]
    pub const fn new(drain: PacketDrain) -> Self {
        Self {
            drain,
            train: PacketTrain::new(),
        }
    }

    /// Call once at startup, before the first edge can arrive.
    pub fn setup(&mut self, now_micros: u32) {
        self.train.setup(now_micros);
    }

    /// Poll for one fresh payload.
    ///
    /// Always makes progress: every queued buffer that decodes to a
    /// repeat or to garbage is consumed and dropped, and the first fresh
    /// payload is returned immediately. Returns `None` once the ring has
    /// nothing more to deliver.
    pub fn receive<S: EventSink>(&mut self, now_micros: u32, sink: &mut S) -> Option<Reception> {
        loop {
            let train = &self.train;
            let Some(outcome) = self.drain.drain_one(now_micros, |buffer| {
                let with_conviction = !train.is_settling_down(buffer.last_edge_micros());
                decode(buffer, with_conviction, sink)
            }) else {
                self.train.catch_up(now_micros);
                return None;
            };
            if let Ok(reception) = outcome {
                if self.train.handle(reception.bits, reception.micros) {
                    return Some(reception);
                }
            }
        }
    }

    /// Liveness probe: reads and clears the has-been-alive flag.
    pub fn has_been_alive(&self) -> bool {
        self.drain.has_been_alive()
    }
}
