//! Single-producer/single-consumer ring of gap buffers.
//!
//! The producer side runs on every rising edge of the receiver's data
//! line — from a dedicated edge task or a real interrupt handler — and is
//! wait-free: a handful of byte loads and stores per edge, no locking, no
//! allocation. The consumer side runs in the main loop and disables
//! interrupts only around the indexing decision; demodulation of a
//! delivered buffer happens with interrupts enabled while the producer
//! keeps filling its own buffer.
//!
//! Ownership discipline: `incoming` is written only by the producer
//! (except for the consumer's finalize-by-timeout takeover, which runs
//! inside a critical section), `outgoing` only by the consumer. The
//! buffers from `outgoing` up to but excluding `incoming` belong to the
//! consumer; the buffer at `incoming` belongs to the producer; equal
//! indices mean the ring is empty. When the producer laps the consumer it
//! overwrites the oldest unread buffer and reports [`RanOutOfBuffers`];
//! the buffer cells are byte atomics, so the lagging consumer sees stale
//! or mixed samples (which fail demodulation) rather than tearing.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::gap_width::GapWidth;
use crate::micros::{duration_from_to, MicrosClock};
use crate::packet_buffer::PacketBuffer;
use crate::shared_constants::{
    BUFFER_COUNT, MIN_VIABLE_GAPS, PACKET_FINAL_TIMEOUT, REQUIRED_GAPS,
};

/// Every buffer filled before the main loop drained one; the oldest
/// unread packet is being overwritten. Soft: the train will repeat it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct RanOutOfBuffers;

/// The shared ring. Place one in a `static` and [`split`](Self::split) it
/// once into the two halves.
pub struct GapRing {
    buffers: [PacketBuffer; BUFFER_COUNT as usize],
    incoming: AtomicU8,
    outgoing: AtomicU8,
    first_edge_seen: AtomicBool,
    alive: AtomicBool,
    taken: AtomicBool,
}

impl GapRing {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffers: [const { PacketBuffer::new() }; BUFFER_COUNT as usize],
            incoming: AtomicU8::new(0),
            outgoing: AtomicU8::new(0),
            first_edge_seen: AtomicBool::new(false),
            alive: AtomicBool::new(false),
            taken: AtomicBool::new(false),
        }
    }

    /// Split into the edge-context producer and the main-loop drain.
    ///
    /// Returns `None` after the first call: exactly one of each half may
    /// exist, which is what makes the lock-free discipline hold.
    pub fn split<C: MicrosClock>(
        &'static self,
        clock: C,
    ) -> Option<(EdgeProducer<C>, PacketDrain)> {
        if self.taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((EdgeProducer { ring: self, clock }, PacketDrain { ring: self }))
    }

    /// Read and clear the has-been-alive flag.
    ///
    /// Set on every handled edge; consumed by a heartbeat to tell a quiet
    /// band from a dead antenna.
    pub fn has_been_alive(&self) -> bool {
        self.alive.swap(false, Ordering::Relaxed)
    }

    fn next_buffer(index: u8) -> u8 {
        let next = index + 1;
        if next < BUFFER_COUNT {
            next
        } else {
            0
        }
    }

    /// Decide whether a buffer is ready for the consumer. Must run with
    /// interrupts disabled so the producer cannot move `incoming` under
    /// our feet.
    fn finalize_offline(&self, now_micros: u32) -> bool {
        let incoming = self.incoming.load(Ordering::Relaxed);
        if self.outgoing.load(Ordering::Relaxed) != incoming {
            return true;
        }
        let buffer = &self.buffers[incoming as usize];
        if buffer.gaps_seen() == REQUIRED_GAPS
            && duration_from_to(buffer.last_edge_micros(), now_micros) >= PACKET_FINAL_TIMEOUT
        {
            // Complete packet followed by silence instead of a delimiter.
            // Take it over; the producer starts fresh on its next edge.
            self.incoming
                .store(Self::next_buffer(incoming), Ordering::Relaxed);
            self.first_edge_seen.store(false, Ordering::Relaxed);
            return true;
        }
        false
    }
}

impl Default for GapRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half: call [`handle_rise`](Self::handle_rise) on every rising
/// edge of the data line.
pub struct EdgeProducer<C: MicrosClock> {
    ring: &'static GapRing,
    clock: C,
}

impl<C: MicrosClock> EdgeProducer<C> {
    /// Record the gap that the current rising edge closes.
    ///
    /// O(1) and wait-free. A gap below the delimiter threshold becomes a
    /// sample in the incoming buffer; a delimiter rotates to the next
    /// buffer when enough of a packet accumulated, or quietly restarts
    /// the current one when the reception was noise.
    pub fn handle_rise(&mut self) -> Result<(), RanOutOfBuffers> {
        let now = self.clock.now_micros();
        let ring = self.ring;
        let mut status = Ok(());
        let mut incoming = ring.incoming.load(Ordering::Relaxed);

        if ring.first_edge_seen.load(Ordering::Relaxed) {
            let buffer = &ring.buffers[incoming as usize];
            let gap = duration_from_to(buffer.last_edge_micros(), now);
            if let Some(width) = GapWidth::from_gap(gap) {
                buffer.append(width, now);
            } else {
                if buffer.gaps_seen() >= MIN_VIABLE_GAPS {
                    incoming = GapRing::next_buffer(incoming);
                    ring.incoming.store(incoming, Ordering::Release);
                    if incoming == ring.outgoing.load(Ordering::Relaxed) {
                        status = Err(RanOutOfBuffers);
                    }
                }
                ring.buffers[incoming as usize].restart(now);
            }
        } else {
            // First edge after reset or takeover: no previous edge to
            // measure a gap against.
            ring.first_edge_seen.store(true, Ordering::Relaxed);
            ring.buffers[incoming as usize].restart(now);
        }

        ring.alive.store(true, Ordering::Relaxed);
        status
    }

    /// Read and clear the has-been-alive flag.
    pub fn has_been_alive(&self) -> bool {
        self.ring.has_been_alive()
    }
}

/// Consumer half: owned by the main loop.
pub struct PacketDrain {
    ring: &'static GapRing,
}

impl PacketDrain {
    /// Deliver at most one finalised buffer to `receive`.
    ///
    /// Interrupts are disabled for the indexing decision only; `receive`
    /// itself runs with interrupts enabled. The delivered buffer is
    /// cleared afterwards so the finalize-by-timeout path cannot hand it
    /// out twice during a long silence.
    pub fn drain_one<R>(
        &mut self,
        now_micros: u32,
        receive: impl FnOnce(&PacketBuffer) -> R,
    ) -> Option<R> {
        let ready = critical_section::with(|_| self.ring.finalize_offline(now_micros));
        if !ready {
            return None;
        }
        let outgoing = self.ring.outgoing.load(Ordering::Relaxed);
        let buffer = &self.ring.buffers[outgoing as usize];
        let result = receive(buffer);
        buffer.clear();
        self.ring
            .outgoing
            .store(GapRing::next_buffer(outgoing), Ordering::Release);
        Some(result)
    }

    /// Read and clear the has-been-alive flag.
    pub fn has_been_alive(&self) -> bool {
        self.ring.has_been_alive()
    }
}
