//! One packet's worth of gap samples.
//!
//! Every cell is a byte-sized (or word-sized) atomic accessed with relaxed
//! loads and stores, which compile to plain loads and stores on ARM. The
//! ring hands a buffer to exactly one writer at a time; the atomics make
//! the deliberately-tolerated overrun case (a lagging consumer reading a
//! buffer the producer has reclaimed) yield garbage samples instead of
//! undefined behaviour. Garbled contents fail demodulation and are
//! dropped.

use portable_atomic::{AtomicU8, AtomicU32, Ordering};

use crate::gap_width::GapWidth;
use crate::shared_constants::REQUIRED_GAPS;

/// Fixed-capacity record of the gaps between a packet's rising edges.
///
/// `gaps_seen` counts every gap since the opening delimiter and saturates
/// at 255; only the first [`REQUIRED_GAPS`] samples are stored. A count
/// above the capacity is meaningful — it says "too many peaks" — even
/// though the excess samples themselves are discarded.
pub struct PacketBuffer {
    last_edge_micros: AtomicU32,
    gap_widths: [AtomicU8; REQUIRED_GAPS as usize],
    gaps_seen: AtomicU8,
}

impl PacketBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_edge_micros: AtomicU32::new(0),
            gap_widths: [const { AtomicU8::new(0) }; REQUIRED_GAPS as usize],
            gaps_seen: AtomicU8::new(0),
        }
    }

    /// Begin a fresh reception: forget all samples, stamp the opening edge.
    pub fn restart(&self, now_micros: u32) {
        self.gaps_seen.store(0, Ordering::Relaxed);
        self.last_edge_micros.store(now_micros, Ordering::Relaxed);
    }

    /// Record one gap sample and stamp the edge that closed it.
    pub fn append(&self, width: GapWidth, now_micros: u32) {
        let seen = self.gaps_seen.load(Ordering::Relaxed);
        if seen < REQUIRED_GAPS {
            self.gap_widths[seen as usize].store(width.slots(), Ordering::Relaxed);
        }
        self.gaps_seen.store(seen.saturating_add(1), Ordering::Relaxed);
        self.last_edge_micros.store(now_micros, Ordering::Relaxed);
    }

    /// Forget the samples without touching the edge timestamp.
    pub fn clear(&self) {
        self.gaps_seen.store(0, Ordering::Relaxed);
    }

    /// Gaps observed since the opening delimiter (saturating at 255).
    #[inline]
    #[must_use]
    pub fn gaps_seen(&self) -> u8 {
        self.gaps_seen.load(Ordering::Relaxed)
    }

    /// Timestamp of the most recent rising edge written into this buffer.
    #[inline]
    #[must_use]
    pub fn last_edge_micros(&self) -> u32 {
        self.last_edge_micros.load(Ordering::Relaxed)
    }

    /// The stored sample at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= REQUIRED_GAPS`.
    #[inline]
    #[must_use]
    pub fn width(&self, index: u8) -> GapWidth {
        GapWidth::from_slots(self.gap_widths[index as usize].load(Ordering::Relaxed))
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}
