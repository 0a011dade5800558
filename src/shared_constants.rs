//! Timing table for the Chacon/DIO 32-bit OOK protocol.
//!
//! Gap widths are measured in slots of 32 µs (`1 << TIME_SCALING`), which is
//! coarse enough for one byte per gap and fine enough to separate the
//! protocol's narrow/wide/preamble bands.

/// Number of gaps between rising edges forming one valid packet:
/// 1 preamble plus 64 bit-carrying gaps.
pub const REQUIRED_GAPS: u8 = 65;

/// Below this many gaps, a delimiter does not rotate to a fresh buffer;
/// the partial reception is treated as noise and discarded in place.
pub const MIN_VIABLE_GAPS: u8 = 60;

/// Buffers in the ring shared between the edge handler and the main loop.
pub const BUFFER_COUNT: u8 = 4;

/// Gap durations are scaled to slots by `micros >> TIME_SCALING` (32 µs).
pub const TIME_SCALING: u32 = 5;

/// An inter-edge interval of at least this many µs is a packet delimiter,
/// never a sample. 8192 µs is one slot past the widest storable gap.
pub const PACKET_GAP_TIMEOUT: u32 = 8192;

/// Silence after the 65th gap that lets the main loop declare the packet
/// final without waiting for the next delimiter.
pub const PACKET_FINAL_TIMEOUT: u32 = 2048;

/// Narrow (adjacent-peak) gap band, in slots: 384–768 µs.
pub const MIN_NARROW_GAP_WIDTH: u8 = 12;
pub const MAX_NARROW_GAP_WIDTH: u8 = 24;

/// Wide (bit-separating) gaps start here, in slots: 1280 µs.
pub const MIN_WIDE_GAP_WIDTH: u8 = 40;

/// Preamble gap band, in slots: 1920–3840 µs.
pub const MIN_PREAMBLE: u8 = 60;
pub const MAX_PREAMBLE: u8 = 120;

/// One button press broadcasts a train of ~5 identical packets over
/// ~50 ms; repeats within this window are suppressed.
pub const TRAIN_TIMEOUT: u32 = 328_000;
