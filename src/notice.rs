//! Protocol-layer anomaly reporting.
//!
//! The demodulator and the ring describe what went wrong with a numeric
//! tag plus a measurement or a short text. Sinks are pluggable so the
//! release build can drop everything at compile time.

/// Anomaly tags. Tag 0 is reserved for "no notice".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
#[repr(u8)]
pub enum ProtocolNotice {
    /// Fewer than 63 gaps between delimiters.
    MissingNGaps = 1,
    /// Exactly two gaps short of a packet.
    Missing2Gaps = 2,
    /// One gap short of a packet.
    Missing1Gap = 5,
    /// More gaps than a packet holds.
    ExcessGaps = 6,
    /// First gap outside the preamble band.
    InvalidPreamble = 7,
    /// A narrow gap outside the 384–768 µs band.
    WrongPeakSpacing = 8,
    /// A narrow-gap run that doesn't decode to 0 or 1.
    WrongAdjacentPeakCount = 9,
    /// Not exactly 32 bits between preamble and trailer.
    WrongBitCount = 10,
    /// Trailing narrow-gap run disagrees with the word's parity.
    WrongParity = 11,
    /// The ring overwrote the oldest unread buffer.
    RanOutOfBuffers = 12,
}

impl ProtocolNotice {
    /// The numeric tag carried on the wire to the log sink.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// Where notices go.
pub trait EventSink {
    /// A notice with a numeric measurement (a gap count, a slot width...).
    fn notice_value(&mut self, notice: ProtocolNotice, value: u32);
    /// A notice with a short description.
    fn notice_text(&mut self, notice: ProtocolNotice, text: &str);
}

/// Drops every notice; costs nothing in a release build.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    #[inline]
    fn notice_value(&mut self, _notice: ProtocolNotice, _value: u32) {}
    #[inline]
    fn notice_text(&mut self, _notice: ProtocolNotice, _text: &str) {}
}

/// Forwards notices to the defmt log.
#[cfg(not(feature = "host"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefmtSink;

#[cfg(not(feature = "host"))]
impl EventSink for DefmtSink {
    fn notice_value(&mut self, notice: ProtocolNotice, value: u32) {
        defmt::info!("notice {=u8} {}: {=u32}", notice.tag(), notice, value);
    }

    fn notice_text(&mut self, notice: ProtocolNotice, text: &str) {
        defmt::info!("notice {=u8} {}: {=str}", notice.tag(), notice, text);
    }
}
