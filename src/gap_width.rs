use crate::shared_constants::{PACKET_GAP_TIMEOUT, TIME_SCALING};

/// Width of one inter-edge gap, in 32 µs slots.
///
/// One byte covers every storable gap: the widest non-delimiter interval,
/// 8191 µs, scales to 255.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct GapWidth(u8);

impl GapWidth {
    pub(crate) const fn from_slots(slots: u8) -> Self {
        Self(slots)
    }

    /// Scale a gap duration to slots.
    ///
    /// Returns `None` when the gap is a packet delimiter, i.e. at least
    /// [`PACKET_GAP_TIMEOUT`] µs. The comparison is on real microseconds,
    /// never on the scaled byte, so 8192 µs is a delimiter while 8191 µs
    /// is the widest storable sample.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_gap(gap_micros: u32) -> Option<Self> {
        if gap_micros < PACKET_GAP_TIMEOUT {
            Some(Self((gap_micros >> TIME_SCALING) as u8))
        } else {
            None
        }
    }

    /// The raw slot count.
    #[inline]
    #[must_use]
    pub const fn slots(self) -> u8 {
        self.0
    }
}

impl From<GapWidth> for u8 {
    fn from(width: GapWidth) -> Self {
        width.slots()
    }
}
