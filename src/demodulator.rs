//! Validation and bit extraction for one finalised gap buffer.
//!
//! The wire encoding is a pulse-distance code: each bit occupies two
//! slots, a narrow gap next to a wide gap, with the ordering carrying the
//! bit value. Tracking the narrow-run length against the parity of the
//! bits decoded so far verifies each bit's complement-pair structure
//! incrementally; the run trailing the last wide gap must then equal the
//! parity of the whole word.

use crate::notice::{EventSink, ProtocolNotice};
use crate::packet_buffer::PacketBuffer;
use crate::shared_constants::{
    MAX_NARROW_GAP_WIDTH, MAX_PREAMBLE, MIN_NARROW_GAP_WIDTH, MIN_PREAMBLE, MIN_WIDE_GAP_WIDTH,
    REQUIRED_GAPS,
};

/// A successfully demodulated packet: the 32-bit payload and the
/// timestamp of its final rising edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct Reception {
    pub bits: u32,
    pub micros: u32,
}

/// Validate `buffer` and extract its payload.
///
/// `with_conviction` gates sink output only: during the settling-down
/// window after a handled packet, our own actuation garbles the tail of
/// the train and the resulting notices would drown the log. The return
/// value is unaffected by suppression.
pub fn decode<S: EventSink>(
    buffer: &PacketBuffer,
    with_conviction: bool,
    sink: &mut S,
) -> Result<Reception, ProtocolNotice> {
    let gap_count = buffer.gaps_seen();
    if gap_count != REQUIRED_GAPS {
        let notice = if gap_count > REQUIRED_GAPS {
            ProtocolNotice::ExcessGaps
        } else if gap_count == REQUIRED_GAPS - 1 {
            ProtocolNotice::Missing1Gap
        } else if gap_count == REQUIRED_GAPS - 2 {
            ProtocolNotice::Missing2Gaps
        } else {
            ProtocolNotice::MissingNGaps
        };
        if with_conviction {
            sink.notice_value(notice, u32::from(gap_count));
        }
        return Err(notice);
    }

    let preamble = buffer.width(0).slots();
    if preamble < MIN_PREAMBLE || preamble > MAX_PREAMBLE {
        if with_conviction {
            sink.notice_value(ProtocolNotice::InvalidPreamble, u32::from(preamble));
        }
        return Err(ProtocolNotice::InvalidPreamble);
    }

    let mut adjacent_narrow_gaps: u8 = 0;
    let mut bitcount: u8 = 0;
    let mut spacing_errors: u8 = 0;
    let mut bit_errors: u8 = 0;
    let mut bits: u32 = 0;
    for position in 1..REQUIRED_GAPS {
        let width = buffer.width(position).slots();
        if width < MIN_WIDE_GAP_WIDTH {
            spacing_errors += u8::from(width < MIN_NARROW_GAP_WIDTH);
            spacing_errors += u8::from(width > MAX_NARROW_GAP_WIDTH);
            adjacent_narrow_gaps += 1;
        } else {
            // A run of n narrow gaps before this wide gap encodes
            // bit = 1 + parity - n; anything outside {0, 1} is an error.
            #[allow(clippy::cast_possible_truncation)]
            let parity = (bits & 1) as u8;
            let bit = (1 + parity).wrapping_sub(adjacent_narrow_gaps);
            bit_errors += u8::from(bit > 1);
            bits = (bits << 1) | u32::from(bit & 1);
            bitcount += 1;
            adjacent_narrow_gaps = 0;
        }
    }

    if spacing_errors > 0 {
        if with_conviction {
            sink.notice_text(ProtocolNotice::WrongPeakSpacing, "peak spacing out of band");
        }
        return Err(ProtocolNotice::WrongPeakSpacing);
    }
    if bit_errors > 0 {
        if with_conviction {
            sink.notice_text(
                ProtocolNotice::WrongAdjacentPeakCount,
                "wrong number of adjacent peaks",
            );
        }
        return Err(ProtocolNotice::WrongAdjacentPeakCount);
    }
    if bitcount != 32 {
        if with_conviction {
            sink.notice_value(ProtocolNotice::WrongBitCount, u32::from(bitcount));
        }
        return Err(ProtocolNotice::WrongBitCount);
    }
    #[allow(clippy::cast_possible_truncation)]
    if adjacent_narrow_gaps != (bits & 1) as u8 {
        if with_conviction {
            sink.notice_value(ProtocolNotice::WrongParity, u32::from(adjacent_narrow_gaps));
        }
        return Err(ProtocolNotice::WrongParity);
    }

    Ok(Reception {
        bits,
        micros: buffer.last_edge_micros(),
    })
}
