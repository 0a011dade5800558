//! De-duplication of the packet train one button press broadcasts.

use crate::micros::duration_from_to;
use crate::shared_constants::TRAIN_TIMEOUT;

/// Tracks the last handled payload so the ~5 identical packets of one
/// broadcast surface as a single event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PacketTrain {
    last_bits_handled: Option<u32>,
    last_event_time: Option<u32>,
}

impl PacketTrain {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_bits_handled: None,
            last_event_time: None,
        }
    }

    /// Initialise at startup. Stamping `now` makes the boot moment count
    /// as an event, so we settle down instead of acting on a broadcast we
    /// may be tuning into halfway.
    pub fn setup(&mut self, now_micros: u32) {
        self.last_bits_handled = None;
        self.last_event_time = Some(now_micros);
    }

    /// Whether we are:
    /// - right after booting, when we may well be tuning in at the middle
    ///   of a broadcast;
    /// - right after handling a packet, when our response degrades the
    ///   reception quality of the rest of the train.
    #[must_use]
    pub fn is_settling_down(&self, time_received: u32) -> bool {
        self.last_event_time
            .is_some_and(|last| duration_from_to(last, time_received) < TRAIN_TIMEOUT)
    }

    /// Report a decoded payload. Returns whether it is fresh; a repeat of
    /// the previous payload within the settling-down window is not.
    pub fn handle(&mut self, bits_received: u32, time_received: u32) -> bool {
        if self.last_bits_handled == Some(bits_received) && self.is_settling_down(time_received) {
            false
        } else {
            self.last_bits_handled = Some(bits_received);
            self.last_event_time = Some(time_received);
            true
        }
    }

    /// Forget `last_event_time` once it is stale enough that the counter
    /// could come around to it again. The threshold is "the signed
    /// interpretation of the elapsed time turned negative"; calling this
    /// twice with the same `now` is the same as calling it once.
    pub fn catch_up(&mut self, now_micros: u32) {
        if let Some(last) = self.last_event_time {
            if duration_from_to(last, now_micros) & 0x8000_0000 != 0 {
                self.last_event_time = None;
            }
        }
    }
}
