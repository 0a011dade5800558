//! Device abstraction for the 433 MHz OOK receiver pipeline.
//!
//! Two spawned tasks wrap the lock-free core: an edge task that stamps
//! every rising edge of the data line into the ring, and a pump task that
//! polls the [`Receiver`] façade and forwards fresh, de-duplicated
//! packets into a channel. The application only awaits
//! [`next_packet`](Radio::next_packet).

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{AnyPin, Input, Pin, Pull};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};

use crate::demodulator::Reception;
use crate::gap_ring::{EdgeProducer, GapRing};
use crate::micros::{BootMicros, MicrosClock};
use crate::notice::{DefmtSink, ProtocolNotice};
use crate::receiver::Receiver;
use crate::{Error, Result};

/// How often the pump task polls the ring. Well under the 2048 µs
/// finality window, so a finished packet is claimed promptly, and far
/// shorter than the ~10 ms between a train's packets.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Fresh receptions waiting for the application.
pub type RadioNotifier = Channel<CriticalSectionRawMutex, Reception, 4>;

/// Static resources for [`Radio`].
pub struct RadioStatic {
    ring: GapRing,
    notifier: RadioNotifier,
}

impl RadioStatic {
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            ring: GapRing::new(),
            notifier: Channel::new(),
        }
    }
}

/// Handle to the running receiver pipeline.
pub struct Radio {
    ring: &'static GapRing,
    notifier: &'static RadioNotifier,
}

impl Radio {
    #[must_use]
    pub const fn new_static() -> RadioStatic {
        RadioStatic::new_static()
    }

    /// Claim the data pin and spawn the pipeline tasks.
    pub fn new<P: Pin>(
        pin: Peri<'static, P>,
        pull: Pull,
        radio_static: &'static RadioStatic,
        spawner: Spawner,
    ) -> Result<Self> {
        let (producer, drain) = radio_static
            .ring
            .split(BootMicros)
            .ok_or(Error::RingAlreadySplit)?;

        let any: Peri<'static, AnyPin> = pin.into();
        let input = Input::new(any, pull);
        spawner
            .spawn(edge_task(input, producer))
            .map_err(Error::TaskSpawn)?;

        let mut receiver = Receiver::new(drain);
        receiver.setup(BootMicros.now_micros());
        spawner
            .spawn(pump_task(receiver, &radio_static.notifier))
            .map_err(Error::TaskSpawn)?;

        Ok(Self {
            ring: &radio_static.ring,
            notifier: &radio_static.notifier,
        })
    }

    /// Wait for the next fresh (de-duplicated) reception.
    pub async fn next_packet(&self) -> Reception {
        self.notifier.receive().await
    }

    /// Liveness probe for the heartbeat LED: reads and clears the
    /// has-been-alive flag.
    #[must_use]
    pub fn has_been_alive(&self) -> bool {
        self.ring.has_been_alive()
    }
}

#[embassy_executor::task]
async fn edge_task(mut input: Input<'static>, mut producer: EdgeProducer<BootMicros>) -> ! {
    info!("radio edge task started");
    loop {
        input.wait_for_rising_edge().await;
        if producer.handle_rise().is_err() {
            warn!(
                "notice {=u8}: ran out of gap buffers",
                ProtocolNotice::RanOutOfBuffers.tag()
            );
        }
    }
}

#[embassy_executor::task]
async fn pump_task(mut receiver: Receiver, notifier: &'static RadioNotifier) -> ! {
    info!("radio pump task started");
    let mut sink = DefmtSink;
    loop {
        let now = BootMicros.now_micros();
        if let Some(reception) = receiver.receive(now, &mut sink) {
            info!(
                "fresh packet {=u32:#x} at {=u32} µs",
                reception.bits, reception.micros
            );
            // Drop on a full channel rather than stall the pump; the
            // train tracker already collapsed the repeats that matter.
            if notifier.try_send(reception).is_err() {
                warn!("application lagging, packet dropped");
            }
        } else {
            Timer::after(POLL_INTERVAL).await;
        }
    }
}
