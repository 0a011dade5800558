//! Reception pipeline and firmware support for Chacon/DIO 433 MHz
//! remote controls on the Raspberry Pi Pico 1 and 2.
//!
//! The decode pipeline — ring, demodulator, train de-duplication — is
//! plain `no_std` Rust with no HAL dependency and is exercised on the
//! host via the `host` feature; the embassy-facing modules wrap it for
//! the real board.
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: exactly one board must be selected (unless testing with the host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

pub mod button_store;
pub mod demodulator;
pub mod gap_ring;
pub mod gap_width;
pub mod micros;
pub mod notice;
pub mod packet;
pub mod packet_buffer;
pub mod packet_train;
pub mod receiver;
pub mod shared_constants;

// These modules require embassy_rp and are excluded when testing on host.
#[cfg(not(feature = "host"))]
pub mod button;
#[cfg(not(feature = "host"))]
mod error;
#[cfg(not(feature = "host"))]
pub mod hardware;
#[cfg(not(feature = "host"))]
pub mod radio;

// Re-export error types and result (used throughout)
#[cfg(not(feature = "host"))]
pub use error::{Error, Result};

#[cfg(feature = "host")]
pub type Error = core::convert::Infallible;
#[cfg(feature = "host")]
pub type Result<T, E = Error> = core::result::Result<T, E>;

pub use demodulator::{decode, Reception};
pub use gap_ring::{EdgeProducer, GapRing, PacketDrain, RanOutOfBuffers};
pub use gap_width::GapWidth;
pub use micros::{duration_from_to, MicrosClock};
pub use notice::{EventSink, NullSink, ProtocolNotice};
pub use packet::{ButtonPair, Packet};
pub use packet_buffer::PacketBuffer;
pub use packet_train::PacketTrain;
pub use receiver::Receiver;

/// Rust's `!` is unstable. This empty enum is a locally-defined
/// equivalent which is stable.
#[derive(Debug)]
pub enum Never {}
