//! A 433 MHz Chacon/DIO remote receiver that drives a relay.
//!
//! Runs on a Raspberry Pi Pico 1 or 2. A short press on the pairing
//! button arms learning mode: the next "on" packet pairs its button, the
//! next "off" packet unpairs it. A long press forgets every transmitter.
#![cfg_attr(not(feature = "host"), no_std)]
#![cfg_attr(not(feature = "host"), no_main)]
#![warn(
    clippy::pedantic,
    clippy::use_self,
    unused_lifetimes,
    unreachable_pub,
    clippy::unwrap_used,
    clippy::panic_in_result_fn
)]
#![allow(clippy::future_not_send)] // Single-threaded application; futures need not be Send.

// `cargo test --features host` builds this binary target too; there is
// nothing to run off-board.
#[cfg(feature = "host")]
fn main() {}

#[cfg(not(feature = "host"))]
mod firmware {
    use defmt::info;
    use defmt_rtt as _;
    use embassy_executor::Spawner;
    use embassy_futures::select::{select3, Either3};
    use embassy_rp::gpio::Pull;
    use embassy_time::{Duration, Instant, Timer};
    use panic_probe as _;

    use dio_rx::button::{Button, PressDuration};
    use dio_rx::button_store::PersistentButtonStore;
    use dio_rx::hardware::Hardware;
    use dio_rx::packet::Packet;
    use dio_rx::radio::{Radio, RadioStatic};
    use dio_rx::{Never, Result};

    /// After a short press, the next packet within this window pairs or
    /// unpairs the button it came from.
    const LEARN_WINDOW: Duration = Duration::from_secs(10);
    const HEARTBEAT_TICK: Duration = Duration::from_millis(500);

    #[embassy_executor::main]
    async fn main(spawner: Spawner) -> ! {
        // If it returns, something went wrong.
        let err = inner_main(spawner).await.unwrap_err();
        panic!("{err}");
    }

    async fn inner_main(spawner: Spawner) -> Result<Never> {
        let hardware = Hardware::default();

        static RADIO_STATIC: RadioStatic = Radio::new_static();
        let radio = Radio::new(hardware.rf_data, Pull::None, &RADIO_STATIC, spawner)?;

        let mut buttons = PersistentButtonStore::new(hardware.flash)?;
        let mut pairing_button = Button::new(hardware.pairing_button);
        let mut relay = hardware.relay;
        let mut activity_led = hardware.activity_led;
        let mut learning_until: Option<Instant> = None;

        info!(
            "receiver ready, {=usize} transmitters learned",
            buttons.store().count()
        );
        loop {
            match select3(
                radio.next_packet(),
                pairing_button.press_duration(),
                Timer::after(HEARTBEAT_TICK),
            )
            .await
            {
                Either3::First(reception) => {
                    let packet = Packet::new(reception.bits);
                    if learning_until.is_some_and(|deadline| Instant::now() < deadline) {
                        learning_until = None;
                        let pair = packet.button_pair();
                        if packet.on_or_off() {
                            if buttons.with(|store| store.remember(pair))? {
                                info!("learned transmitter {=u32:#x}", pair.bits());
                            }
                        } else if buttons.with(|store| store.forget(pair))? {
                            info!("forgot transmitter {=u32:#x}", pair.bits());
                        }
                    }
                    if buttons.store().recognizes(packet) {
                        info!("relay {=bool}", packet.on_or_off());
                        relay.set_level(packet.on_or_off().into());
                    }
                }
                Either3::Second(PressDuration::Short) => {
                    info!("learning armed");
                    learning_until = Some(Instant::now() + LEARN_WINDOW);
                }
                Either3::Second(PressDuration::Long) => {
                    buttons.with(dio_rx::button_store::ButtonStore::forget_all)?;
                    learning_until = None;
                    info!("forgot all transmitters");
                }
                Either3::Third(()) => {
                    if learning_until.is_some_and(|deadline| Instant::now() >= deadline) {
                        learning_until = None;
                        info!("learning window expired");
                    }
                    // Solid while learning, blinking while edges arrive,
                    // dark when the antenna has gone quiet.
                    if learning_until.is_some() {
                        activity_led.set_high();
                    } else if radio.has_been_alive() {
                        activity_led.toggle();
                    } else {
                        activity_led.set_low();
                    }
                }
            }
        }
    }
}
