use embassy_rp::{
    gpio::{self, Level},
    peripherals::{FLASH, PIN_22},
    Peri,
};

/// The receiver board's pin assignment.
///
/// The 433 MHz receiver's data line stays unclaimed here; [`crate::radio::Radio`]
/// turns it into an input with the pull it needs.
pub struct Hardware {
    pub rf_data: Peri<'static, PIN_22>,
    pub pairing_button: gpio::Input<'static>,
    pub relay: gpio::Output<'static>,
    pub activity_led: gpio::Output<'static>,
    pub flash: Peri<'static, FLASH>,
}

impl Default for Hardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let rf_data = peripherals.PIN_22;
        let pairing_button = gpio::Input::new(peripherals.PIN_13, gpio::Pull::Down);
        let relay = gpio::Output::new(peripherals.PIN_16, Level::Low);
        // On-board LED on the non-wireless boards.
        let activity_led = gpio::Output::new(peripherals.PIN_25, Level::Low);

        Self {
            rf_data,
            pairing_button,
            relay,
            activity_led,
            flash: peripherals.FLASH,
        }
    }
}
