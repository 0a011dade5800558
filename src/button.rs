use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

const DEBOUNCE_DELAY: Duration = Duration::from_millis(10);
const LONG_PRESS_DURATION: Duration = Duration::from_millis(2000);

/// The pairing button, backed by an Embassy input pin.
///
/// A short press arms learning mode; a long press wipes every learned
/// transmitter, so the threshold is deliberately generous.
pub struct Button<'a>(Input<'a>);

impl<'a> Button<'a> {
    #[must_use]
    pub const fn new(button: Input<'a>) -> Self {
        Self(button)
    }

    #[inline]
    async fn wait_for_button_up(&mut self) -> &mut Self {
        self.0.wait_for_low().await;
        self
    }

    #[inline]
    async fn wait_for_button_down(&mut self) -> &mut Self {
        self.0.wait_for_high().await;
        self
    }

    /// Measures the duration of a button press.
    ///
    /// This method does not wait for the button to be released. It only
    /// waits as long as necessary to tell a "short" press from a "long"
    /// one.
    pub async fn press_duration(&mut self) -> PressDuration {
        self.wait_for_button_up().await;
        Timer::after(DEBOUNCE_DELAY).await;
        self.wait_for_button_down().await;
        Timer::after(DEBOUNCE_DELAY).await;
        let press_duration =
            match select(self.wait_for_button_up(), Timer::after(LONG_PRESS_DURATION)).await {
                Either::First(_) => PressDuration::Short,
                Either::Second(()) => PressDuration::Long,
            };
        info!("Press duration: {:?}", press_duration);
        press_duration
    }
}

// A `bool` would do, but naming the two press kinds keeps the pairing
// logic in the main loop readable; the compiler produces the same code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum PressDuration {
    Short,
    Long,
}
