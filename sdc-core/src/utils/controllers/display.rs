//! Status-line output for the Self-Driving Challenge bot.
//!
//! Status text goes to two sinks with identical content: the brick's LCD (via
//! `DISPLAY_CHANNEL`, drained by a `DisplayModule` task) and the debug log.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::utils::hardware::DisplayDriver;

/// Channel used to deliver status lines to the LCD task.
pub static DISPLAY_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    &'static str,
    16,
> = embassy_sync::channel::Channel::new();

/// Font height used for status text on the LCD.
const STATUS_FONT_PX: u8 = 12;

/// Write a status line to the LCD and the debug output.
///
/// Delivery to the LCD is fire-and-forget; if the display task has fallen
/// 16 lines behind, the line is dropped from the LCD but still logged.
pub fn output_text(text: &'static str) {
    tracing::info!("{}", text);
    if DISPLAY_CHANNEL.try_send(text).is_err() {
        tracing::warn!("display queue full, dropping line: {}", text);
    }
}

/// LCD status surface that drains `DISPLAY_CHANNEL` onto a display driver.
pub struct DisplayModule<Driver> {
    driver: Driver,
}

impl<Driver> DisplayModule<Driver>
where
    Driver: DisplayDriver,
{
    /// Create a new `DisplayModule`, clearing the screen and selecting the
    /// status font.
    pub fn new(mut driver: Driver) -> Self {
        driver.clear();
        driver.set_font_height(STATUS_FONT_PX);
        Self { driver }
    }

    /// Print every status line received on `DISPLAY_CHANNEL`.
    pub async fn run(mut self) -> ! {
        loop {
            let line = DISPLAY_CHANNEL.receiver().receive().await;
            self.driver.print_line(line);
        }
    }
}
