//! Peripheral drivers for the MAX78000.
//!
//! Every driver owns its register block for the span between `init` and
//! `free`, waits on hardware with a bounded number of polls, and reports
//! failures through [`HalError`].
#![cfg_attr(not(test), no_std)]

pub mod analogin;
pub mod flash;
pub mod gcr;
pub mod gpio;
pub mod i2c;
pub mod pinmap;
pub mod pwmout;
pub mod serial;
pub mod spi;
pub mod trng;
pub mod us_ticker;

mod timer;

#[cfg(test)]
mod test_support;

use embedded_hal::i2c::NoAcknowledgeSource;
use thiserror_no_std::Error;

pub use analogin::{Adc, AnalogIn};
pub use flash::Flash;
pub use gcr::Gcr;
pub use gpio::{Gpio, GpioPin};
pub use i2c::I2c;
pub use pinmap::PinName;
pub use pwmout::PwmOut;
pub use serial::Serial;
pub use spi::Spi;
pub use trng::Trng;
pub use us_ticker::{Delay, UsTicker};

// frequency of various clocks on the board
const ISO_FREQUENCY: u32 = 60000000;
const INRO_FREQUENCY: u32 = 30000;
const IPO_FREQUENCY: u32 = 100000000;
const IBRO_FREQUENCY: u32 = 7372800;
const ERTCO_FREQUENCY: u32 = 32768;

// NOTE: not correct, this varies, this is just default value msdk uses
const EXTCLK_FREQUENCY: u32 = 75000000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HalError {
    #[error("Error: timeout occured")]
    Timeout,
    #[error("Error: bus is busy")]
    BusBusy,
    #[error("Error: no acknowledge ({0})")]
    NoAcknowledge(NoAcknowledgeSource),
    #[error("Error: arbitration lost")]
    ArbitrationLost,
    #[error("Error: bus error")]
    Bus,
    #[error("Error: fifo overrun")]
    Overrun,
    #[error("Error: pin is not connected")]
    PinNotConnected,
    #[error("Error: pin has no mapping for this function")]
    PinNotMapped,
    #[error("Error: pins belong to different peripherals")]
    PinmapMismatch,
    #[error("Error: frequency out of range")]
    InvalidFrequency,
    #[error("Error: unsupported format")]
    InvalidFormat,
    #[error("Error: invalid system clock selected")]
    InvalidClock,
    #[error("Error: address out of range or misaligned")]
    InvalidAddress,
    #[error("Error: transfer length out of range")]
    InvalidLength,
    #[error("Error writing to flash")]
    Flash,
}

impl embedded_hal::i2c::Error for HalError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::ErrorKind;

        match *self {
            HalError::NoAcknowledge(source) => ErrorKind::NoAcknowledge(source),
            HalError::ArbitrationLost => ErrorKind::ArbitrationLoss,
            HalError::Bus => ErrorKind::Bus,
            HalError::Overrun => ErrorKind::Overrun,
            _ => ErrorKind::Other,
        }
    }
}

impl embedded_hal::spi::Error for HalError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        use embedded_hal::spi::ErrorKind;

        match *self {
            HalError::Overrun => ErrorKind::Overrun,
            HalError::InvalidFormat => ErrorKind::FrameFormat,
            _ => ErrorKind::Other,
        }
    }
}

/// Polls `done` up to `budget` times.
///
/// Returns `Err(HalError::Timeout)` if it never reported completion.
pub(crate) fn spin_wait(budget: u32, mut done: impl FnMut() -> bool) -> Result<(), HalError> {
    for _ in 0..budget {
        #[cfg(test)]
        test_support::step_hardware();

        if done() {
            return Ok(());
        }

        core::hint::spin_loop();
    }

    #[cfg(test)]
    test_support::step_hardware();

    // hardware may have finished on the last spin
    if done() {
        Ok(())
    } else {
        Err(HalError::Timeout)
    }
}

/// Aligns `addr` down to the power 2 alignment `align`
/// `align` must be a power of 2
pub const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::Error as _;

    use super::*;

    #[test]
    fn spin_wait_times_out() {
        let mut polls = 0;
        let result = spin_wait(10, || {
            polls += 1;
            false
        });

        assert_eq!(result, Err(HalError::Timeout));
        assert_eq!(polls, 11);
    }

    #[test]
    fn spin_wait_stops_when_done() {
        let mut polls = 0;
        let result = spin_wait(10, || {
            polls += 1;
            polls == 3
        });

        assert_eq!(result, Ok(()));
        assert_eq!(polls, 3);
    }

    #[test]
    fn i2c_error_kinds() {
        use embedded_hal::i2c::ErrorKind;

        assert_eq!(
            HalError::NoAcknowledge(NoAcknowledgeSource::Address).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(HalError::ArbitrationLost.kind(), ErrorKind::ArbitrationLoss);
        assert_eq!(HalError::Timeout.kind(), ErrorKind::Other);
    }

    #[test]
    fn align() {
        assert_eq!(align_down(0x1000_0013, 16), 0x1000_0010);
        assert_eq!(align_down(0x1000_2000, 0x2000), 0x1000_2000);
    }
}
