//! Pin names and the tables routing pins to peripheral functions.

use crate::gpio::{ConfigureIoOptions, Gpio, PinMode, PinVoltage};
use crate::HalError;

/// A pin, named by port and pin number within the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinName {
    port: u8,
    pin: u8,
}

impl PinName {
    pub const fn new(port: u8, pin: u8) -> Self {
        PinName { port, pin }
    }

    pub const fn port(self) -> u8 {
        self.port
    }

    pub const fn pin(self) -> u8 {
        self.pin
    }

    /// Bit of this pin in its port's registers.
    pub const fn mask(self) -> u32 {
        1 << self.pin
    }

    pub fn is_connected(self) -> bool {
        self != NC
    }
}

/// Placeholder for a signal that is not wired to any pin.
pub const NC: PinName = PinName::new(0xff, 0xff);

macro_rules! pins {
    ($($name:ident = ($port:literal, $pin:literal),)*) => {
        $(pub const $name: PinName = PinName::new($port, $pin);)*
    };
}

pins! {
    P0_0 = (0, 0), P0_1 = (0, 1), P0_2 = (0, 2), P0_3 = (0, 3),
    P0_4 = (0, 4), P0_5 = (0, 5), P0_6 = (0, 6), P0_7 = (0, 7),
    P0_8 = (0, 8), P0_9 = (0, 9), P0_10 = (0, 10), P0_11 = (0, 11),
    P0_12 = (0, 12), P0_13 = (0, 13), P0_14 = (0, 14), P0_15 = (0, 15),
    P0_16 = (0, 16), P0_17 = (0, 17), P0_18 = (0, 18), P0_19 = (0, 19),
    P0_20 = (0, 20), P0_21 = (0, 21), P0_22 = (0, 22), P0_23 = (0, 23),
    P0_24 = (0, 24), P0_25 = (0, 25), P0_26 = (0, 26), P0_27 = (0, 27),
    P0_28 = (0, 28), P0_29 = (0, 29), P0_30 = (0, 30), P0_31 = (0, 31),
    P1_0 = (1, 0), P1_1 = (1, 1), P1_2 = (1, 2), P1_3 = (1, 3),
    P1_4 = (1, 4), P1_5 = (1, 5), P1_6 = (1, 6), P1_7 = (1, 7),
    P1_8 = (1, 8), P1_9 = (1, 9),
    P2_0 = (2, 0), P2_1 = (2, 1), P2_2 = (2, 2), P2_3 = (2, 3),
    P2_4 = (2, 4), P2_5 = (2, 5), P2_6 = (2, 6), P2_7 = (2, 7),
}

/// Specifies function of the gpio pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFunction {
    /// Pin is driven by the gpio controller.
    Io,
    /// Pin is used by the first alternate function.
    Alt1,
    Alt2,
    Alt3,
}

/// A peripheral instance a pin can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralName {
    I2c(u8),
    Spi(u8),
    Uart(u8),
    /// Timer output, used for pwm.
    Tmr(u8),
    /// Adc input channel.
    Ain(u8),
}

/// One pin to peripheral route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub pin: PinName,
    pub peripheral: PeripheralName,
    pub function: PinFunction,
}

const fn route(pin: PinName, peripheral: PeripheralName, function: PinFunction) -> PinMap {
    PinMap {
        pin,
        peripheral,
        function,
    }
}

use PeripheralName::{Ain, I2c, Spi, Tmr, Uart};
use PinFunction::{Alt1, Alt2};

pub static PINMAP_I2C_SDA: [PinMap; 3] = [
    route(P0_11, I2c(0), Alt1),
    route(P0_17, I2c(1), Alt1),
    route(P0_31, I2c(2), Alt1),
];

pub static PINMAP_I2C_SCL: [PinMap; 3] = [
    route(P0_10, I2c(0), Alt1),
    route(P0_16, I2c(1), Alt1),
    route(P0_30, I2c(2), Alt1),
];

pub static PINMAP_SPI_MOSI: [PinMap; 2] = [route(P0_5, Spi(0), Alt1), route(P0_21, Spi(1), Alt1)];

pub static PINMAP_SPI_MISO: [PinMap; 2] = [route(P0_6, Spi(0), Alt1), route(P0_22, Spi(1), Alt1)];

pub static PINMAP_SPI_SCLK: [PinMap; 2] = [route(P0_7, Spi(0), Alt1), route(P0_23, Spi(1), Alt1)];

pub static PINMAP_SPI_SSEL: [PinMap; 2] = [route(P0_4, Spi(0), Alt1), route(P0_20, Spi(1), Alt1)];

pub static PINMAP_UART_TX: [PinMap; 3] = [
    route(P0_1, Uart(0), Alt1),
    route(P0_13, Uart(1), Alt1),
    route(P1_1, Uart(2), Alt1),
];

pub static PINMAP_UART_RX: [PinMap; 3] = [
    route(P0_0, Uart(0), Alt1),
    route(P0_12, Uart(1), Alt1),
    route(P1_0, Uart(2), Alt1),
];

pub static PINMAP_PWM: [PinMap; 4] = [
    route(P0_2, Tmr(0), Alt2),
    route(P0_14, Tmr(1), Alt2),
    route(P0_26, Tmr(2), Alt2),
    route(P1_6, Tmr(3), Alt2),
];

pub static PINMAP_ADC: [PinMap; 8] = [
    route(P2_0, Ain(0), Alt1),
    route(P2_1, Ain(1), Alt1),
    route(P2_2, Ain(2), Alt1),
    route(P2_3, Ain(3), Alt1),
    route(P2_4, Ain(4), Alt1),
    route(P2_5, Ain(5), Alt1),
    route(P2_6, Ain(6), Alt1),
    route(P2_7, Ain(7), Alt1),
];

pub fn pinmap_find(pin: PinName, map: &[PinMap]) -> Option<&PinMap> {
    map.iter().find(|entry| entry.pin == pin)
}

/// Peripheral the pin routes to in `map`.
pub fn pinmap_peripheral(pin: PinName, map: &[PinMap]) -> Result<PeripheralName, HalError> {
    if !pin.is_connected() {
        return Err(HalError::PinNotConnected);
    }

    pinmap_find(pin, map)
        .map(|entry| entry.peripheral)
        .ok_or(HalError::PinNotMapped)
}

pub fn pinmap_function(pin: PinName, map: &[PinMap]) -> Result<PinFunction, HalError> {
    if !pin.is_connected() {
        return Err(HalError::PinNotConnected);
    }

    pinmap_find(pin, map)
        .map(|entry| entry.function)
        .ok_or(HalError::PinNotMapped)
}

/// Combines the peripherals found for two signals of one bus.
///
/// An absent side takes the other's value. Two different peripherals are an error.
pub fn pinmap_merge(
    a: Option<PeripheralName>,
    b: Option<PeripheralName>,
) -> Result<Option<PeripheralName>, HalError> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => Err(HalError::PinmapMismatch),
        (Some(a), _) => Ok(Some(a)),
        (None, b) => Ok(b),
    }
}

/// Peripheral of an optional signal, `NC` gives `None`.
pub(crate) fn pinmap_optional(
    pin: PinName,
    map: &[PinMap],
) -> Result<Option<PeripheralName>, HalError> {
    if pin.is_connected() {
        pinmap_peripheral(pin, map).map(Some)
    } else {
        Ok(None)
    }
}

/// Routes the pin to the function `map` lists for it.
pub fn pinmap_pinout(pin: PinName, map: &[PinMap], gpio: &Gpio) -> Result<(), HalError> {
    let function = pinmap_function(pin, map)?;

    gpio.configure_io(ConfigureIoOptions {
        pin,
        function,
        pad: PinMode::PullNone,
        voltage: PinVoltage::Vddio,
    })
}

/// Same as [`pinmap_pinout`], but `NC` is skipped.
pub(crate) fn pinmap_pinout_optional(
    pin: PinName,
    map: &[PinMap],
    gpio: &Gpio,
) -> Result<(), HalError> {
    if pin.is_connected() {
        pinmap_pinout(pin, map, gpio)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_and_peripheral() {
        assert_eq!(pinmap_peripheral(P0_17, &PINMAP_I2C_SDA), Ok(I2c(1)));
        assert_eq!(pinmap_peripheral(P0_2, &PINMAP_PWM), Ok(Tmr(0)));
        assert_eq!(pinmap_function(P0_2, &PINMAP_PWM), Ok(Alt2));
        assert_eq!(pinmap_peripheral(P2_5, &PINMAP_ADC), Ok(Ain(5)));
        assert!(pinmap_find(P0_3, &PINMAP_I2C_SDA).is_none());
    }

    #[test]
    fn unconnected_and_unmapped() {
        assert_eq!(pinmap_peripheral(NC, &PINMAP_I2C_SDA), Err(HalError::PinNotConnected));
        assert_eq!(pinmap_peripheral(P0_16, &PINMAP_I2C_SDA), Err(HalError::PinNotMapped));
        assert_eq!(pinmap_function(NC, &PINMAP_SPI_MOSI), Err(HalError::PinNotConnected));
        assert_eq!(pinmap_optional(NC, &PINMAP_SPI_MISO), Ok(None));
    }

    #[test]
    fn merge() {
        assert_eq!(pinmap_merge(Some(Spi(1)), Some(Spi(1))), Ok(Some(Spi(1))));
        assert_eq!(pinmap_merge(None, Some(Spi(0))), Ok(Some(Spi(0))));
        assert_eq!(pinmap_merge(Some(Spi(0)), None), Ok(Some(Spi(0))));
        assert_eq!(pinmap_merge(None, None), Ok(None));
        assert_eq!(pinmap_merge(Some(Spi(0)), Some(Spi(1))), Err(HalError::PinmapMismatch));
    }

    #[test]
    fn pin_names() {
        assert_eq!(P1_6.port(), 1);
        assert_eq!(P1_6.pin(), 6);
        assert_eq!(P0_31.mask(), 1 << 31);
        assert!(!NC.is_connected());
        assert!(P2_7.is_connected());
    }

    #[test]
    fn bus_signals_share_a_peripheral() {
        for (sda, scl) in PINMAP_I2C_SDA.iter().zip(PINMAP_I2C_SCL.iter()) {
            assert_eq!(sda.peripheral, scl.peripheral);
        }

        for ((mosi, miso), (sclk, ssel)) in PINMAP_SPI_MOSI
            .iter()
            .zip(PINMAP_SPI_MISO.iter())
            .zip(PINMAP_SPI_SCLK.iter().zip(PINMAP_SPI_SSEL.iter()))
        {
            assert_eq!(mosi.peripheral, miso.peripheral);
            assert_eq!(sclk.peripheral, ssel.peripheral);
            assert_eq!(mosi.peripheral, sclk.peripheral);
        }
    }
}
