use core::convert::Infallible;

use max78000_regs::gpio::GpioRegisters;
use max78000_regs::tock_registers::interfaces::{Readable, Writeable};
use max78000_regs::{Peripheral, StaticRef};

use crate::gcr::{Gcr, PeripheralClock};
use crate::pinmap::{PinFunction, PinName};
use crate::HalError;

/// Controls voltage source for gpio pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinVoltage {
    /// Regular voltage.
    Vddio,
    /// High voltage.
    Vddioh,
}

/// Controls the pullup and pulldown resistors of gpio pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// No resistors.
    PullNone,
    PullUp,
    PullDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Specifies configuration options for a gpio pin.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureIoOptions {
    pub pin: PinName,
    pub function: PinFunction,
    pub pad: PinMode,
    pub voltage: PinVoltage,
}

/// Used for interacting with gpio pin controllers.
pub struct Gpio {
    ports: [Peripheral<GpioRegisters>; 3],
}

impl Gpio {
    /// Takes the three gpio ports and turns on their clocks.
    pub fn new(
        gpio0: Peripheral<GpioRegisters>,
        gpio1: Peripheral<GpioRegisters>,
        gpio2: Peripheral<GpioRegisters>,
        gcr: &mut Gcr,
    ) -> Self {
        for port in [&gpio0, &gpio1, &gpio2] {
            gcr.enable_clock(PeripheralClock::gpio(port.index()));
        }

        Gpio {
            ports: [gpio0, gpio1, gpio2],
        }
    }

    /// Registers of port `n`.
    pub fn port(&self, n: u8) -> Result<StaticRef<GpioRegisters>, HalError> {
        self.ports
            .get(usize::from(n))
            .map(Peripheral::regs)
            .ok_or(HalError::PinNotMapped)
    }

    fn pin_port(&self, pin: PinName) -> Result<StaticRef<GpioRegisters>, HalError> {
        if !pin.is_connected() {
            return Err(HalError::PinNotConnected);
        }

        self.port(pin.port())
    }

    /// Configure a pin based on the given configuration options.
    pub fn configure_io(&self, options: ConfigureIoOptions) -> Result<(), HalError> {
        let regs = self.pin_port(options.pin)?;
        let mask = options.pin.mask();

        regs.inen.set(regs.inen.get() | mask);

        // function select is spread over three registers, a set en0 bit
        // selects io and otherwise en1 and en2 pick the alternate function
        match options.function {
            PinFunction::Io => {
                regs.en0_set.set(mask);
                regs.en1_clr.set(mask);
                regs.en2_clr.set(mask);
            }
            PinFunction::Alt1 => {
                regs.en2_clr.set(mask);
                regs.en1_clr.set(mask);
                regs.en0_clr.set(mask);
            }
            PinFunction::Alt2 => {
                regs.en2_clr.set(mask);
                regs.en1_set.set(mask);
                regs.en0_clr.set(mask);
            }
            PinFunction::Alt3 => {
                regs.en2_set.set(mask);
                regs.en1_clr.set(mask);
                regs.en0_clr.set(mask);
            }
        }

        set_pad(&regs, mask, options.pad);

        let vssel = regs.vssel.get();
        regs.vssel.set(match options.voltage {
            PinVoltage::Vddio => vssel & !mask,
            PinVoltage::Vddioh => vssel | mask,
        });

        Ok(())
    }
}

fn set_pad(regs: &GpioRegisters, mask: u32, mode: PinMode) {
    let padctrl0 = regs.padctrl0.get();
    let padctrl1 = regs.padctrl1.get();
    let ps = regs.ps.get();

    match mode {
        PinMode::PullNone => {
            regs.padctrl0.set(padctrl0 & !mask);
            regs.padctrl1.set(padctrl1 & !mask);
        }
        PinMode::PullUp => {
            regs.padctrl0.set(padctrl0 | mask);
            regs.padctrl1.set(padctrl1 & !mask);
            regs.ps.set(ps | mask);
        }
        PinMode::PullDown => {
            regs.padctrl0.set(padctrl0 | mask);
            regs.padctrl1.set(padctrl1 & !mask);
            regs.ps.set(ps & !mask);
        }
    }
}

/// A single pin driven by the gpio controller.
pub struct GpioPin {
    regs: StaticRef<GpioRegisters>,
    pin: PinName,
}

impl GpioPin {
    /// Switches the pin to io mode as an input without pulls.
    pub fn init(pin: PinName, gpio: &Gpio) -> Result<Self, HalError> {
        let regs = gpio.pin_port(pin)?;

        gpio.configure_io(ConfigureIoOptions {
            pin,
            function: PinFunction::Io,
            pad: PinMode::PullNone,
            voltage: PinVoltage::Vddio,
        })?;

        Ok(GpioPin { regs, pin })
    }

    pub fn mode(&mut self, mode: PinMode) {
        set_pad(&self.regs, self.pin.mask(), mode);
    }

    pub fn dir(&mut self, direction: PinDirection) {
        match direction {
            PinDirection::Input => self.regs.outen_clr.set(self.pin.mask()),
            PinDirection::Output => self.regs.outen_set.set(self.pin.mask()),
        }
    }

    pub fn write(&mut self, high: bool) {
        if high {
            self.regs.out_set.set(self.pin.mask());
        } else {
            self.regs.out_clr.set(self.pin.mask());
        }
    }

    /// Level seen on the pin.
    pub fn read(&self) -> bool {
        self.regs.in_.get() & self.pin.mask() != 0
    }

    /// Level the pin is driven to.
    pub fn output_level(&self) -> bool {
        self.regs.out.get() & self.pin.mask() != 0
    }

    pub fn toggle(&mut self) {
        self.regs.out.set(self.regs.out.get() ^ self.pin.mask());
    }

    pub fn is_connected(&self) -> bool {
        self.pin.is_connected()
    }

    pub fn pin(&self) -> PinName {
        self.pin
    }
}

impl embedded_hal::digital::ErrorType for GpioPin {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.read())
    }
}

impl embedded_hal::digital::OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for GpioPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.output_level())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.output_level())
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        GpioPin::toggle(self);
        Ok(())
    }
}
