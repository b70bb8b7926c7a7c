use max78000_regs::gcr::{GcrRegisters, CLKCTRL, PCLKDIS0, PCLKDIS1, RST0, RST1};
use max78000_regs::lpgcr::{LpgcrRegisters, LP_PERIPH};
use max78000_regs::tock_registers::fields::Field;
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::Peripheral;

use crate::{
    spin_wait, HalError, ERTCO_FREQUENCY, EXTCLK_FREQUENCY, IBRO_FREQUENCY, INRO_FREQUENCY,
    IPO_FREQUENCY, ISO_FREQUENCY,
};

/// Polls to wait for a reset or an oscillator before giving up.
const GCR_TIMEOUT: u32 = 100_000;

/// A peripheral with its own clock gate and reset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralClock {
    Gpio0,
    Gpio1,
    Gpio2,
    I2c0,
    I2c1,
    I2c2,
    Spi0,
    Spi1,
    Uart0,
    Uart1,
    Uart2,
    Tmr0,
    Tmr1,
    Tmr2,
    Tmr3,
    Tmr4,
    Tmr5,
    Adc,
    Trng,
}

enum ClockGate {
    Gcr0(Field<u32, PCLKDIS0::Register>),
    Gcr1(Field<u32, PCLKDIS1::Register>),
    LowPower(Field<u32, LP_PERIPH::Register>),
}

enum ResetLine {
    Gcr0(Field<u32, RST0::Register>),
    Gcr1(Field<u32, RST1::Register>),
    LowPower(Field<u32, LP_PERIPH::Register>),
}

impl PeripheralClock {
    // instance numbers come from the register crate's handles, which stop at
    // the last instance, so the final arm is that last instance
    pub(crate) fn gpio(index: u8) -> Self {
        match index {
            0 => Self::Gpio0,
            1 => Self::Gpio1,
            _ => Self::Gpio2,
        }
    }

    pub(crate) fn i2c(index: u8) -> Self {
        match index {
            0 => Self::I2c0,
            1 => Self::I2c1,
            _ => Self::I2c2,
        }
    }

    pub(crate) fn spi(index: u8) -> Self {
        match index {
            0 => Self::Spi0,
            _ => Self::Spi1,
        }
    }

    pub(crate) fn uart(index: u8) -> Self {
        match index {
            0 => Self::Uart0,
            1 => Self::Uart1,
            _ => Self::Uart2,
        }
    }

    pub(crate) fn tmr(index: u8) -> Self {
        match index {
            0 => Self::Tmr0,
            1 => Self::Tmr1,
            2 => Self::Tmr2,
            3 => Self::Tmr3,
            4 => Self::Tmr4,
            _ => Self::Tmr5,
        }
    }

    fn gate(self) -> ClockGate {
        match self {
            Self::Gpio0 => ClockGate::Gcr0(PCLKDIS0::GPIO0),
            Self::Gpio1 => ClockGate::Gcr0(PCLKDIS0::GPIO1),
            Self::Gpio2 => ClockGate::LowPower(LP_PERIPH::GPIO2),
            Self::I2c0 => ClockGate::Gcr0(PCLKDIS0::I2C0),
            Self::I2c1 => ClockGate::Gcr0(PCLKDIS0::I2C1),
            Self::I2c2 => ClockGate::Gcr1(PCLKDIS1::I2C2),
            Self::Spi0 => ClockGate::Gcr1(PCLKDIS1::SPI0),
            Self::Spi1 => ClockGate::Gcr0(PCLKDIS0::SPI1),
            Self::Uart0 => ClockGate::Gcr0(PCLKDIS0::UART0),
            Self::Uart1 => ClockGate::Gcr0(PCLKDIS0::UART1),
            Self::Uart2 => ClockGate::Gcr1(PCLKDIS1::UART2),
            Self::Tmr0 => ClockGate::Gcr0(PCLKDIS0::TMR0),
            Self::Tmr1 => ClockGate::Gcr0(PCLKDIS0::TMR1),
            Self::Tmr2 => ClockGate::Gcr0(PCLKDIS0::TMR2),
            Self::Tmr3 => ClockGate::Gcr0(PCLKDIS0::TMR3),
            Self::Tmr4 => ClockGate::LowPower(LP_PERIPH::TMR4),
            Self::Tmr5 => ClockGate::LowPower(LP_PERIPH::TMR5),
            Self::Adc => ClockGate::Gcr0(PCLKDIS0::ADC),
            Self::Trng => ClockGate::Gcr1(PCLKDIS1::TRNG),
        }
    }

    fn reset_line(self) -> ResetLine {
        match self {
            Self::Gpio0 => ResetLine::Gcr0(RST0::GPIO0),
            Self::Gpio1 => ResetLine::Gcr0(RST0::GPIO1),
            Self::Gpio2 => ResetLine::LowPower(LP_PERIPH::GPIO2),
            Self::I2c0 => ResetLine::Gcr0(RST0::I2C0),
            Self::I2c1 => ResetLine::Gcr1(RST1::I2C1),
            Self::I2c2 => ResetLine::Gcr1(RST1::I2C2),
            Self::Spi0 => ResetLine::Gcr1(RST1::SPI0),
            Self::Spi1 => ResetLine::Gcr0(RST0::SPI1),
            Self::Uart0 => ResetLine::Gcr0(RST0::UART0),
            Self::Uart1 => ResetLine::Gcr0(RST0::UART1),
            Self::Uart2 => ResetLine::Gcr0(RST0::UART2),
            Self::Tmr0 => ResetLine::Gcr0(RST0::TMR0),
            Self::Tmr1 => ResetLine::Gcr0(RST0::TMR1),
            Self::Tmr2 => ResetLine::Gcr0(RST0::TMR2),
            Self::Tmr3 => ResetLine::Gcr0(RST0::TMR3),
            Self::Tmr4 => ResetLine::LowPower(LP_PERIPH::TMR4),
            Self::Tmr5 => ResetLine::LowPower(LP_PERIPH::TMR5),
            Self::Adc => ResetLine::Gcr0(RST0::ADC),
            Self::Trng => ResetLine::Gcr0(RST0::TRNG),
        }
    }
}

/// Global configuration registers.
///
/// Used for controlling certain global features of the device, and for
/// clocking and resetting the other peripherals.
pub struct Gcr {
    regs: Peripheral<GcrRegisters>,
    low_power_regs: Peripheral<LpgcrRegisters>,
}

impl Gcr {
    pub fn new(regs: Peripheral<GcrRegisters>, low_power_regs: Peripheral<LpgcrRegisters>) -> Self {
        Gcr {
            regs,
            low_power_regs,
        }
    }

    /// Gets the frequency of system clock in ticks per second.
    pub fn sysclock_frequency(&self) -> Result<u32, HalError> {
        use CLKCTRL::SYSCLK_SEL::Value;

        let frequency = match self.regs.clkctrl.read_as_enum(CLKCTRL::SYSCLK_SEL) {
            Some(Value::Iso) => ISO_FREQUENCY,
            Some(Value::Inro) => INRO_FREQUENCY,
            Some(Value::Ipo) => IPO_FREQUENCY,
            Some(Value::Ibro) => IBRO_FREQUENCY,
            Some(Value::Ertco) => ERTCO_FREQUENCY,
            Some(Value::Extclk) => EXTCLK_FREQUENCY,
            None => return Err(HalError::InvalidClock),
        };

        let clock_divide = self.regs.clkctrl.read(CLKCTRL::SYSCLK_DIV);

        Ok(frequency >> clock_divide)
    }

    /// Gets the frequency of the clock used for many peripherals in ticks per second.
    pub fn peripheral_clock_frequency(&self) -> Result<u32, HalError> {
        Ok(self.sysclock_frequency()? / 2)
    }

    pub fn enable_clock(&mut self, peripheral: PeripheralClock) {
        self.set_clock_gate(peripheral, false);
    }

    pub fn disable_clock(&mut self, peripheral: PeripheralClock) {
        self.set_clock_gate(peripheral, true);
    }

    pub fn is_clock_enabled(&self, peripheral: PeripheralClock) -> bool {
        match peripheral.gate() {
            ClockGate::Gcr0(field) => !self.regs.pclkdis0.is_set(field),
            ClockGate::Gcr1(field) => !self.regs.pclkdis1.is_set(field),
            ClockGate::LowPower(field) => !self.low_power_regs.pclkdis.is_set(field),
        }
    }

    // a set bit in the pclkdis registers gates the clock off
    fn set_clock_gate(&mut self, peripheral: PeripheralClock, disabled: bool) {
        let bit = u32::from(disabled);

        match peripheral.gate() {
            ClockGate::Gcr0(field) => self.regs.pclkdis0.modify(field.val(bit)),
            ClockGate::Gcr1(field) => self.regs.pclkdis1.modify(field.val(bit)),
            ClockGate::LowPower(field) => self.low_power_regs.pclkdis.modify(field.val(bit)),
        }
    }

    /// Resets the peripheral and waits for hardware to finish the reset.
    pub fn reset(&mut self, peripheral: PeripheralClock) -> Result<(), HalError> {
        let result = match peripheral.reset_line() {
            ResetLine::Gcr0(field) => {
                self.regs.rst0.write(field.val(1));
                spin_wait(GCR_TIMEOUT, || !self.regs.rst0.is_set(field))
            }
            ResetLine::Gcr1(field) => {
                self.regs.rst1.write(field.val(1));
                spin_wait(GCR_TIMEOUT, || !self.regs.rst1.is_set(field))
            }
            ResetLine::LowPower(field) => {
                self.low_power_regs.rst.write(field.val(1));
                spin_wait(GCR_TIMEOUT, || !self.low_power_regs.rst.is_set(field))
            }
        };

        if result.is_err() {
            crate::uprintln_debug!("reset of {:?} did not complete", peripheral);
        }

        result
    }

    /// Enables the IBRO (Internal Baud Rate Oscillator) clock.
    ///
    /// This clock is used by the uart for timing purposes.
    pub fn enable_ibro(&mut self) -> Result<(), HalError> {
        // manual says it is always enabled, msdk enables it anyway
        self.regs.clkctrl.modify(CLKCTRL::IBRO_EN::SET);

        spin_wait(GCR_TIMEOUT, || self.regs.clkctrl.is_set(CLKCTRL::IBRO_RDY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gcr, peek, poke};

    #[test]
    fn sysclock_follows_source_and_divider() {
        let gcr = gcr();

        // selector 0 is the iso
        assert_eq!(gcr.sysclock_frequency(), Ok(60_000_000));

        gcr.regs
            .clkctrl
            .write(CLKCTRL::SYSCLK_SEL::Ipo + CLKCTRL::SYSCLK_DIV.val(1));
        assert_eq!(gcr.sysclock_frequency(), Ok(50_000_000));
        assert_eq!(gcr.peripheral_clock_frequency(), Ok(25_000_000));

        gcr.regs.clkctrl.write(CLKCTRL::SYSCLK_SEL::Ibro);
        assert_eq!(gcr.sysclock_frequency(), Ok(7_372_800));
    }

    #[test]
    fn unknown_clock_source() {
        let gcr = gcr();
        gcr.regs.clkctrl.write(CLKCTRL::SYSCLK_SEL.val(1));

        assert_eq!(gcr.sysclock_frequency(), Err(HalError::InvalidClock));
        assert_eq!(gcr.peripheral_clock_frequency(), Err(HalError::InvalidClock));
    }

    #[test]
    fn clock_gates() {
        let mut gcr = gcr();
        poke(&gcr.regs.pclkdis0, 0xffff_ffff);
        poke(&gcr.regs.pclkdis1, 0xffff_ffff);
        poke(&gcr.low_power_regs.pclkdis, 0xffff_ffff);

        gcr.enable_clock(PeripheralClock::I2c1);
        assert_eq!(peek(&gcr.regs.pclkdis0), !(1 << 28));
        assert!(gcr.is_clock_enabled(PeripheralClock::I2c1));
        assert!(!gcr.is_clock_enabled(PeripheralClock::I2c0));

        gcr.enable_clock(PeripheralClock::Spi0);
        assert_eq!(peek(&gcr.regs.pclkdis1), !(1 << 16));

        gcr.enable_clock(PeripheralClock::Tmr5);
        assert_eq!(peek(&gcr.low_power_regs.pclkdis), !(1 << 3));

        gcr.disable_clock(PeripheralClock::I2c1);
        assert_eq!(peek(&gcr.regs.pclkdis0), 0xffff_ffff);
    }

    #[test]
    fn reset_waits_for_hardware() {
        let mut gcr = gcr();

        // nothing clears the bit in ram
        assert_eq!(gcr.reset(PeripheralClock::Uart2), Err(HalError::Timeout));
        assert_eq!(peek(&gcr.regs.rst0), 1 << 28);

        assert_eq!(gcr.reset(PeripheralClock::Gpio2), Err(HalError::Timeout));
        assert_eq!(peek(&gcr.low_power_regs.rst), 1);
    }

    #[test]
    fn ibro_ready() {
        let mut gcr = gcr();
        assert_eq!(gcr.enable_ibro(), Err(HalError::Timeout));

        gcr.regs.clkctrl.modify(CLKCTRL::IBRO_RDY::SET);
        assert_eq!(gcr.enable_ibro(), Ok(()));
        assert!(gcr.regs.clkctrl.is_set(CLKCTRL::IBRO_EN));
    }

    #[test]
    fn instance_lookup() {
        assert_eq!(PeripheralClock::i2c(2), PeripheralClock::I2c2);
        assert_eq!(PeripheralClock::tmr(4), PeripheralClock::Tmr4);
        assert_eq!(PeripheralClock::spi(0), PeripheralClock::Spi0);
    }
}
