//! 10 bit successive approximation adc.
//!
//! One [`Adc`] owns the converter; any number of [`AnalogIn`] channels borrow
//! it and convert one at a time.

use max78000_regs::adc::{AdcRegisters, CTRL, INTR, STATUS};
use max78000_regs::tock_registers::fields::FieldValue;
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::Peripheral;

use crate::gcr::{Gcr, PeripheralClock};
use crate::gpio::Gpio;
use crate::pinmap::{pinmap_peripheral, pinmap_pinout, PeripheralName, PinName, PINMAP_ADC};
use crate::{spin_wait, HalError};

const ADC_TIMEOUT: u32 = 100_000;

const RESOLUTION_MASK: u16 = 0x3ff;

// interrupt enables sit in the low half of INTR, the flags above them
const INTR_ENABLE_MASK: u32 = 0x3f;

pub struct Adc {
    regs: Peripheral<AdcRegisters>,
}

impl Adc {
    pub fn init(adc: Peripheral<AdcRegisters>, gcr: &mut Gcr) -> Result<Self, HalError> {
        gcr.reset(PeripheralClock::Adc)?;
        gcr.enable_clock(PeripheralClock::Adc);

        let adc = Adc { regs: adc };
        adc.power_up()?;

        Ok(adc)
    }

    /// Powers the converter, then the reference buffer.
    fn power_up(&self) -> Result<(), HalError> {
        self.regs.ctrl.modify(CTRL::CLK_EN::SET);

        self.clear_flag(INTR::PWR_RDY_IF::SET);
        self.regs.ctrl.modify(CTRL::PWR::SET);
        spin_wait(ADC_TIMEOUT, || self.regs.intr.is_set(INTR::PWR_RDY_IF))?;
        self.clear_flag(INTR::PWR_RDY_IF::SET);

        self.regs.ctrl.modify(CTRL::REFBUF_PWR::SET);
        spin_wait(ADC_TIMEOUT, || self.regs.intr.is_set(INTR::REF_READY_IF))?;
        self.clear_flag(INTR::REF_READY_IF::SET);

        Ok(())
    }

    /// Clears one write one to clear flag. The enables are written back as
    /// they are and every other flag as 0, so nothing else pending is lost.
    fn clear_flag(&self, flag: FieldValue<u32, INTR::Register>) {
        let enables = self.regs.intr.get() & INTR_ENABLE_MASK;
        self.regs.intr.set(enables | flag.value);
    }

    fn convert(&self, channel: u8) -> Result<u16, HalError> {
        self.regs.ctrl.modify(CTRL::CH_SEL.val(u32::from(channel)));

        self.clear_flag(INTR::DONE_IF::SET);
        self.regs.ctrl.modify(CTRL::START::SET);
        spin_wait(ADC_TIMEOUT, || self.regs.intr.is_set(INTR::DONE_IF))?;

        if self.regs.status.is_set(STATUS::OVERFLOW) {
            crate::uprintln_debug!("adc overflow on channel {}", channel);
            return Err(HalError::Overrun);
        }

        Ok(self.regs.data.get() as u16 & RESOLUTION_MASK)
    }

    /// Powers the converter down and hands back its registers.
    pub fn free(self, gcr: &mut Gcr) -> Peripheral<AdcRegisters> {
        self.regs.ctrl.write(CTRL::PWR::CLEAR + CTRL::REFBUF_PWR::CLEAR + CTRL::CLK_EN::CLEAR);
        gcr.disable_clock(PeripheralClock::Adc);
        self.regs
    }
}

/// Analog input on one pin.
pub struct AnalogIn<'a> {
    adc: &'a Adc,
    channel: u8,
}

impl<'a> AnalogIn<'a> {
    pub fn init(adc: &'a Adc, pin: PinName, gpio: &Gpio) -> Result<Self, HalError> {
        let PeripheralName::Ain(channel) = pinmap_peripheral(pin, &PINMAP_ADC)? else {
            return Err(HalError::PinmapMismatch);
        };

        pinmap_pinout(pin, &PINMAP_ADC, gpio)?;

        Ok(AnalogIn { adc, channel })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The 10 bit sample.
    pub fn read_raw(&self) -> Result<u16, HalError> {
        self.adc.convert(self.channel)
    }

    /// The sample stretched over the full u16 range.
    pub fn read_u16(&self) -> Result<u16, HalError> {
        self.read_raw().map(expand)
    }

    /// The sample as a fraction of the reference, `0.0..=1.0`.
    pub fn read(&self) -> Result<f32, HalError> {
        self.read_raw().map(|raw| f32::from(raw) / f32::from(RESOLUTION_MASK))
    }
}

// top bits repeated in the bottom, so 0 and full scale map to 0 and 0xffff
fn expand(raw: u16) -> u16 {
    (raw << 6) | (raw >> 4)
}

#[cfg(test)]
mod tests {
    use max78000_regs::adc::DATA;

    use super::*;
    use crate::pinmap::{P0_2, P2_3};
    use crate::test_support::{emulate, gcr, gpio, peek, poke, ram_peripheral};

    /// A converter that finishes every conversion instantly.
    fn adc() -> Adc {
        let adc = Adc { regs: ram_peripheral(0) };
        adc.regs.intr.write(INTR::DONE_IF::SET + INTR::PWR_RDY_IF::SET + INTR::REF_READY_IF::SET);
        adc
    }

    #[test]
    fn scaling() {
        assert_eq!(expand(0), 0);
        assert_eq!(expand(0x3ff), 0xffff);
        assert_eq!(expand(0x200), 0x8020);
    }

    #[test]
    fn conversion() {
        let adc = adc();
        let gpio = gpio();
        let input = AnalogIn::init(&adc, P2_3, &gpio).unwrap();
        assert_eq!(input.channel(), 3);

        poke(&adc.regs.data, 0x3ff);
        assert_eq!(input.read_raw(), Ok(0x3ff));
        assert_eq!(input.read_u16(), Ok(0xffff));
        assert_eq!(input.read(), Ok(1.0));
        assert_eq!(adc.regs.ctrl.read(CTRL::CH_SEL), 3);
        assert!(adc.regs.ctrl.is_set(CTRL::START));

        // only the low 10 bits are sample
        poke(&adc.regs.data, 0xf200);
        assert_eq!(input.read_u16(), Ok(0x8020));
        assert_eq!(adc.regs.data.read(DATA::DATA), 0xf200);
    }

    #[test]
    fn overflow() {
        let adc = adc();
        poke(&adc.regs.status, 1 << 3);

        assert_eq!(adc.convert(0), Err(HalError::Overrun));
    }

    #[test]
    fn conversion_timeout() {
        let adc = adc();
        let regs = adc.regs.regs();

        // the clear before start lands and no conversion ever finishes
        let _converter = emulate(move || {
            poke(&regs.intr, regs.intr.get() & !INTR::DONE_IF::SET.value)
        });

        assert_eq!(adc.convert(1), Err(HalError::Timeout));
    }

    #[test]
    fn done_clear_leaves_other_flags_pending() {
        let adc = adc();
        poke(
            &adc.regs.intr,
            (INTR::DONE_IE::SET + INTR::DONE_IF::SET + INTR::REF_READY_IF::SET + INTR::OVERFLOW_IF::SET)
                .value,
        );

        adc.convert(0).unwrap();

        // a 0 written to a flag leaves it alone
        assert_eq!(peek(&adc.regs.intr), (INTR::DONE_IE::SET + INTR::DONE_IF::SET).value);
    }

    #[test]
    fn power_up_waits_for_reference() {
        let adc = Adc { regs: ram_peripheral(0) };

        assert_eq!(adc.power_up(), Err(HalError::Timeout));
        assert!(adc.regs.ctrl.is_set(CTRL::PWR));
        assert!(adc.regs.ctrl.is_set(CTRL::REFBUF_PWR));
    }

    #[test]
    fn power_up() {
        let adc = Adc { regs: ram_peripheral(0) };
        let regs = adc.regs.regs();

        // each supply reports ready on the poll after it is switched on
        let _converter = emulate(move || {
            if regs.ctrl.is_set(CTRL::PWR) {
                regs.intr.modify(INTR::PWR_RDY_IF::SET);
            }
            if regs.ctrl.is_set(CTRL::REFBUF_PWR) {
                regs.intr.modify(INTR::REF_READY_IF::SET);
            }
        });

        adc.power_up().unwrap();
        assert!(adc.regs.ctrl.is_set(CTRL::PWR));
        assert!(adc.regs.ctrl.is_set(CTRL::REFBUF_PWR));

        let mut gcr = gcr();
        adc.free(&mut gcr);
    }

    #[test]
    fn pin_checks() {
        let adc = adc();
        let gpio = gpio();

        assert!(matches!(AnalogIn::init(&adc, P0_2, &gpio), Err(HalError::PinNotMapped)));
    }
}
