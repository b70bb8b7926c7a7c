//! Setup shared by the drivers built on the 32 bit timers.

use max78000_regs::tmr::{TmrRegisters, CTRL0, CTRL1, INTFL};
use max78000_regs::tock_registers::fields::FieldValue;
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::{Interrupt, Peripheral};

use crate::gcr::{Gcr, PeripheralClock};
use crate::{spin_wait, HalError};

const TMR_TIMEOUT: u32 = 100_000;

/// Largest prescaler exponent, the counter clock is at least pclk / 4096.
pub(crate) const MAX_PRESCALE: u32 = 12;

/// Resets and clocks the timer, leaving it stopped.
///
/// Returns the frequency of the clock feeding it.
pub(crate) fn prepare(tmr: &Peripheral<TmrRegisters>, gcr: &mut Gcr) -> Result<u32, HalError> {
    let clock = PeripheralClock::tmr(tmr.index());

    gcr.disable_clock(clock);
    gcr.reset(clock)?;
    gcr.enable_clock(clock);

    stop(tmr);

    gcr.peripheral_clock_frequency()
}

/// Sets the mode and a counter clock of pclk / 2^`prescale`, the timer
/// must be stopped.
pub(crate) fn configure(
    regs: &TmrRegisters,
    mode: FieldValue<u32, CTRL0::Register>,
    prescale: u32,
) {
    regs.ctrl0.modify(CTRL0::CLKEN_A::CLEAR);

    // one 32 bit timer, counting the peripheral clock
    regs.ctrl1.modify(CTRL1::CASCADE::SET + CTRL1::CLKSEL_A::Pclk);

    regs.ctrl0.modify(mode + CTRL0::CLKDIV_A.val(prescale));

    regs.intfl.write(INTFL::IRQ_A::SET);
}

/// Starts counting.
pub(crate) fn start(regs: &TmrRegisters) -> Result<(), HalError> {
    regs.ctrl0.modify(CTRL0::CLKEN_A::SET);
    spin_wait(TMR_TIMEOUT, || regs.ctrl1.is_set(CTRL1::CLKRDY_A))?;

    regs.ctrl0.modify(CTRL0::EN_A::SET);
    spin_wait(TMR_TIMEOUT, || regs.ctrl1.is_set(CTRL1::CLKEN_A))
}

pub(crate) fn stop(regs: &TmrRegisters) {
    regs.ctrl0.modify(CTRL0::EN_A::CLEAR);
}

pub(crate) fn irq(index: u8) -> Interrupt {
    match index {
        0 => Interrupt::TMR0,
        1 => Interrupt::TMR1,
        2 => Interrupt::TMR2,
        3 => Interrupt::TMR3,
        4 => Interrupt::TMR4,
        _ => Interrupt::TMR5,
    }
}
