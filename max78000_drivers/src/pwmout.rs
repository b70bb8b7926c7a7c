//! Pwm output on a timer pin.
//!
//! The timer counts up to `cmp` every period; the output is high for the
//! last `cmp - pwm` counts of it.

use core::convert::Infallible;

use max78000_regs::tmr::{TmrRegisters, CTRL0};
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Writeable};
use max78000_regs::Peripheral;

use crate::gcr::Gcr;
use crate::gpio::Gpio;
use crate::pinmap::{pinmap_peripheral, pinmap_pinout, PeripheralName, PinName, PINMAP_PWM};
use crate::{timer, HalError};

pub const DEFAULT_PERIOD_US: u32 = 20_000;

/// Smallest prescaler exponent whose period count fits the 32 bit counter.
///
/// Returns the exponent and the number of counts in `period_us`.
fn timer_config(peripheral_clock: u32, period_us: u32) -> Result<(u32, u32), HalError> {
    for prescale in 0..=timer::MAX_PRESCALE {
        let ticks = u64::from(peripheral_clock >> prescale) * u64::from(period_us) / 1_000_000;

        if ticks <= u64::from(u32::MAX) {
            return match ticks {
                0 => Err(HalError::InvalidFrequency),
                ticks => Ok((prescale, ticks as u32)),
            };
        }
    }

    Err(HalError::InvalidFrequency)
}

pub struct PwmOut {
    regs: Peripheral<TmrRegisters>,
    pin: PinName,
    peripheral_clock: u32,
    prescale: u32,
    period_ticks: u32,
    pulse_ticks: u32,
}

impl PwmOut {
    /// Starts a 20 ms period at 0% duty on `pin`.
    pub fn init(
        tmr: Peripheral<TmrRegisters>,
        pin: PinName,
        gcr: &mut Gcr,
        gpio: &Gpio,
    ) -> Result<Self, HalError> {
        if pinmap_peripheral(pin, &PINMAP_PWM)? != PeripheralName::Tmr(tmr.index()) {
            return Err(HalError::PinmapMismatch);
        }

        let peripheral_clock = timer::prepare(&tmr, gcr)?;
        pinmap_pinout(pin, &PINMAP_PWM, gpio)?;

        let mut pwm = PwmOut {
            regs: tmr,
            pin,
            peripheral_clock,
            prescale: 0,
            period_ticks: 0,
            pulse_ticks: 0,
        };

        timer::configure(&pwm.regs, CTRL0::MODE_A::Pwm, 0);
        pwm.period_us(DEFAULT_PERIOD_US)?;

        timer::start(&pwm.regs)?;

        Ok(pwm)
    }

    /// Changes the period, keeping the duty cycle.
    pub fn period_us(&mut self, us: u32) -> Result<(), HalError> {
        let (prescale, ticks) = timer_config(self.peripheral_clock, us)?;

        // pulse_ticks never exceeds period_ticks, so this fits in u32
        let pulse = match self.period_ticks {
            0 => 0,
            old => u64::from(self.pulse_ticks) * u64::from(ticks) / u64::from(old),
        };

        self.regs.ctrl0.modify(CTRL0::CLKDIV_A.val(prescale));
        self.regs.cmp.set(ticks);
        // counting restarts at 1 after a match
        self.regs.cnt.set(1);

        self.prescale = prescale;
        self.period_ticks = ticks;
        self.set_pulse_ticks(pulse as u32);

        Ok(())
    }

    pub fn period_ms(&mut self, ms: u32) -> Result<(), HalError> {
        self.period_us(ms.checked_mul(1000).ok_or(HalError::InvalidFrequency)?)
    }

    pub fn period(&mut self, seconds: f32) -> Result<(), HalError> {
        self.period_us((seconds * 1_000_000.0) as u32)
    }

    /// Sets the high time, clamped to the period.
    pub fn pulsewidth_us(&mut self, us: u32) {
        let ticks = u64::from(self.peripheral_clock >> self.prescale) * u64::from(us) / 1_000_000;
        self.set_pulse_ticks(ticks.min(u64::from(u32::MAX)) as u32);
    }

    pub fn pulsewidth_ms(&mut self, ms: u32) {
        self.pulsewidth_us(ms.saturating_mul(1000));
    }

    pub fn pulsewidth(&mut self, seconds: f32) {
        self.pulsewidth_us((seconds * 1_000_000.0) as u32);
    }

    /// Sets the duty cycle, clamped to `0.0..=1.0`.
    pub fn write(&mut self, duty: f32) {
        self.set_pulse_ticks(duty_ticks(duty, self.period_ticks));
    }

    /// Current duty cycle.
    pub fn read(&self) -> f32 {
        if self.period_ticks == 0 {
            0.0
        } else {
            self.pulse_ticks as f32 / self.period_ticks as f32
        }
    }

    pub fn pin(&self) -> PinName {
        self.pin
    }

    fn set_pulse_ticks(&mut self, ticks: u32) {
        self.pulse_ticks = ticks.min(self.period_ticks);
        self.regs.pwm.set(self.period_ticks - self.pulse_ticks);
    }

    /// Stops the timer and hands back its registers.
    pub fn free(self) -> Peripheral<TmrRegisters> {
        timer::stop(&self.regs);
        self.regs
    }
}

fn duty_ticks(duty: f32, period_ticks: u32) -> u32 {
    // nan fails both comparisons and ends up at 0
    let duty = if duty >= 1.0 {
        1.0
    } else if duty > 0.0 {
        duty
    } else {
        0.0
    };

    (duty * period_ticks as f32) as u32
}

impl embedded_hal::pwm::ErrorType for PwmOut {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for PwmOut {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let ticks = u64::from(self.period_ticks) * u64::from(duty) / u64::from(u16::MAX);
        self.set_pulse_ticks(ticks as u32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::pwm::SetDutyCycle;
    use max78000_regs::tock_registers::interfaces::Readable;

    use super::*;
    use crate::pinmap::{P0_14, P0_2, P0_3};
    use crate::test_support::{gcr, gpio, ram_peripheral};

    fn pwm() -> PwmOut {
        let mut pwm = PwmOut {
            regs: ram_peripheral(0),
            pin: P0_2,
            peripheral_clock: 50_000_000,
            prescale: 0,
            period_ticks: 0,
            pulse_ticks: 0,
        };
        pwm.period_us(DEFAULT_PERIOD_US).unwrap();
        pwm
    }

    #[test]
    fn prescaler_selection() {
        assert_eq!(timer_config(50_000_000, 20_000), Ok((0, 1_000_000)));
        // 5e9 counts does not fit, halving the clock does
        assert_eq!(timer_config(50_000_000, 100_000_000), Ok((1, 2_500_000_000)));
        assert_eq!(timer_config(50_000_000, u32::MAX), Ok((6, 3_355_443_199)));
        assert_eq!(timer_config(50_000_000, 0), Err(HalError::InvalidFrequency));
    }

    #[test]
    fn default_period() {
        let pwm = pwm();

        assert_eq!(pwm.regs.cmp.get(), 1_000_000);
        assert_eq!(pwm.regs.ctrl0.read(CTRL0::CLKDIV_A), 0);
        // 0% duty, output never goes high
        assert_eq!(pwm.regs.pwm.get(), 1_000_000);
        assert_eq!(pwm.read(), 0.0);
    }

    #[test]
    fn duty_cycle() {
        let mut pwm = pwm();

        pwm.write(0.25);
        assert_eq!(pwm.pulse_ticks, 250_000);
        assert_eq!(pwm.regs.pwm.get(), 750_000);
        assert_eq!(pwm.read(), 0.25);

        pwm.write(1.5);
        assert_eq!(pwm.regs.pwm.get(), 0);
        pwm.write(-1.0);
        assert_eq!(pwm.regs.pwm.get(), 1_000_000);
        pwm.write(f32::NAN);
        assert_eq!(pwm.pulse_ticks, 0);
    }

    #[test]
    fn period_change_keeps_duty() {
        let mut pwm = pwm();
        pwm.write(0.5);

        pwm.period_ms(10).unwrap();
        assert_eq!(pwm.regs.cmp.get(), 500_000);
        assert_eq!(pwm.regs.pwm.get(), 250_000);
        assert_eq!(pwm.read(), 0.5);

        pwm.period(200.0).unwrap();
        assert_eq!(pwm.regs.ctrl0.read(CTRL0::CLKDIV_A), 2);
        assert_eq!(pwm.regs.cmp.get(), 2_500_000_000);
        assert_eq!(pwm.read(), 0.5);

        assert_eq!(pwm.period_ms(u32::MAX), Err(HalError::InvalidFrequency));
    }

    #[test]
    fn long_period_keeps_exact_pulse() {
        let mut pwm = pwm();
        pwm.pulsewidth_us(3_000);
        assert_eq!(pwm.pulse_ticks, 150_000);

        // past 2^24 ticks, where an f32 duty cycle no longer lands on a tick
        pwm.period(200.0).unwrap();
        assert_eq!(pwm.pulse_ticks, 375_000_000);
        assert_eq!(pwm.regs.pwm.get(), 2_125_000_000);

        pwm.period_ms(20).unwrap();
        assert_eq!(pwm.pulse_ticks, 150_000);
    }

    #[test]
    fn pulse_width() {
        let mut pwm = pwm();

        pwm.pulsewidth_us(5_000);
        assert_eq!(pwm.regs.pwm.get(), 750_000);

        pwm.pulsewidth_ms(1);
        assert_eq!(pwm.pulse_ticks, 50_000);

        pwm.pulsewidth(0.015625);
        assert_eq!(pwm.pulse_ticks, 781_250);

        // longer than the period
        pwm.pulsewidth_ms(30);
        assert_eq!(pwm.regs.pwm.get(), 0);
        assert_eq!(pwm.read(), 1.0);
    }

    #[test]
    fn set_duty_cycle() {
        let mut pwm = pwm();

        assert_eq!(pwm.max_duty_cycle(), u16::MAX);
        pwm.set_duty_cycle_fully_on().unwrap();
        assert_eq!(pwm.regs.pwm.get(), 0);
        pwm.set_duty_cycle_fully_off().unwrap();
        assert_eq!(pwm.regs.pwm.get(), 1_000_000);
    }

    #[test]
    fn init_checks_pin() {
        let mut gcr = gcr();
        let gpio = gpio();

        assert!(matches!(
            PwmOut::init(ram_peripheral(0), P0_14, &mut gcr, &gpio),
            Err(HalError::PinmapMismatch)
        ));
        assert!(matches!(
            PwmOut::init(ram_peripheral(0), P0_3, &mut gcr, &gpio),
            Err(HalError::PinNotMapped)
        ));
    }
}
