//! Free running microsecond-ish ticker with a single alarm.
//!
//! The timer runs in compare mode off the peripheral clock, divided down to
//! the slowest rate that still ticks at least once per microsecond.

use core::cell::Cell;

use cortex_m::peripheral::NVIC;
use critical_section::Mutex;
use max78000_regs::tmr::{TmrRegisters, CTRL0, CTRL1, INTFL};
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::{Peripheral, StaticRef};

use crate::gcr::Gcr;
use crate::{timer, HalError};

const TARGET_FREQUENCY: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerInfo {
    pub frequency: u32,
    pub bits: u32,
}

#[derive(Clone, Copy)]
struct TickerIrq {
    regs: StaticRef<TmrRegisters>,
    /// Timer the handler was installed from.
    index: u8,
    handler: fn(),
}

static TICKER_IRQ: Mutex<Cell<Option<TickerIrq>>> = Mutex::new(Cell::new(None));

/// Prescaler exponent and resulting tick rate for a timer clocked at `pclk`.
fn ticker_prescale(pclk: u32) -> (u32, u32) {
    let prescale = (0..=timer::MAX_PRESCALE)
        .rev()
        .find(|&n| pclk >> n >= TARGET_FREQUENCY)
        .unwrap_or(0);

    (prescale, pclk >> prescale)
}

pub struct UsTicker {
    regs: Peripheral<TmrRegisters>,
    frequency: u32,
}

impl UsTicker {
    pub fn init(tmr: Peripheral<TmrRegisters>, gcr: &mut Gcr) -> Result<Self, HalError> {
        let pclk = timer::prepare(&tmr, gcr)?;
        let (prescale, frequency) = ticker_prescale(pclk);

        timer::configure(&tmr, CTRL0::MODE_A::Compare, prescale);
        tmr.cmp.set(u32::MAX);
        tmr.cnt.set(0);

        timer::start(&tmr)?;

        Ok(UsTicker {
            regs: tmr,
            frequency,
        })
    }

    pub fn info(&self) -> TickerInfo {
        TickerInfo {
            frequency: self.frequency,
            bits: 32,
        }
    }

    /// Raw counter value, wraps every 2^32 ticks.
    pub fn read(&self) -> u32 {
        self.regs.cnt.get()
    }

    pub fn read_us(&self) -> u64 {
        u64::from(self.read()) * 1_000_000 / u64::from(self.frequency)
    }

    /// Arms the alarm for when the counter reaches `timestamp`.
    pub fn set_interrupt(&mut self, timestamp: u32) {
        self.clear_interrupt();
        self.regs.cmp.set(timestamp);
        self.regs.ctrl1.modify(CTRL1::IE_A::SET);
    }

    pub fn disable_interrupt(&mut self) {
        self.regs.ctrl1.modify(CTRL1::IE_A::CLEAR);
    }

    pub fn clear_interrupt(&mut self) {
        self.regs.intfl.write(INTFL::IRQ_A::SET);
    }

    /// Runs the handler as soon as possible, without waiting for the alarm.
    pub fn fire_interrupt(&mut self) {
        NVIC::pend(timer::irq(self.regs.index()));
    }

    /// Installs the function called from the timer interrupt and unmasks it.
    pub fn set_handler(&mut self, handler: fn()) {
        let irq = TickerIrq {
            regs: self.regs.regs(),
            index: self.regs.index(),
            handler,
        };
        critical_section::with(|cs| TICKER_IRQ.borrow(cs).set(Some(irq)));

        // safety: the handler slot is filled before the interrupt can fire
        unsafe { NVIC::unmask(timer::irq(self.regs.index())) }
    }

    pub fn free(self) -> Peripheral<TmrRegisters> {
        self.regs.ctrl1.modify(CTRL1::IE_A::CLEAR);
        critical_section::with(|cs| {
            let slot = TICKER_IRQ.borrow(cs);

            // another ticker may have installed its handler since
            if slot.get().is_some_and(|irq| irq.index == self.regs.index()) {
                slot.set(None);
            }
        });
        timer::stop(&self.regs);
        self.regs
    }
}

/// Body of the ticker's timer interrupt.
///
/// Call it from the `TMRn` handler of the timer passed to [`UsTicker::init`].
pub fn handle_interrupt() {
    let irq = critical_section::with(|cs| TICKER_IRQ.borrow(cs).get());

    if let Some(irq) = irq {
        irq.regs.intfl.write(INTFL::IRQ_A::SET);
        (irq.handler)();
    }
}

/// Busy wait delays counted on a running ticker.
pub struct Delay<'a> {
    ticker: &'a UsTicker,
}

impl<'a> Delay<'a> {
    pub fn new(ticker: &'a UsTicker) -> Self {
        Delay { ticker }
    }
}

impl embedded_hal::delay::DelayNs for Delay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = (u64::from(ns) * u64::from(self.ticker.frequency)).div_ceil(1_000_000_000);
        let start = self.ticker.read();

        while u64::from(self.ticker.read().wrapping_sub(start)) < ticks {
            core::hint::spin_loop();
        }
    }
}
