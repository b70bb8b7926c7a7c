//! Polling I2C master, with a polling slave mode.
//!
//! A transfer issued with `stop == false` keeps the bus claimed, and the next
//! transfer starts with a repeated start instead of a start.

use core::iter::Peekable;

use embedded_hal::i2c::{NoAcknowledgeSource, Operation};
use max78000_regs::i2c::{
    I2cRegisters, CLKHI, CLKLO, CTRL, FIFO, INT0, MSTCTRL, RXCTRL0, RXCTRL1, SLAVE, STATUS,
    TXCTRL0,
};
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::Peripheral;

use crate::gcr::{Gcr, PeripheralClock};
use crate::gpio::Gpio;
use crate::pinmap::{
    pinmap_merge, pinmap_peripheral, pinmap_pinout, PeripheralName, PinName, PINMAP_I2C_SCL,
    PINMAP_I2C_SDA,
};
use crate::HalError;

/// Polls of a status flag before a transfer is abandoned.
pub const I2C_TIMEOUT: u32 = 100_000;

pub const DEFAULT_FREQUENCY: u32 = 100_000;

const I2C_FASTPLUS_SPEED: u32 = 1_000_000;

/// Longest read, the receive counter is 8 bits with 0 meaning 256.
pub const MAX_READ_LEN: usize = 256;

const RX_THRESHOLD: u32 = 6;
const TX_THRESHOLD: u32 = 2;

const INTFL0_MASK: u32 = 0x00ffffff;
const INTFL1_MASK: u32 = 0x00000007;
// error mask for interrupt flags0
const ERROR_MASK: u32 = 0x7f00;

const ADDR_NACK_ERR: u32 = 1 << 10;
const DATA_ERR: u32 = 1 << 11;
const ARB_ERR: u32 = 1 << 8;
const TO_ERR: u32 = 1 << 9;

/// Address match seen by the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveEvent {
    NoData,
    /// The master wants to read, answer with [`I2c::slave_write`].
    ReadAddressed,
    /// The master is writing, collect it with [`I2c::slave_read`].
    WriteAddressed,
}

/// Half period of scl in peripheral clock ticks for a bus frequency of `hz`.
fn clock_ticks(peripheral_clock: u32, hz: u32) -> Result<u32, HalError> {
    if hz == 0 || hz > I2C_FASTPLUS_SPEED {
        return Err(HalError::InvalidFrequency);
    }

    let ticks_total = peripheral_clock / hz;
    let ticks_per_hi_low = (ticks_total >> 1).wrapping_sub(1);

    if ticks_per_hi_low == 0 || ticks_per_hi_low > 0x1ff {
        Err(HalError::InvalidFrequency)
    } else {
        Ok(ticks_per_hi_low)
    }
}

/// Maps the error bits of interrupt flags 0 to an error.
fn error_from_flags(flags: u32) -> Option<HalError> {
    let errors = flags & ERROR_MASK;

    if errors == 0 {
        None
    } else if errors & ADDR_NACK_ERR != 0 {
        Some(HalError::NoAcknowledge(NoAcknowledgeSource::Address))
    } else if errors & DATA_ERR != 0 {
        Some(HalError::NoAcknowledge(NoAcknowledgeSource::Data))
    } else if errors & ARB_ERR != 0 {
        Some(HalError::ArbitrationLost)
    } else if errors & TO_ERR != 0 {
        Some(HalError::Timeout)
    } else {
        Some(HalError::Bus)
    }
}

/// Value of the receive counter for a read of `len` bytes.
fn receive_count(len: usize) -> u32 {
    if len == MAX_READ_LEN {
        0
    } else {
        len as u32
    }
}

pub struct I2c {
    regs: Peripheral<I2cRegisters>,
    peripheral_clock: u32,
    /// A start has been issued and not yet followed by a stop.
    in_transaction: bool,
}

impl I2c {
    /// Sets up the controller behind the `sda` and `scl` pins as a master
    /// running at [`DEFAULT_FREQUENCY`].
    pub fn init(
        i2c: Peripheral<I2cRegisters>,
        sda: PinName,
        scl: PinName,
        gcr: &mut Gcr,
        gpio: &Gpio,
    ) -> Result<Self, HalError> {
        let sda_peripheral = pinmap_peripheral(sda, &PINMAP_I2C_SDA)?;
        let scl_peripheral = pinmap_peripheral(scl, &PINMAP_I2C_SCL)?;

        let peripheral = pinmap_merge(Some(sda_peripheral), Some(scl_peripheral))?;
        if peripheral != Some(PeripheralName::I2c(i2c.index())) {
            return Err(HalError::PinmapMismatch);
        }

        let clock = PeripheralClock::i2c(i2c.index());

        // first shutdown everything, this is what msdk does
        gcr.disable_clock(clock);
        gcr.reset(clock)?;
        gcr.enable_clock(clock);

        pinmap_pinout(sda, &PINMAP_I2C_SDA, gpio)?;
        pinmap_pinout(scl, &PINMAP_I2C_SCL, gpio)?;

        let mut i2c = I2c {
            regs: i2c,
            peripheral_clock: gcr.peripheral_clock_frequency()?,
            in_transaction: false,
        };

        i2c.clear_flags(INTFL0_MASK, INTFL1_MASK);
        i2c.clear_rx_fifo()?;
        i2c.clear_tx_fifo()?;
        i2c.regs.rxctrl0.modify(RXCTRL0::THD_LVL.val(RX_THRESHOLD));
        i2c.regs.txctrl0.modify(TXCTRL0::THD_VAL.val(TX_THRESHOLD));

        i2c.regs.ctrl.modify(CTRL::EN::SET + CTRL::MST_MODE::SET);
        i2c.frequency(DEFAULT_FREQUENCY)?;

        Ok(i2c)
    }

    /// Sets the bus frequency, at most 1 MHz.
    pub fn frequency(&mut self, hz: u32) -> Result<(), HalError> {
        let ticks = clock_ticks(self.peripheral_clock, hz)?;

        self.regs.clklo.write(CLKLO::LO.val(ticks));
        self.regs.clkhi.write(CLKHI::HI.val(ticks));

        Ok(())
    }

    /// Waits for the bus to go idle and claims it.
    pub fn start(&mut self) -> Result<(), HalError> {
        if !self.in_transaction {
            spin_idle(&self.regs).map_err(|_| HalError::BusBusy)?;
            self.in_transaction = true;
        }

        Ok(())
    }

    /// Sends a stop and releases the bus.
    pub fn stop(&mut self) -> Result<(), HalError> {
        self.regs.mstctrl.modify(MSTCTRL::STOP::SET);
        self.in_transaction = false;

        crate::spin_wait(I2C_TIMEOUT, || !self.regs.mstctrl.is_set(MSTCTRL::STOP))?;
        crate::spin_wait(I2C_TIMEOUT, || self.regs.intfl0.is_set(INT0::DONE))?;
        self.regs.intfl0.write(INT0::DONE::SET);

        Ok(())
    }

    /// Writes `data` to the device at the 7 bit `address`.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written
    pub fn write(&mut self, address: u8, data: &[u8], stop: bool) -> Result<usize, HalError> {
        self.write_phase(address, data.iter().copied(), stop)
    }

    /// Reads `buffer.len()` bytes from the device at the 7 bit `address`.
    pub fn read(&mut self, address: u8, buffer: &mut [u8], stop: bool) -> Result<usize, HalError> {
        let len = buffer.len();
        self.read_phase(address, buffer.iter_mut(), len, stop)
    }

    /// Flushes both fifos, clears every flag and releases the bus if it is held.
    pub fn reset(&mut self) -> Result<(), HalError> {
        crate::uprintln_debug!("i2c{}: reset", self.regs.index());

        self.clear_flags(INTFL0_MASK, INTFL1_MASK);
        self.clear_rx_fifo()?;
        self.clear_tx_fifo()?;

        // an idle bus has no stop condition to wait for
        if self.in_transaction {
            self.stop()?;
        }

        Ok(())
    }

    /// Switches between slave mode and master mode.
    pub fn slave_mode(&mut self, enabled: bool) {
        self.in_transaction = false;
        self.clear_flags(INTFL0_MASK, INTFL1_MASK);

        if enabled {
            self.regs.ctrl.modify(CTRL::MST_MODE::CLEAR);
        } else {
            self.regs.ctrl.modify(CTRL::MST_MODE::SET);
        }
    }

    /// Sets the 7 bit address answered in slave mode.
    pub fn slave_address(&mut self, address: u8) -> Result<(), HalError> {
        check_address(address)?;

        self.regs
            .slave
            .write(SLAVE::ADDR.val(address.into()) + SLAVE::EXT_ADDR_EN::CLEAR);

        Ok(())
    }

    /// Checks whether a master has addressed this device.
    pub fn slave_receive(&mut self) -> SlaveEvent {
        let flags = self.regs.intfl0.extract();

        // rd means the slave reads, so the master is the one writing
        if flags.is_set(INT0::RD_ADDR_MATCH) {
            self.regs.intfl0.write(INT0::RD_ADDR_MATCH::SET);
            SlaveEvent::WriteAddressed
        } else if flags.is_set(INT0::WR_ADDR_MATCH) {
            self.regs.intfl0.write(INT0::WR_ADDR_MATCH::SET);
            SlaveEvent::ReadAddressed
        } else {
            SlaveEvent::NoData
        }
    }

    /// Collects bytes written by the master until the buffer is full or the
    /// master stops.
    pub fn slave_read(&mut self, buffer: &mut [u8]) -> Result<usize, HalError> {
        let len = buffer.len();
        let mut slots = buffer.iter_mut();
        let mut read_len = 0;
        let mut polls = 0;

        while read_len < len {
            let received = self.read_rx_fifo(&mut slots);
            read_len += received;

            if received > 0 {
                polls = 0;
                continue;
            }

            let flags = self.regs.intfl0.extract();
            if flags.is_set(INT0::STOP) || flags.is_set(INT0::DONE) {
                break;
            }

            if let Some(err) = error_from_flags(flags.get()) {
                self.clear_flags(INTFL0_MASK, INTFL1_MASK);
                return Err(err);
            }

            polls += 1;
            if polls > I2C_TIMEOUT {
                return Err(HalError::Timeout);
            }
        }

        self.regs.intfl0.write(INT0::STOP::SET + INT0::DONE::SET);

        Ok(read_len)
    }

    /// Answers a read from the master with `data`.
    pub fn slave_write(&mut self, data: &[u8]) -> Result<usize, HalError> {
        // the tx fifo is locked after an address match until the flag is cleared
        self.regs.intfl0.write(INT0::TX_LOCKOUT::SET);

        let mut bytes = data.iter().copied().peekable();
        let mut written = 0;
        let mut polls = 0;

        while bytes.peek().is_some() {
            let pushed = self.write_tx_fifo(&mut bytes);
            written += pushed;

            if pushed > 0 {
                polls = 0;
                continue;
            }

            let flags = self.regs.intfl0.get();
            if let Some(err) = error_from_flags(flags) {
                self.clear_flags(INTFL0_MASK, INTFL1_MASK);
                return Err(err);
            }

            polls += 1;
            if polls > I2C_TIMEOUT {
                return Err(HalError::Timeout);
            }
        }

        Ok(written)
    }

    /// Turns the controller off and hands back its registers.
    pub fn free(self) -> Peripheral<I2cRegisters> {
        self.regs.ctrl.modify(CTRL::EN::CLEAR);
        self.regs
    }

    /// Addresses the device once and sends every byte of `data` in a single
    /// bus phase.
    fn write_phase(
        &mut self,
        address: u8,
        data: impl Iterator<Item = u8>,
        stop: bool,
    ) -> Result<usize, HalError> {
        check_address(address)?;

        let restart = self.in_transaction;
        self.start()?;

        self.prepare_transfer()
            .or_else(|err| self.abort(err))?;

        // slave address with read bit cleared (write mode), the fifo was just
        // flushed so it has room
        self.regs.fifo.write(FIFO::DATA.val((address << 1).into()));

        // prefill fifo with data bytes
        let mut data = data.peekable();
        let mut written = self.write_tx_fifo(&mut data);

        self.issue_start(restart);

        let mut polls = 0;
        while data.peek().is_some() {
            let flags = self.regs.intfl0.get();
            if let Some(err) = error_from_flags(flags) {
                return self.abort(err);
            }

            if flags & INT0::TX_THD::SET.value != 0 {
                written += self.write_tx_fifo(&mut data);
                self.regs.intfl0.write(INT0::TX_THD::SET);
                polls = 0;
            } else {
                polls += 1;
                if polls > I2C_TIMEOUT {
                    return self.abort(HalError::Timeout);
                }
            }
        }

        // all bytes must have left the fifo before the bus is given up or reused
        if let Err(err) = crate::spin_wait(I2C_TIMEOUT, || {
            self.regs.status.is_set(STATUS::TX_EM) || error_from_flags(self.regs.intfl0.get()).is_some()
        }) {
            return self.abort(err);
        }

        self.finish(stop)?;

        Ok(written)
    }

    /// Addresses the device once and fills the `len` slots of `buffer` in a
    /// single bus phase.
    fn read_phase<'b>(
        &mut self,
        address: u8,
        mut buffer: impl Iterator<Item = &'b mut u8>,
        len: usize,
        stop: bool,
    ) -> Result<usize, HalError> {
        check_address(address)?;

        if len > MAX_READ_LEN {
            return Err(HalError::InvalidLength);
        }

        if len == 0 {
            if stop && self.in_transaction {
                self.stop()?;
            }

            return Ok(0);
        }

        let restart = self.in_transaction;
        self.start()?;

        self.prepare_transfer()
            .or_else(|err| self.abort(err))?;

        self.regs
            .rxctrl1
            .modify(RXCTRL1::CNT.val(receive_count(len)));

        // slave address with read bit set
        self.regs.fifo.write(FIFO::DATA.val(((address << 1) | 1).into()));

        self.issue_start(restart);

        let mut read_len = 0;
        let mut polls = 0;
        while read_len < len {
            if let Some(err) = error_from_flags(self.regs.intfl0.get()) {
                return self.abort(err);
            }

            let received = self.read_rx_fifo(&mut buffer);
            if received == 0 {
                polls += 1;
                if polls > I2C_TIMEOUT {
                    return self.abort(HalError::Timeout);
                }
            } else {
                read_len += received;
                self.regs.intfl0.write(INT0::RX_THD::SET);
                polls = 0;
            }
        }

        self.finish(stop)?;

        Ok(read_len)
    }

    fn prepare_transfer(&mut self) -> Result<(), HalError> {
        // flags have to be cleared first, because if tx lockout flag is set,
        // clear tx fifo will be stuck waiting
        self.clear_flags(INTFL0_MASK, INTFL1_MASK);
        self.clear_tx_fifo()?;
        self.clear_rx_fifo()
    }

    fn issue_start(&mut self, restart: bool) {
        if restart {
            self.regs.mstctrl.modify(MSTCTRL::RESTART::SET);
        } else {
            self.regs.mstctrl.modify(MSTCTRL::START::SET);
        }
    }

    /// Ends a transfer that went through, keeping the bus when `stop` is not set.
    fn finish(&mut self, stop: bool) -> Result<(), HalError> {
        if let Some(err) = error_from_flags(self.regs.intfl0.get()) {
            return self.abort(err);
        }

        if stop {
            self.stop()?;
        }

        match error_from_flags(self.regs.intfl0.get()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Gives up the bus after a failed transfer.
    fn abort<T>(&mut self, err: HalError) -> Result<T, HalError> {
        crate::uprintln_debug!("i2c{}: transfer failed: {}", self.regs.index(), err);

        // the stop is best effort, the first error is what gets reported
        let _ = self.stop();
        self.clear_flags(INTFL0_MASK, INTFL1_MASK);

        Err(err)
    }

    /// Clears whichever of `flags0` and `flags1` are pending. Writing a 1
    /// clears a flag, so only the ones read back as set are written.
    fn clear_flags(&self, flags0: u32, flags1: u32) {
        self.regs.intfl0.set(self.regs.intfl0.get() & flags0);
        self.regs.intfl1.set(self.regs.intfl1.get() & flags1);
    }

    fn clear_rx_fifo(&self) -> Result<(), HalError> {
        self.regs.rxctrl0.modify(RXCTRL0::FLUSH::SET);
        crate::spin_wait(I2C_TIMEOUT, || !self.regs.rxctrl0.is_set(RXCTRL0::FLUSH))
    }

    fn clear_tx_fifo(&self) -> Result<(), HalError> {
        self.regs.txctrl0.modify(TXCTRL0::FLUSH::SET);
        crate::spin_wait(I2C_TIMEOUT, || !self.regs.txctrl0.is_set(TXCTRL0::FLUSH))
    }

    /// Moves received bytes into the next slots of `buf` until either runs out.
    fn read_rx_fifo<'b>(&self, buf: &mut impl Iterator<Item = &'b mut u8>) -> usize {
        let mut i = 0;

        while !self.regs.status.is_set(STATUS::RX_EM) {
            let Some(slot) = buf.next() else {
                break;
            };

            *slot = self.regs.fifo.read(FIFO::DATA) as u8;
            i += 1;
        }

        i
    }

    /// Writes the data into the txfifo, leaving what does not fit in `data`
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written
    fn write_tx_fifo(&self, data: &mut Peekable<impl Iterator<Item = u8>>) -> usize {
        let mut i = 0;

        while let Some(&byte) = data.peek() {
            if self.regs.status.is_set(STATUS::TX_FULL) {
                break;
            }

            self.regs.fifo.write(FIFO::DATA.val(byte.into()));
            data.next();
            i += 1;
        }

        i
    }
}

fn check_address(address: u8) -> Result<(), HalError> {
    if address > 0x7f {
        Err(HalError::InvalidAddress)
    } else {
        Ok(())
    }
}

fn spin_idle(regs: &I2cRegisters) -> Result<(), HalError> {
    crate::spin_wait(I2C_TIMEOUT, || !regs.status.is_set(STATUS::BUSY))
}

impl embedded_hal::i2c::ErrorType for I2c {
    type Error = HalError;
}

/// Adjacent operations of the same direction share one bus phase: the device
/// is addressed once per run, a repeated start separates the runs and a stop
/// ends the last one.
impl embedded_hal::i2c::I2c for I2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut rest = operations;

        while let Some(first) = rest.first() {
            let reading = matches!(first, Operation::Read(_));
            let run = rest
                .iter()
                .take_while(|op| matches!(op, Operation::Read(_)) == reading)
                .count();

            let (phase, tail) = core::mem::take(&mut rest).split_at_mut(run);
            let stop = tail.is_empty();

            if reading {
                let len = phase
                    .iter()
                    .map(|op| match op {
                        Operation::Read(buffer) => buffer.len(),
                        Operation::Write(_) => 0,
                    })
                    .sum();
                let slots = phase.iter_mut().flat_map(|op| match op {
                    Operation::Read(buffer) => buffer.iter_mut(),
                    Operation::Write(_) => Default::default(),
                });

                self.read_phase(address, slots, len, stop)?;
            } else {
                let bytes = phase
                    .iter()
                    .flat_map(|op| match op {
                        Operation::Write(data) => data.iter(),
                        Operation::Read(_) => Default::default(),
                    })
                    .copied();

                self.write_phase(address, bytes, stop)?;
            }

            rest = tail;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use embedded_hal::i2c::I2c as _;

    use super::*;
    use crate::pinmap::{P0_10, P0_11, P0_16, P0_17};
    use crate::test_support::{emulate, gcr, gpio, peek, poke, ram_peripheral, Emulation};

    fn master() -> I2c {
        I2c {
            regs: ram_peripheral(1),
            peripheral_clock: 50_000_000,
            in_transaction: false,
        }
    }

    /// Plays the controller on every poll: fifo flushes finish, queued bytes
    /// leave at once, and start, restart and stop conditions are put on the
    /// bus and logged in order.
    fn emulate_controller(i2c: &I2c) -> (Emulation, Rc<RefCell<Vec<&'static str>>>) {
        let regs = i2c.regs.regs();
        let bus = Rc::new(RefCell::new(Vec::new()));
        let log = bus.clone();

        poke(&regs.status, STATUS::TX_EM::SET.value);

        let controller = emulate(move || {
            regs.rxctrl0.modify(RXCTRL0::FLUSH::CLEAR);
            regs.txctrl0.modify(TXCTRL0::FLUSH::CLEAR);

            if regs.mstctrl.is_set(MSTCTRL::START) {
                regs.mstctrl.modify(MSTCTRL::START::CLEAR);
                log.borrow_mut().push("start");
            }
            if regs.mstctrl.is_set(MSTCTRL::RESTART) {
                regs.mstctrl.modify(MSTCTRL::RESTART::CLEAR);
                log.borrow_mut().push("restart");
            }
            if regs.mstctrl.is_set(MSTCTRL::STOP) {
                regs.mstctrl.modify(MSTCTRL::STOP::CLEAR);
                regs.intfl0.write(INT0::DONE::SET);
                log.borrow_mut().push("stop");
            }
        });

        (controller, bus)
    }

    #[test]
    fn clock_divider() {
        assert_eq!(clock_ticks(50_000_000, 100_000), Ok(249));
        assert_eq!(clock_ticks(50_000_000, 400_000), Ok(61));
        assert_eq!(clock_ticks(50_000_000, 1_000_000), Ok(24));

        // too slow for the 9 bit counters
        assert_eq!(clock_ticks(50_000_000, 10_000), Err(HalError::InvalidFrequency));
        // faster than fast plus
        assert_eq!(clock_ticks(50_000_000, 3_400_000), Err(HalError::InvalidFrequency));
        // half period rounds to nothing
        assert_eq!(clock_ticks(3_000_000, 1_000_000), Err(HalError::InvalidFrequency));
        assert_eq!(clock_ticks(50_000_000, 0), Err(HalError::InvalidFrequency));
    }

    #[test]
    fn frequency_programs_both_halves() {
        let mut i2c = master();

        i2c.frequency(400_000).unwrap();
        assert_eq!(i2c.regs.clklo.read(CLKLO::LO), 61);
        assert_eq!(i2c.regs.clkhi.read(CLKHI::HI), 61);

        assert_eq!(i2c.frequency(2_000_000), Err(HalError::InvalidFrequency));
        assert_eq!(i2c.regs.clklo.read(CLKLO::LO), 61);
    }

    #[test]
    fn error_flags() {
        assert_eq!(error_from_flags(INT0::DONE::SET.value), None);
        assert_eq!(
            error_from_flags(ADDR_NACK_ERR | DATA_ERR),
            Some(HalError::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(
            error_from_flags(DATA_ERR),
            Some(HalError::NoAcknowledge(NoAcknowledgeSource::Data))
        );
        assert_eq!(error_from_flags(ARB_ERR), Some(HalError::ArbitrationLost));
        assert_eq!(error_from_flags(TO_ERR), Some(HalError::Timeout));
        assert_eq!(error_from_flags(INT0::START_ERR::SET.value), Some(HalError::Bus));
    }

    #[test]
    fn read_count_encoding() {
        assert_eq!(receive_count(1), 1);
        assert_eq!(receive_count(255), 255);
        assert_eq!(receive_count(256), 0);
    }

    #[test]
    fn busy_bus() {
        let mut i2c = master();
        poke(&i2c.regs.status, STATUS::BUSY::SET.value);

        assert_eq!(i2c.write(0x50, &[1, 2], true), Err(HalError::BusBusy));
        assert_eq!(i2c.read(0x50, &mut [0; 2], true), Err(HalError::BusBusy));
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn open_transaction_skips_idle_wait() {
        let mut i2c = master();
        i2c.start().unwrap();

        // the bus is ours, busy is expected
        poke(&i2c.regs.status, STATUS::BUSY::SET.value);
        assert_eq!(i2c.start(), Ok(()));
        assert!(i2c.in_transaction);
    }

    #[test]
    fn oversized_read() {
        let mut i2c = master();

        assert_eq!(i2c.read(0x50, &mut [0; 257], true), Err(HalError::InvalidLength));
        assert_eq!(i2c.read(0x50, &mut [], false), Ok(0));
    }

    #[test]
    fn stop_without_hardware_times_out() {
        let mut i2c = master();
        i2c.start().unwrap();

        assert_eq!(i2c.stop(), Err(HalError::Timeout));
        assert!(i2c.regs.mstctrl.is_set(MSTCTRL::STOP));
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn write_then_stop() {
        let mut i2c = master();
        let (_controller, bus) = emulate_controller(&i2c);

        assert_eq!(i2c.write(0x50, &[1, 2, 3], true), Ok(3));
        assert_eq!(peek(&i2c.regs.fifo), 3);
        assert_eq!(*bus.borrow(), ["start", "stop"]);
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn read_after_write_uses_repeated_start() {
        let mut i2c = master();
        let (_controller, bus) = emulate_controller(&i2c);

        assert_eq!(i2c.write(0x50, &[0x10], false), Ok(1));
        assert!(i2c.in_transaction);

        // the ram fifo hands back the last byte queued, the read address
        let mut buf = [0; 2];
        assert_eq!(i2c.read(0x50, &mut buf, true), Ok(2));
        assert_eq!(buf, [0xa1; 2]);
        assert_eq!(i2c.regs.rxctrl1.read(RXCTRL1::CNT), 2);
        assert_eq!(*bus.borrow(), ["start", "restart", "stop"]);
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn transaction_addresses_once_per_direction() {
        let mut i2c = master();
        let (_controller, bus) = emulate_controller(&i2c);

        i2c.transaction(0x50, &mut [Operation::Write(&[1, 2]), Operation::Write(&[3])])
            .unwrap();
        assert_eq!(peek(&i2c.regs.fifo), 3);
        assert_eq!(*bus.borrow(), ["start", "stop"]);

        bus.borrow_mut().clear();

        let mut first = [0; 1];
        let mut second = [0; 2];
        i2c.transaction(
            0x50,
            &mut [
                Operation::Write(&[0x10]),
                Operation::Read(&mut first),
                Operation::Read(&mut second),
            ],
        )
        .unwrap();
        assert_eq!(i2c.regs.rxctrl1.read(RXCTRL1::CNT), 3);
        assert_eq!((first, second), ([0xa1], [0xa1; 2]));
        assert_eq!(*bus.borrow(), ["start", "restart", "stop"]);
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn merged_reads_share_the_length_limit() {
        let mut i2c = master();
        let (_controller, bus) = emulate_controller(&i2c);

        assert_eq!(
            i2c.transaction(
                0x50,
                &mut [Operation::Read(&mut [0; 200]), Operation::Read(&mut [0; 100])]
            ),
            Err(HalError::InvalidLength)
        );
        assert!(bus.borrow().is_empty());
    }

    #[test]
    fn ten_bit_addresses_rejected() {
        let mut i2c = master();

        assert_eq!(i2c.write(0x80, &[1], true), Err(HalError::InvalidAddress));
        assert_eq!(i2c.read(0xa0, &mut [0; 1], true), Err(HalError::InvalidAddress));
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn reset_stops_only_a_held_bus() {
        let mut i2c = master();
        let (_controller, bus) = emulate_controller(&i2c);

        assert_eq!(i2c.reset(), Ok(()));
        assert!(bus.borrow().is_empty());

        i2c.start().unwrap();
        assert_eq!(i2c.reset(), Ok(()));
        assert_eq!(*bus.borrow(), ["stop"]);
        assert!(!i2c.in_transaction);
    }

    #[test]
    fn clear_flags_writes_back_pending_flags() {
        let i2c = master();
        poke(&i2c.regs.intfl0, INT0::DONE::SET.value | ARB_ERR);

        i2c.clear_flags(INTFL0_MASK, INTFL1_MASK);
        assert_eq!(peek(&i2c.regs.intfl0), INT0::DONE::SET.value | ARB_ERR);
        assert_eq!(peek(&i2c.regs.intfl1), 0);
    }

    #[test]
    fn slave_events() {
        let mut i2c = master();
        i2c.slave_mode(true);
        assert!(!i2c.regs.ctrl.is_set(CTRL::MST_MODE));

        assert_eq!(i2c.slave_receive(), SlaveEvent::NoData);

        i2c.regs.intfl0.set(INT0::WR_ADDR_MATCH::SET.value);
        assert_eq!(i2c.slave_receive(), SlaveEvent::ReadAddressed);

        i2c.regs.intfl0.set(INT0::RD_ADDR_MATCH::SET.value);
        assert_eq!(i2c.slave_receive(), SlaveEvent::WriteAddressed);
    }

    #[test]
    fn slave_address() {
        let mut i2c = master();

        i2c.slave_address(0x42).unwrap();
        assert_eq!(i2c.regs.slave.read(SLAVE::ADDR), 0x42);
        assert_eq!(i2c.slave_address(0x80), Err(HalError::InvalidAddress));
    }

    #[test]
    fn slave_read_drains_fifo() {
        let mut i2c = master();
        // receive fifo never runs empty in ram, every read sees the same byte
        poke(&i2c.regs.fifo, 0x5a);

        let mut buf = [0; 3];
        assert_eq!(i2c.slave_read(&mut buf), Ok(3));
        assert_eq!(buf, [0x5a; 3]);
    }

    #[test]
    fn slave_read_stops_on_stop_condition() {
        let mut i2c = master();
        poke(&i2c.regs.status, STATUS::RX_EM::SET.value);
        i2c.regs.intfl0.set(INT0::STOP::SET.value);

        assert_eq!(i2c.slave_read(&mut [0; 4]), Ok(0));
    }

    #[test]
    fn slave_write_fills_fifo() {
        let mut i2c = master();

        assert_eq!(i2c.slave_write(&[7, 8, 9]), Ok(3));
        assert_eq!(peek(&i2c.regs.fifo), 9);
    }

    #[test]
    fn slave_write_full_fifo_times_out() {
        let mut i2c = master();
        poke(&i2c.regs.status, STATUS::TX_FULL::SET.value);

        assert_eq!(i2c.slave_write(&[1]), Err(HalError::Timeout));
    }

    #[test]
    fn init_rejects_mismatched_pins() {
        let mut gcr = gcr();
        let gpio = gpio();

        // sda of i2c0 with scl of i2c1
        assert!(matches!(
            I2c::init(ram_peripheral(0), P0_11, P0_16, &mut gcr, &gpio),
            Err(HalError::PinmapMismatch)
        ));
        // right pins, wrong controller
        assert!(matches!(
            I2c::init(ram_peripheral(0), P0_17, P0_16, &mut gcr, &gpio),
            Err(HalError::PinmapMismatch)
        ));
        // scl and sda swapped
        assert!(matches!(
            I2c::init(ram_peripheral(0), P0_10, P0_11, &mut gcr, &gpio),
            Err(HalError::PinNotMapped)
        ));
    }
}
