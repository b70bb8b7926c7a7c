use core::cmp::min;
use core::fmt::{self, Write};

use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::uart::{UartRegisters, CLKDIV, CTRL, FIFO, OSR, STATUS};
use max78000_regs::Peripheral;
use once_cell::sync::OnceCell;

use crate::gcr::{Gcr, PeripheralClock};
use crate::gpio::Gpio;
use crate::pinmap::{
    pinmap_merge, pinmap_optional, pinmap_pinout_optional, PeripheralName, PinName,
    PINMAP_UART_RX, PINMAP_UART_TX,
};
use crate::{spin_wait, HalError, IBRO_FREQUENCY};

const MAX_CLOCK_DIVISOR: u32 = (1 << 20) - 1;

const SERIAL_TIMEOUT: u32 = 100_000;

pub const DEFAULT_BAUD: u32 = 115200;

static STDIO: OnceCell<Serial> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Divisor of the ibro clock for `baud_rate`, rounded to nearest.
fn baud_divisor(baud_rate: u32) -> Result<u32, HalError> {
    if baud_rate == 0 {
        return Err(HalError::InvalidFrequency);
    }

    let mut clock_divide = IBRO_FREQUENCY / baud_rate;
    let clock_mod = IBRO_FREQUENCY % baud_rate;

    if clock_divide == 0 || clock_mod > (baud_rate / 2) {
        clock_divide += 1;
    }

    Ok(min(clock_divide, MAX_CLOCK_DIVISOR))
}

pub struct Serial {
    regs: Peripheral<UartRegisters>,
}

impl Serial {
    /// Sets the uart up for 8N1 at 115200 baud. Either pin may be `NC`.
    pub fn init(
        uart: Peripheral<UartRegisters>,
        tx: PinName,
        rx: PinName,
        gcr: &mut Gcr,
        gpio: &Gpio,
    ) -> Result<Self, HalError> {
        let peripheral = pinmap_merge(
            pinmap_optional(tx, &PINMAP_UART_TX)?,
            pinmap_optional(rx, &PINMAP_UART_RX)?,
        )?;

        match peripheral {
            Some(PeripheralName::Uart(index)) if index == uart.index() => (),
            Some(_) => return Err(HalError::PinmapMismatch),
            None => return Err(HalError::PinNotConnected),
        }

        let clock = PeripheralClock::uart(uart.index());

        // disable first, this is what msdk does
        gcr.reset(clock)?;
        gcr.disable_clock(clock);
        gcr.enable_ibro()?;

        pinmap_pinout_optional(tx, &PINMAP_UART_TX, gpio)?;
        pinmap_pinout_optional(rx, &PINMAP_UART_RX, gpio)?;

        gcr.enable_clock(clock);

        let mut serial = Serial { regs: uart };

        // 1 byte receive threshold before generating interrupt
        serial.regs.ctrl.modify(CTRL::RX_THD_VAL.val(1));
        serial.format(8, Parity::None, 1)?;
        serial.baud(DEFAULT_BAUD)?;

        Ok(serial)
    }

    pub fn baud(&mut self, baud_rate: u32) -> Result<(), HalError> {
        let divisor = baud_divisor(baud_rate)?;

        self.regs.osr.write(OSR::OSR.val(5));

        // select internal baud rate clock
        self.regs.ctrl.modify(CTRL::BCLKEN::CLEAR + CTRL::BCLKSRC::Clk2);
        self.regs.clkdiv.write(CLKDIV::CLKDIV.val(divisor));

        self.regs.ctrl.modify(CTRL::BCLKEN::SET);
        spin_wait(SERIAL_TIMEOUT, || self.regs.ctrl.is_set(CTRL::BCLKRDY))
    }

    pub fn format(&mut self, data_bits: u8, parity: Parity, stop_bits: u8) -> Result<(), HalError> {
        if !(5..=8).contains(&data_bits) || !(1..=2).contains(&stop_bits) {
            return Err(HalError::InvalidFormat);
        }

        let parity = match parity {
            Parity::None => CTRL::PAR_EN::CLEAR,
            Parity::Odd => CTRL::PAR_EN::SET + CTRL::PAR_EO::SET,
            Parity::Even => CTRL::PAR_EN::SET + CTRL::PAR_EO::CLEAR,
        };

        let stop = if stop_bits == 2 {
            CTRL::STOPBITS::SET
        } else {
            CTRL::STOPBITS::CLEAR
        };

        self.regs
            .ctrl
            .modify(parity + stop + CTRL::CHAR_SIZE.val(u32::from(data_bits - 5)));

        Ok(())
    }

    /// There is a byte waiting in the receive fifo.
    pub fn readable(&self) -> bool {
        !self.regs.status.is_set(STATUS::RX_EM)
    }

    /// The transmit fifo has room.
    pub fn writable(&self) -> bool {
        !self.regs.status.is_set(STATUS::TX_FULL)
    }

    pub fn putc(&self, byte: u8) -> Result<(), HalError> {
        spin_wait(SERIAL_TIMEOUT, || self.writable())?;

        self.regs.fifo.write(FIFO::DATA.val(u32::from(byte)));
        Ok(())
    }

    /// Blocks until a byte arrives.
    pub fn getc(&self) -> u8 {
        while !self.readable() {
            core::hint::spin_loop();
        }

        self.regs.fifo.read(FIFO::DATA) as u8
    }

    pub fn write_bytes(&self, buffer: &[u8]) -> Result<(), HalError> {
        for byte in buffer {
            if *byte == b'\n' {
                self.putc(b'\r')?;
            }

            self.putc(*byte)?;
        }

        Ok(())
    }

    /// Reads bytes into `buffer` up to the end of a line, and returns the part
    /// that was filled.
    ///
    /// Every byte is echoed back; a carriage return ends the line and is
    /// stored as `\n`.
    pub fn read_line<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a [u8], HalError> {
        for i in 0..buffer.len() {
            let byte = self.getc();
            self.putc(byte)?;

            if byte == b'\r' {
                buffer[i] = b'\n';
                return Ok(&buffer[..=i]);
            }

            buffer[i] = byte;
        }

        Ok(buffer)
    }

    /// Drops everything in the receive fifo.
    pub fn flush_rx(&self) -> Result<(), HalError> {
        self.regs.ctrl.modify(CTRL::RX_FLUSH::SET);

        spin_wait(SERIAL_TIMEOUT, || !self.readable())
    }

    pub fn free(self, gcr: &mut Gcr) -> Peripheral<UartRegisters> {
        self.regs.ctrl.modify(CTRL::BCLKEN::CLEAR);
        gcr.disable_clock(PeripheralClock::uart(self.regs.index()));
        self.regs
    }
}

impl Write for Serial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

// The uart uses just atomic reads and writes to addresses, so no unsafety will be caused
// The only issue is it may be possible for characters to be skipped printing
// (if for example the is txfifo not full returns true but then someone else fills it)
unsafe impl Sync for Serial {}

/// Makes `serial` the target of the `uprint` family of macros.
///
/// Hands the serial back if a target was already installed.
pub fn init_stdio(serial: Serial) -> Result<(), Serial> {
    STDIO.set(serial)
}

// new type required for write because write requires mutable reference
struct StdioWriter(&'static Serial);

impl Write for StdioWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[doc(hidden)]
pub fn _uprint(args: fmt::Arguments) {
    if let Some(serial) = STDIO.get() {
        // a stuck transmitter drops the message, logging has nowhere to report it
        let _ = StdioWriter(serial).write_fmt(args);
    }
}

/// Prints to the stdio uart
#[macro_export]
macro_rules! uprint {
    ($($arg:tt)*) => ($crate::serial::_uprint(format_args!($($arg)*)));
}

/// Prints to the stdio uart
#[macro_export]
macro_rules! uprintln {
    () => ($crate::uprint!("\n"));
    ($($arg:tt)*) => ($crate::uprint!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprint_debug {
    ($($arg:tt)*) => ($crate::uprint!("[debug] {}", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprintln_debug {
    ($($arg:tt)*) => ($crate::uprint_debug!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprint_info {
    ($($arg:tt)*) => ($crate::uprint!("[info] {}", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprintln_info {
    ($($arg:tt)*) => ($crate::uprint_info!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprint_error {
    ($($arg:tt)*) => ($crate::uprint!("[error] {}", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! uprintln_error {
    ($($arg:tt)*) => ($crate::uprint_error!("{}\n", format_args!($($arg)*)));
}
