//! Blocking SPI master, exchanging one frame at a time.

use max78000_regs::spi::{SpiRegisters, CLKCTRL, CTRL0, CTRL1, CTRL2, DMA, INT, STAT};
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::Peripheral;

use crate::gcr::{Gcr, PeripheralClock};
use crate::gpio::Gpio;
use crate::pinmap::{
    pinmap_merge, pinmap_optional, pinmap_peripheral, pinmap_pinout, pinmap_pinout_optional,
    PeripheralName, PinName, PINMAP_SPI_MISO, PINMAP_SPI_MOSI, PINMAP_SPI_SCLK, PINMAP_SPI_SSEL,
};
use crate::{spin_wait, HalError};

/// Polls of the receive fifo level before a frame is given up on.
pub const SPI_TIMEOUT: u32 = 100_000;

pub const DEFAULT_FREQUENCY: u32 = 1_000_000;

const MAX_SCALE: u32 = 8;
// hi and lo are 8 bit counters
const MAX_TICKS: u64 = 2 * 255;

/// Splits a serial clock period into (hi, lo, scale), so that
/// `pclk / 2^scale / (hi + lo)` is the fastest rate not above `hz`.
fn clock_divider(peripheral_clock: u32, hz: u32) -> Result<(u8, u8, u8), HalError> {
    if hz == 0 {
        return Err(HalError::InvalidFrequency);
    }

    let mut scale = 0;
    let mut ticks = u64::from(peripheral_clock).div_ceil(u64::from(hz));

    while ticks > MAX_TICKS {
        scale += 1;
        if scale > MAX_SCALE {
            return Err(HalError::InvalidFrequency);
        }

        ticks = u64::from(peripheral_clock).div_ceil(u64::from(hz) << scale);
    }

    if ticks < 2 {
        return Err(HalError::InvalidFrequency);
    }

    let hi = ticks / 2;
    let lo = ticks - hi;

    Ok((hi as u8, lo as u8, scale as u8))
}

pub struct Spi {
    regs: Peripheral<SpiRegisters>,
    peripheral_clock: u32,
    /// Bits per frame.
    bits: u8,
}

impl Spi {
    /// Sets up the controller behind the pins as a master, 8 bit frames in
    /// mode 0 at [`DEFAULT_FREQUENCY`].
    ///
    /// Any pin but `sclk` can be `NC`.
    pub fn init(
        spi: Peripheral<SpiRegisters>,
        mosi: PinName,
        miso: PinName,
        sclk: PinName,
        ssel: PinName,
        gcr: &mut Gcr,
        gpio: &Gpio,
    ) -> Result<Self, HalError> {
        let sclk_peripheral = pinmap_peripheral(sclk, &PINMAP_SPI_SCLK)?;

        let mut peripheral = Some(sclk_peripheral);
        peripheral = pinmap_merge(peripheral, pinmap_optional(mosi, &PINMAP_SPI_MOSI)?)?;
        peripheral = pinmap_merge(peripheral, pinmap_optional(miso, &PINMAP_SPI_MISO)?)?;
        peripheral = pinmap_merge(peripheral, pinmap_optional(ssel, &PINMAP_SPI_SSEL)?)?;

        if peripheral != Some(PeripheralName::Spi(spi.index())) {
            return Err(HalError::PinmapMismatch);
        }

        let clock = PeripheralClock::spi(spi.index());
        gcr.disable_clock(clock);
        gcr.reset(clock)?;
        gcr.enable_clock(clock);

        pinmap_pinout(sclk, &PINMAP_SPI_SCLK, gpio)?;
        pinmap_pinout_optional(mosi, &PINMAP_SPI_MOSI, gpio)?;
        pinmap_pinout_optional(miso, &PINMAP_SPI_MISO, gpio)?;
        pinmap_pinout_optional(ssel, &PINMAP_SPI_SSEL, gpio)?;

        let mut spi = Spi {
            regs: spi,
            peripheral_clock: gcr.peripheral_clock_frequency()?,
            bits: 8,
        };

        spi.regs.ctrl0.write(CTRL0::MST_MODE::SET);
        if ssel.is_connected() {
            spi.regs.ctrl0.modify(CTRL0::SS_IO::SET + CTRL0::SS_ACTIVE.val(1));
        }

        spi.regs.dma.write(
            DMA::TX_FIFO_EN::SET + DMA::RX_FIFO_EN::SET + DMA::TX_FLUSH::SET + DMA::RX_FLUSH::SET,
        );

        spi.format(8, 0, false)?;
        spi.frequency(DEFAULT_FREQUENCY)?;

        spi.regs.ctrl0.modify(CTRL0::EN::SET);

        Ok(spi)
    }

    /// Sets frames of `bits` bits in clock `mode` 0 to 3.
    ///
    /// Only master mode is supported.
    pub fn format(&mut self, bits: u8, mode: u8, slave: bool) -> Result<(), HalError> {
        if slave || !(2..=16).contains(&bits) || mode > 3 {
            return Err(HalError::InvalidFormat);
        }

        // 16 bits wraps to 0 in the 4 bit field
        let numbits = u32::from(bits) & 0xf;

        self.regs.ctrl2.write(
            CTRL2::CLKPHA.val(u32::from(mode & 1))
                + CTRL2::CLKPOL.val(u32::from(mode >> 1))
                + CTRL2::NUMBITS.val(numbits)
                + CTRL2::DATA_WIDTH::Mono,
        );
        self.bits = bits;

        Ok(())
    }

    /// Sets the fastest serial clock not above `hz`.
    pub fn frequency(&mut self, hz: u32) -> Result<(), HalError> {
        let (hi, lo, scale) = clock_divider(self.peripheral_clock, hz)?;

        self.regs.clkctrl.write(
            CLKCTRL::HI.val(hi.into()) + CLKCTRL::LO.val(lo.into()) + CLKCTRL::CLKDIV.val(scale.into()),
        );

        Ok(())
    }

    fn frame_mask(&self) -> u16 {
        u16::MAX >> (16 - self.bits)
    }

    fn bytes_per_frame(&self) -> u32 {
        if self.bits > 8 {
            2
        } else {
            1
        }
    }

    /// Sends one frame and returns the frame clocked in meanwhile.
    pub fn master_write(&mut self, value: u16) -> Result<u16, HalError> {
        let value = value & self.frame_mask();

        self.regs
            .ctrl1
            .write(CTRL1::TX_NUM_CHAR.val(1) + CTRL1::RX_NUM_CHAR.val(1));

        if self.bits > 8 {
            self.regs.fifo16().set(value);
        } else {
            self.regs.fifo8().set(value as u8);
        }

        self.regs.ctrl0.modify(CTRL0::START::SET);

        let frame_len = self.bytes_per_frame();
        if let Err(err) = spin_wait(SPI_TIMEOUT, || self.regs.dma.read(DMA::RX_LVL) >= frame_len) {
            crate::uprintln_debug!("spi{}: no frame received", self.regs.index());
            return Err(err);
        }

        let received = if self.bits > 8 {
            self.regs.fifo16().get()
        } else {
            self.regs.fifo8().get().into()
        };

        self.regs.intfl.write(INT::MST_DONE::SET);

        Ok(received & self.frame_mask())
    }

    /// Exchanges `max(tx.len(), rx.len())` frames.
    ///
    /// Sends `fill` once `tx` runs out and drops what arrives once `rx` is full.
    pub fn block_write(&mut self, tx: &[u8], rx: &mut [u8], fill: u8) -> Result<usize, HalError> {
        let total = tx.len().max(rx.len());

        for i in 0..total {
            let out = tx.get(i).copied().unwrap_or(fill);
            let received = self.master_write(out.into())?;

            if let Some(slot) = rx.get_mut(i) {
                *slot = received as u8;
            }
        }

        Ok(total)
    }

    pub fn busy(&self) -> bool {
        self.regs.stat.is_set(STAT::BUSY)
    }

    /// Turns the controller off and hands back its registers.
    pub fn free(self) -> Peripheral<SpiRegisters> {
        self.regs.ctrl0.modify(CTRL0::EN::CLEAR);
        self.regs
    }
}

impl embedded_hal::spi::ErrorType for Spi {
    type Error = HalError;
}

impl embedded_hal::spi::SpiBus<u8> for Spi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.block_write(&[], words, 0xff).map(|_| ())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.block_write(words, &mut [], 0xff).map(|_| ())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.block_write(write, read, 0xff).map(|_| ())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.master_write((*word).into())? as u8;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        spin_wait(SPI_TIMEOUT, || !self.busy())
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::spi::SpiBus;

    use super::*;
    use crate::pinmap::{NC, P0_21, P0_22, P0_23, P0_5, P0_7};
    use crate::test_support::{gcr, gpio, poke, ram_peripheral};

    fn master(bits: u8) -> Spi {
        let mut spi = Spi {
            regs: ram_peripheral(1),
            peripheral_clock: 50_000_000,
            bits: 8,
        };
        spi.format(bits, 0, false).unwrap();
        spi
    }

    // in ram the fifo reads back what was written, a loopback
    fn loopback(spi: &Spi) {
        spi.regs.dma.write(DMA::RX_LVL.val(2));
    }

    #[test]
    fn clock_divider_math() {
        assert_eq!(clock_divider(50_000_000, 1_000_000), Ok((25, 25, 0)));
        assert_eq!(clock_divider(50_000_000, 3_000_000), Ok((8, 9, 0)));
        assert_eq!(clock_divider(50_000_000, 10_000), Ok((156, 157, 4)));
        assert_eq!(clock_divider(50_000_000, 25_000_000), Ok((1, 1, 0)));

        assert_eq!(clock_divider(50_000_000, 50_000_000), Err(HalError::InvalidFrequency));
        assert_eq!(clock_divider(50_000_000, 100), Err(HalError::InvalidFrequency));
        assert_eq!(clock_divider(50_000_000, 0), Err(HalError::InvalidFrequency));
    }

    #[test]
    fn divided_clock_never_exceeds_request() {
        for hz in [400_000, 1_000_000, 7_000_000, 12_500_000, 33_333] {
            let (hi, lo, scale) = clock_divider(50_000_000, hz).unwrap();
            let actual = (50_000_000 >> scale) / (u32::from(hi) + u32::from(lo));
            assert!(actual <= hz, "{actual} > {hz}");
        }
    }

    #[test]
    fn frequency_register() {
        let mut spi = master(8);
        spi.frequency(10_000).unwrap();

        assert_eq!(spi.regs.clkctrl.read(CLKCTRL::HI), 156);
        assert_eq!(spi.regs.clkctrl.read(CLKCTRL::LO), 157);
        assert_eq!(spi.regs.clkctrl.read(CLKCTRL::CLKDIV), 4);
    }

    #[test]
    fn format_register() {
        let mut spi = master(8);

        spi.format(12, 3, false).unwrap();
        assert!(spi.regs.ctrl2.is_set(CTRL2::CLKPHA));
        assert!(spi.regs.ctrl2.is_set(CTRL2::CLKPOL));
        assert_eq!(spi.regs.ctrl2.read(CTRL2::NUMBITS), 12);

        spi.format(16, 2, false).unwrap();
        assert!(!spi.regs.ctrl2.is_set(CTRL2::CLKPHA));
        assert!(spi.regs.ctrl2.is_set(CTRL2::CLKPOL));
        assert_eq!(spi.regs.ctrl2.read(CTRL2::NUMBITS), 0);

        assert_eq!(spi.format(8, 0, true), Err(HalError::InvalidFormat));
        assert_eq!(spi.format(1, 0, false), Err(HalError::InvalidFormat));
        assert_eq!(spi.format(17, 0, false), Err(HalError::InvalidFormat));
        assert_eq!(spi.format(8, 4, false), Err(HalError::InvalidFormat));
        assert_eq!(spi.bits, 16);
    }

    #[test]
    fn single_frame_exchange() {
        let mut spi = master(8);
        loopback(&spi);

        assert_eq!(spi.master_write(0xa5), Ok(0xa5));
        assert!(spi.regs.ctrl0.is_set(CTRL0::START));
        assert_eq!(spi.regs.ctrl1.read(CTRL1::TX_NUM_CHAR), 1);
        assert_eq!(spi.regs.ctrl1.read(CTRL1::RX_NUM_CHAR), 1);
    }

    #[test]
    fn wide_frames() {
        let mut spi = master(12);
        loopback(&spi);

        assert_eq!(spi.master_write(0x0abc), Ok(0x0abc));
        // bits above the frame size are not sent
        assert_eq!(spi.master_write(0xfabc), Ok(0x0abc));
    }

    #[test]
    fn missing_frame_times_out() {
        let mut spi = master(8);

        assert_eq!(spi.master_write(1), Err(HalError::Timeout));

        // a wide frame needs both bytes
        let mut spi = master(16);
        spi.regs.dma.write(DMA::RX_LVL.val(1));
        assert_eq!(spi.master_write(1), Err(HalError::Timeout));
    }

    #[test]
    fn block_write_fills_and_discards() {
        let mut spi = master(8);
        loopback(&spi);

        let mut rx = [0; 4];
        assert_eq!(spi.block_write(&[1, 2], &mut rx, 0xee), Ok(4));
        assert_eq!(rx, [1, 2, 0xee, 0xee]);

        let mut rx = [0; 1];
        assert_eq!(spi.block_write(&[3, 4, 5], &mut rx, 0xee), Ok(3));
        assert_eq!(rx, [3]);
    }

    #[test]
    fn spi_bus() {
        let mut spi = master(8);
        loopback(&spi);

        let mut words = [9, 8, 7];
        spi.transfer_in_place(&mut words).unwrap();
        assert_eq!(words, [9, 8, 7]);

        let mut read = [0; 2];
        spi.read(&mut read).unwrap();
        assert_eq!(read, [0xff, 0xff]);

        spi.flush().unwrap();
        poke(&spi.regs.stat, 1);
        assert!(spi.busy());
        assert_eq!(spi.flush(), Err(HalError::Timeout));
    }

    #[test]
    fn init_checks_pins() {
        let mut gcr = gcr();
        let gpio = gpio();

        // sclk of spi0 with mosi of spi1
        assert!(matches!(
            Spi::init(ram_peripheral(0), P0_21, NC, P0_7, NC, &mut gcr, &gpio),
            Err(HalError::PinmapMismatch)
        ));
        // spi1 pins on spi0
        assert!(matches!(
            Spi::init(ram_peripheral(0), P0_21, P0_22, P0_23, NC, &mut gcr, &gpio),
            Err(HalError::PinmapMismatch)
        ));
        assert!(matches!(
            Spi::init(ram_peripheral(0), P0_5, NC, NC, NC, &mut gcr, &gpio),
            Err(HalError::PinNotConnected)
        ));
    }

    #[test]
    fn free_disables() {
        let spi = master(8);
        spi.regs.ctrl0.write(CTRL0::EN::SET);

        let regs = spi.free();
        assert!(!regs.ctrl0.is_set(CTRL0::EN));
    }
}
