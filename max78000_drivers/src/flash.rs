use core::ptr;

use max78000_regs::flc::{FlcRegisters, CLKDIV, CTRL, INTR};
use max78000_regs::tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use max78000_regs::Peripheral;

use crate::gcr::Gcr;
use crate::{align_down, spin_wait, HalError};

/// Size in bytes of a flash page on the max78000 board.
pub const FLASH_PAGE_SIZE: usize = 0x2000;

/// Size of the 128 bit unit written by one flash operation.
pub const PROGRAM_UNIT: usize = 0x10;

/// Start of flash memory in address space.
pub const FLASH_BASE_ADDR: usize = 0x10000000;
/// Size of flash memory.
pub const FLASH_SIZE: usize = 0x80000;

/// Value of every byte of an erased page.
pub const ERASE_VALUE: u8 = 0xff;

// a page erase takes tens of milliseconds
const FLASH_TIMEOUT: u32 = 5_000_000;

/// Used to interact with the max78000 flash memory.
///
/// Performs various fuctionality such as writing to and clearing flash.
pub struct Flash {
    regs: Peripheral<FlcRegisters>,
    clock_divider: u32,
}

impl Flash {
    /// Creates a new Flash instance from the flash controller registers.
    pub fn new(flc: Peripheral<FlcRegisters>, gcr: &Gcr) -> Result<Self, HalError> {
        // flash controller wants a 1 MHz clock
        let clock_divider = gcr.sysclock_frequency()? / 1_000_000;

        Ok(Flash {
            regs: flc,
            clock_divider,
        })
    }

    /// Erase granularity at `address`, `None` outside flash.
    pub fn sector_size(&self, address: usize) -> Option<usize> {
        check_range(address, 1).ok().map(|_| FLASH_PAGE_SIZE)
    }

    /// Program granularity.
    pub fn page_size(&self) -> usize {
        PROGRAM_UNIT
    }

    pub fn start_address(&self) -> usize {
        FLASH_BASE_ADDR
    }

    pub fn size(&self) -> usize {
        FLASH_SIZE
    }

    pub fn erase_value(&self) -> u8 {
        ERASE_VALUE
    }

    /// Busy waits until the flash controller reports all pending operations have finished.
    fn await_not_busy(&self) -> Result<(), HalError> {
        spin_wait(FLASH_TIMEOUT, || {
            !self.regs.ctrl.is_set(CTRL::PEND)
                && !self.regs.ctrl.is_set(CTRL::WR)
                && !self.regs.ctrl.is_set(CTRL::ME)
                && !self.regs.ctrl.is_set(CTRL::PGE)
        })
    }

    /// Waits for other operations, clears old errors and unlocks the controller.
    fn start_flash_operation(&mut self) -> Result<(), HalError> {
        self.await_not_busy()?;

        // msdk sets clkdiv everytime
        self.regs.clkdiv.write(CLKDIV::CLKDIV.val(self.clock_divider));

        self.regs.intr.modify(INTR::AF::CLEAR);

        self.regs.ctrl.modify(CTRL::UNLOCK::Unlocked);

        Ok(())
    }

    /// Waits for the started operation, then locks the controller again
    /// whatever the outcome.
    fn finish_flash_operation(&mut self) -> Result<(), HalError> {
        let result = self.await_not_busy().and_then(|_| self.take_error());

        self.regs.ctrl.modify(CTRL::UNLOCK::Locked);

        match result {
            Ok(()) => Self::flush_line_fill_buffer(),
            Err(err) => crate::uprintln_debug!("flash operation failed: {}", err),
        }

        result
    }

    /// Checks if an error has occured with the flash controller, and clears the error if present.
    fn take_error(&mut self) -> Result<(), HalError> {
        if self.regs.intr.is_set(INTR::AF) {
            self.regs.intr.modify(INTR::AF::CLEAR);
            Err(HalError::Flash)
        } else {
            Ok(())
        }
    }

    fn flush_line_fill_buffer() {
        // safety: both addresses are inside flash, which is always readable
        // perform 2 reads from different pages to flush line fill buffer
        unsafe {
            let _ = ptr::read_volatile(FLASH_BASE_ADDR as *const u32);
            let _ = ptr::read_volatile((FLASH_BASE_ADDR + FLASH_PAGE_SIZE) as *const u32);
        }
    }

    /// Set address to perform next flash operation on.
    fn set_address(&mut self, address: usize) {
        // convert address so that 0 is the start of flash memory
        let flash_address = address - FLASH_BASE_ADDR;

        self.regs.addr.set(flash_address as u32);
    }

    /// Erases the page at the given address.
    ///
    /// # Safety
    ///
    /// Must not erase any page with executable code, or any page that a refrence currently points to.
    pub unsafe fn erase_sector(&mut self, address: usize) -> Result<(), HalError> {
        check_range(address, FLASH_PAGE_SIZE)?;
        if align_down(address, FLASH_PAGE_SIZE) != address {
            return Err(HalError::InvalidAddress);
        }

        self.start_flash_operation()?;
        self.set_address(address);

        self.regs.ctrl.modify(CTRL::ERASE_CODE::ErasePage);
        self.regs.ctrl.modify(CTRL::PGE::SET);

        self.finish_flash_operation()
    }

    /// Writes 16 bytes of data to a 16 byte aligned address.
    unsafe fn write16(&mut self, address: usize, data: &[u8; PROGRAM_UNIT]) -> Result<(), HalError> {
        self.start_flash_operation()?;
        self.set_address(address);

        for (register, word) in self.regs.data.iter().zip(data.chunks_exact(4)) {
            register.set(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }

        self.regs.ctrl.modify(CTRL::WR::SET);

        self.finish_flash_operation()
    }

    /// Writes `data` starting at a 16 byte aligned address.
    ///
    /// A trailing partial unit is padded with the erase value, so the flash
    /// after the data is left as it was.
    ///
    /// # Safety
    ///
    /// Must not write to any bytes with executable code, or any bytes that a refrence currently points to.
    pub unsafe fn program_page(&mut self, address: usize, data: &[u8]) -> Result<(), HalError> {
        check_range(address, data.len())?;
        if align_down(address, PROGRAM_UNIT) != address {
            return Err(HalError::InvalidAddress);
        }

        for (i, chunk) in data.chunks(PROGRAM_UNIT).enumerate() {
            let mut unit = [ERASE_VALUE; PROGRAM_UNIT];
            unit[..chunk.len()].copy_from_slice(chunk);

            self.write16(address + PROGRAM_UNIT * i, &unit)?;
        }

        Ok(())
    }

    /// Blocks writes and erases of the page at `page_address` until the next reset.
    pub fn lock_page(&mut self, page_address: usize) -> Result<(), HalError> {
        check_range(page_address, FLASH_PAGE_SIZE)?;
        if align_down(page_address, FLASH_PAGE_SIZE) != page_address {
            return Err(HalError::InvalidAddress);
        }

        // device has 64 flash pages
        let page_number = (page_address - FLASH_BASE_ADDR) / FLASH_PAGE_SIZE;

        // flash lock registers have 2 32 bit registers, 1 for first 32 pages, 1 for next 32 pages
        // least significant bit of each register is lowest page, then next bit next page, and so on
        let flash_lock_bit = 1u32 << (page_number % 32);

        if page_number < 32 {
            self.regs.welr0.set(flash_lock_bit);
        } else {
            self.regs.welr1.set(flash_lock_bit);
        }

        Ok(())
    }
}

/// Checks `len` bytes from `address` all lie in flash.
fn check_range(address: usize, len: usize) -> Result<(), HalError> {
    let end = address.checked_add(len).ok_or(HalError::InvalidAddress)?;

    if address >= FLASH_BASE_ADDR && end <= FLASH_BASE_ADDR + FLASH_SIZE {
        Ok(())
    } else {
        Err(HalError::InvalidAddress)
    }
}
