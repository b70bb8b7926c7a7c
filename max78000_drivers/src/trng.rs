use core::mem::size_of;
use core::num::NonZeroU32;

use max78000_regs::tock_registers::interfaces::Readable;
use max78000_regs::trng::{TrngRegisters, STATUS};
use max78000_regs::Peripheral;
use rand_core::{CryptoRng, RngCore};

use crate::gcr::{Gcr, PeripheralClock};
use crate::{spin_wait, HalError};

const TRNG_TIMEOUT: u32 = 100_000;

/// Error code reported through `RngCore::try_fill_bytes` when no entropy arrives.
pub const TIMEOUT_CODE: NonZeroU32 = match NonZeroU32::new(rand_core::Error::CUSTOM_START) {
    Some(code) => code,
    None => panic!("custom error codes start above zero"),
};

pub struct Trng {
    regs: Peripheral<TrngRegisters>,
}

impl Trng {
    pub fn new(trng: Peripheral<TrngRegisters>, gcr: &mut Gcr) -> Self {
        gcr.enable_clock(PeripheralClock::Trng);

        Trng { regs: trng }
    }

    fn is_ready(&self) -> bool {
        self.regs.status.is_set(STATUS::RDY)
    }

    /// Next 32 random bits, or `Timeout` if the generator never becomes ready.
    pub fn next_u32(&mut self) -> Result<u32, HalError> {
        spin_wait(TRNG_TIMEOUT, || self.is_ready())?;

        Ok(self.regs.data.get())
    }

    /// Fills `data`, returning the number of bytes written.
    pub fn get_bytes(&mut self, data: &mut [u8]) -> Result<usize, HalError> {
        for chunk in data.chunks_mut(size_of::<u32>()) {
            let n = self.next_u32()?;
            chunk.copy_from_slice(&n.to_be_bytes()[..chunk.len()]);
        }

        Ok(data.len())
    }

    pub fn free(self, gcr: &mut Gcr) -> Peripheral<TrngRegisters> {
        gcr.disable_clock(PeripheralClock::Trng);
        self.regs
    }
}

impl RngCore for Trng {
    /// Blocks until the generator has a word ready.
    fn next_u32(&mut self) -> u32 {
        while !self.is_ready() {
            core::hint::spin_loop();
        }

        self.regs.data.get()
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.get_bytes(dest)
            .map(|_| ())
            .map_err(|_| rand_core::Error::from(TIMEOUT_CODE))
    }
}

impl CryptoRng for Trng {}
