//! Register blocks backed by ordinary memory, so drivers can run on the host.
//!
//! Unless a test installs a model with [`emulate`], nothing plays the part of
//! the hardware: bits the silicon would clear stay set, and status registers
//! only change when a test pokes them.

use core::cell::RefCell;
use core::mem::size_of;
use core::ptr;

use max78000_regs::{Peripheral, StaticRef};

std::thread_local! {
    static HARDWARE: RefCell<Option<Box<dyn FnMut()>>> = RefCell::new(None);
}

/// Leaks a zeroed block big enough for `T`.
pub fn ram_block<T>() -> StaticRef<T> {
    let words = size_of::<T>().div_ceil(size_of::<u32>());
    let memory: &'static mut [u32] = Box::leak(vec![0u32; words].into_boxed_slice());
    let base = memory.as_mut_ptr();

    // poke and peek find their way back to this memory by address
    let _ = base.expose_provenance();

    // safety: the memory is zeroed, word aligned, big enough and never freed,
    // and every register block is plain integers
    unsafe { StaticRef::new(base as *const T) }
}

/// Same as [`ram_block`], wrapped up as instance `index` of a peripheral.
pub fn ram_peripheral<T>(index: u8) -> Peripheral<T> {
    // safety: the block was just allocated, nothing else refers to it
    unsafe { Peripheral::new(ram_block(), index) }
}

fn address_of<R>(register: &R) -> usize {
    ptr::from_ref(register).addr()
}

/// Overwrites a register, including read only and write only ones.
pub fn poke<R>(register: &R, value: u32) {
    let cell = ptr::with_exposed_provenance_mut::<u32>(address_of(register));

    // safety: every register here is a 32 bit cell in memory leaked by
    // ram_block, whose provenance was exposed there
    unsafe { ptr::write_volatile(cell, value) }
}

/// Reads a register back, including write only ones.
pub fn peek<R>(register: &R) -> u32 {
    let cell = ptr::with_exposed_provenance::<u32>(address_of(register));

    // safety: as for poke
    unsafe { ptr::read_volatile(cell) }
}

/// Keeps the model installed by [`emulate`] running until dropped.
#[must_use]
pub struct Emulation;

impl Drop for Emulation {
    fn drop(&mut self) {
        HARDWARE.with(|hardware| hardware.borrow_mut().take());
    }
}

/// Runs `model` on every poll of a bounded wait on this thread, standing in
/// for whatever the silicon would do in the meantime.
pub fn emulate(model: impl FnMut() + 'static) -> Emulation {
    HARDWARE.with(|hardware| *hardware.borrow_mut() = Some(Box::new(model)));
    Emulation
}

/// One tick of the model installed by [`emulate`], if any.
pub(crate) fn step_hardware() {
    HARDWARE.with(|hardware| {
        if let Some(model) = hardware.borrow_mut().as_mut() {
            model();
        }
    });
}

/// Clock control over ram, every reset in it times out.
pub fn gcr() -> crate::Gcr {
    crate::Gcr::new(ram_peripheral(0), ram_peripheral(0))
}

/// All three gpio ports over ram.
pub fn gpio() -> crate::Gpio {
    crate::Gpio::new(ram_peripheral(0), ram_peripheral(1), ram_peripheral(2), &mut gcr())
}

#[cfg(test)]
mod tests {
    use max78000_regs::tock_registers::interfaces::{Readable, Writeable};
    use max78000_regs::tock_registers::registers::{ReadOnly, ReadWrite};
    use max78000_regs::tock_registers::register_structs;

    use super::*;

    register_structs! {
        Block {
            (0x0 => status: ReadOnly<u32>),
            (0x4 => data: ReadWrite<u32>),
            (0x8 => @END),
        }
    }

    #[test]
    fn poke_reaches_read_only_registers() {
        let block = ram_block::<Block>();

        poke(&block.status, 0x8000_0001);
        assert_eq!(block.status.get(), 0x8000_0001);
        assert_eq!(block.data.get(), 0);

        block.data.set(7);
        assert_eq!(peek(&block.data), 7);
    }

    #[test]
    fn model_runs_on_every_poll() {
        let block = ram_block::<Block>();

        let model = emulate(move || poke(&block.status, block.status.get() + 1));
        assert_eq!(crate::spin_wait(10, || block.status.get() == 3), Ok(()));
        assert_eq!(block.status.get(), 3);

        drop(model);
        assert_eq!(crate::spin_wait(10, || block.status.get() == 4), Err(crate::HalError::Timeout));
    }
}
