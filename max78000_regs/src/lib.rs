//! Register maps for the MAX78000.
//!
//! Each module overlays one peripheral's register block with `tock-registers`
//! types. Offsets are checked against the datasheet layout at compile time by
//! `register_structs!`. Only the blocks used by the drivers are described here;
//! the full family map is generated from the vendor SVD and is not reproduced.
#![cfg_attr(not(test), no_std)]

use core::marker::PhantomData;
use core::ops::Deref;

pub mod adc;
pub mod flc;
pub mod gcr;
pub mod gpio;
pub mod i2c;
pub mod lpgcr;
pub mod spi;
pub mod tmr;
pub mod trng;
pub mod uart;

pub use tock_registers;

/// Number of priority bits implemented by the NVIC.
pub const NVIC_PRIO_BITS: u8 = 3;

/// A pointer to a statically allocated register block.
///
/// Dereferencing is safe because the constructor requires the pointer to stay
/// valid for the whole program.
#[derive(Debug)]
pub struct StaticRef<T> {
    ptr: *const T,
}

impl<T> StaticRef<T> {
    /// Create a new `StaticRef` from a raw pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be aligned, non-null, and point at memory that is valid as a
    /// `T` for the rest of the program.
    pub const unsafe fn new(ptr: *const T) -> StaticRef<T> {
        StaticRef { ptr }
    }

    /// Address of the register block.
    pub fn addr(&self) -> usize {
        self.ptr as usize
    }
}

impl<T> Clone for StaticRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StaticRef<T> {}

impl<T> Deref for StaticRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // safety: `new` requires the pointer to be valid for 'static
        unsafe { &*self.ptr }
    }
}

// The blocks are memory mapped io at fixed addresses, not owned memory.
unsafe impl<T> Send for StaticRef<T> {}

/// Exclusive handle to one instance of a peripheral.
///
/// `index` is the instance number within its kind, so `I2C1` has index 1.
#[derive(Debug)]
pub struct Peripheral<T> {
    regs: StaticRef<T>,
    index: u8,
}

impl<T> Peripheral<T> {
    /// Creates a handle to the register block.
    ///
    /// # Safety
    ///
    /// No other handle to the same block may exist.
    pub const unsafe fn new(regs: StaticRef<T>, index: u8) -> Self {
        Peripheral { regs, index }
    }

    /// Shared pointer to the registers, for code that outlives the handle
    /// (interrupt handlers).
    pub fn regs(&self) -> StaticRef<T> {
        self.regs
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl<T> Deref for Peripheral<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.regs
    }
}

macro_rules! peripherals {
    ($($(#[$attr:meta])* $field:ident: $block:ty = $base:expr, $index:expr;)*) => {
        /// All peripherals described by this crate.
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(
                $(#[$attr])*
                pub $field: Peripheral<$block>,
            )*
            _marker: PhantomData<*const ()>,
        }

        impl Peripherals {
            /// Unchecked version of `Peripherals::take`.
            ///
            /// # Safety
            ///
            /// Every handle returned aliases any handle handed out before.
            pub unsafe fn steal() -> Self {
                DEVICE_PERIPHERALS = true;

                Peripherals {
                    $(
                        $field: Peripheral::new(StaticRef::new($base as *const $block), $index),
                    )*
                    _marker: PhantomData,
                }
            }
        }
    };
}

peripherals! {
    /// Global control.
    GCR: gcr::GcrRegisters = gcr::GCR_BASE, 0;
    /// Low power global control.
    LPGCR: lpgcr::LpgcrRegisters = lpgcr::LPGCR_BASE, 0;
    GPIO0: gpio::GpioRegisters = gpio::GPIO0_BASE, 0;
    GPIO1: gpio::GpioRegisters = gpio::GPIO1_BASE, 1;
    GPIO2: gpio::GpioRegisters = gpio::GPIO2_BASE, 2;
    I2C0: i2c::I2cRegisters = i2c::I2C0_BASE, 0;
    I2C1: i2c::I2cRegisters = i2c::I2C1_BASE, 1;
    I2C2: i2c::I2cRegisters = i2c::I2C2_BASE, 2;
    SPI0: spi::SpiRegisters = spi::SPI0_BASE, 0;
    SPI1: spi::SpiRegisters = spi::SPI1_BASE, 1;
    TMR0: tmr::TmrRegisters = tmr::TMR0_BASE, 0;
    TMR1: tmr::TmrRegisters = tmr::TMR1_BASE, 1;
    TMR2: tmr::TmrRegisters = tmr::TMR2_BASE, 2;
    TMR3: tmr::TmrRegisters = tmr::TMR3_BASE, 3;
    /// Low power timer.
    TMR4: tmr::TmrRegisters = tmr::TMR4_BASE, 4;
    /// Low power timer.
    TMR5: tmr::TmrRegisters = tmr::TMR5_BASE, 5;
    ADC: adc::AdcRegisters = adc::ADC_BASE, 0;
    UART0: uart::UartRegisters = uart::UART0_BASE, 0;
    UART1: uart::UartRegisters = uart::UART1_BASE, 1;
    UART2: uart::UartRegisters = uart::UART2_BASE, 2;
    /// Flash controller.
    FLC: flc::FlcRegisters = flc::FLC_BASE, 0;
    TRNG: trng::TrngRegisters = trng::TRNG_BASE, 0;
}

// set once the peripherals have been handed out
#[no_mangle]
static mut DEVICE_PERIPHERALS: bool = false;

impl Peripherals {
    /// Returns all the peripherals, once.
    #[cfg(feature = "critical-section")]
    #[inline]
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            // safety: the critical section serializes access to DEVICE_PERIPHERALS
            if unsafe { DEVICE_PERIPHERALS } {
                None
            } else {
                // safety: this is the first and only time the peripherals are created
                Some(unsafe { Peripherals::steal() })
            }
        })
    }
}

/// Interrupt numbers of the device, as wired into the NVIC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Interrupt {
    /// 0 - Power fail
    PF = 0,
    /// 1 - Watchdog timer 0
    WDT0 = 1,
    /// 3 - Real-time clock
    RTC = 3,
    /// 4 - True random number generator
    TRNG = 4,
    /// 5 - Timer 0
    TMR0 = 5,
    /// 6 - Timer 1
    TMR1 = 6,
    /// 7 - Timer 2
    TMR2 = 7,
    /// 8 - Timer 3
    TMR3 = 8,
    /// 9 - Timer 4 (low power)
    TMR4 = 9,
    /// 10 - Timer 5 (low power)
    TMR5 = 10,
    /// 13 - I2C 0
    I2C0 = 13,
    /// 14 - UART 0
    UART0 = 14,
    /// 15 - UART 1
    UART1 = 15,
    /// 16 - SPI 1
    SPI1 = 16,
    /// 20 - Analog to digital converter
    ADC = 20,
    /// 23 - Flash controller
    FLC0 = 23,
    /// 24 - GPIO port 0
    GPIO0 = 24,
    /// 25 - GPIO port 1
    GPIO1 = 25,
    /// 26 - GPIO port 2
    GPIO2 = 26,
    /// 28 - DMA channel 0
    DMA0 = 28,
    /// 29 - DMA channel 1
    DMA1 = 29,
    /// 30 - DMA channel 2
    DMA2 = 30,
    /// 31 - DMA channel 3
    DMA3 = 31,
    /// 34 - UART 2
    UART2 = 34,
    /// 36 - I2C 1
    I2C1 = 36,
    /// 54 - Wakeup timer
    WUT = 54,
    /// 56 - SPI 0
    SPI0 = 56,
    /// 57 - Watchdog timer 1
    WDT1 = 57,
    /// 62 - I2C 2
    I2C2 = 62,
}

// safety: every variant is a valid irq number of the device
unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

pub use self::Interrupt as interrupt;

#[cfg(feature = "rt")]
pub use cortex_m_rt::interrupt;

#[cfg(feature = "rt")]
extern "C" {
    fn PF();
    fn WDT0();
    fn RTC();
    fn TRNG();
    fn TMR0();
    fn TMR1();
    fn TMR2();
    fn TMR3();
    fn TMR4();
    fn TMR5();
    fn I2C0();
    fn UART0();
    fn UART1();
    fn SPI1();
    fn ADC();
    fn FLC0();
    fn GPIO0();
    fn GPIO1();
    fn GPIO2();
    fn DMA0();
    fn DMA1();
    fn DMA2();
    fn DMA3();
    fn UART2();
    fn I2C1();
    fn WUT();
    fn SPI0();
    fn WDT1();
    fn I2C2();
}

#[doc(hidden)]
#[repr(C)]
pub union Vector {
    _handler: unsafe extern "C" fn(),
    _reserved: u32,
}

#[cfg(feature = "rt")]
#[doc(hidden)]
#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [Vector; 63] = [
    Vector { _handler: PF },
    Vector { _handler: WDT0 },
    Vector { _reserved: 0 },
    Vector { _handler: RTC },
    Vector { _handler: TRNG },
    Vector { _handler: TMR0 },
    Vector { _handler: TMR1 },
    Vector { _handler: TMR2 },
    Vector { _handler: TMR3 },
    Vector { _handler: TMR4 },
    Vector { _handler: TMR5 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: I2C0 },
    Vector { _handler: UART0 },
    Vector { _handler: UART1 },
    Vector { _handler: SPI1 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: ADC },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: FLC0 },
    Vector { _handler: GPIO0 },
    Vector { _handler: GPIO1 },
    Vector { _handler: GPIO2 },
    Vector { _reserved: 0 },
    Vector { _handler: DMA0 },
    Vector { _handler: DMA1 },
    Vector { _handler: DMA2 },
    Vector { _handler: DMA3 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: UART2 },
    Vector { _reserved: 0 },
    Vector { _handler: I2C1 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: WUT },
    Vector { _reserved: 0 },
    Vector { _handler: SPI0 },
    Vector { _handler: WDT1 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _reserved: 0 },
    Vector { _handler: I2C2 },
];
