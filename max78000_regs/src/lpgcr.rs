//! Low power global control registers, for peripherals in the always-on domain.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

pub const LPGCR_BASE: usize = 0x4008_0000;

register_structs! {
    pub LpgcrRegisters {
        (0x000 => _reserved0),
        (0x008 => pub rst: ReadWrite<u32, LP_PERIPH::Register>),
        (0x00c => pub pclkdis: ReadWrite<u32, LP_PERIPH::Register>),
        (0x010 => @END),
    }
}

register_bitfields![u32,
    /// Shared by the reset and clock gate registers.
    pub LP_PERIPH [
        GPIO2 OFFSET(0) NUMBITS(1) [],
        WDT1 OFFSET(1) NUMBITS(1) [],
        TMR4 OFFSET(2) NUMBITS(1) [],
        TMR5 OFFSET(3) NUMBITS(1) [],
        UART3 OFFSET(4) NUMBITS(1) [],
        LPCOMP OFFSET(6) NUMBITS(1) []
    ]
];
