//! True random number generator registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const TRNG_BASE: usize = 0x4004_d000;

register_structs! {
    pub TrngRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x008 => pub data: ReadOnly<u32>),
        (0x00c => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        RND_IE OFFSET(1) NUMBITS(1) [],
        KEYGEN OFFSET(3) NUMBITS(1) []
    ],
    pub STATUS [
        RDY OFFSET(0) NUMBITS(1) []
    ]
];
