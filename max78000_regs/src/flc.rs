//! Flash controller registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const FLC_BASE: usize = 0x4002_9000;

register_structs! {
    pub FlcRegisters {
        (0x000 => pub addr: ReadWrite<u32>),
        /// Divides the system clock down to the 1 MHz flash clock
        (0x004 => pub clkdiv: ReadWrite<u32, CLKDIV::Register>),
        (0x008 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x00c => _reserved0),
        (0x024 => pub intr: ReadWrite<u32, INTR::Register>),
        (0x028 => pub eccdata: ReadOnly<u32>),
        (0x02c => _reserved1),
        /// 128 bit write buffer
        (0x030 => pub data: [ReadWrite<u32>; 4]),
        (0x040 => pub actrl: ReadWrite<u32>),
        (0x044 => _reserved2),
        (0x080 => pub welr0: ReadWrite<u32>),
        (0x084 => _reserved3),
        (0x088 => pub welr1: ReadWrite<u32>),
        (0x08c => _reserved4),
        (0x090 => pub rlr0: ReadWrite<u32>),
        (0x094 => _reserved5),
        (0x098 => pub rlr1: ReadWrite<u32>),
        (0x09c => @END),
    }
}

register_bitfields![u32,
    pub CLKDIV [
        CLKDIV OFFSET(0) NUMBITS(8) []
    ],
    pub CTRL [
        /// Start a write, cleared by hardware
        WR OFFSET(0) NUMBITS(1) [],
        /// Start a mass erase, cleared by hardware
        ME OFFSET(1) NUMBITS(1) [],
        /// Start a page erase, cleared by hardware
        PGE OFFSET(2) NUMBITS(1) [],
        ERASE_CODE OFFSET(8) NUMBITS(8) [
            Nop = 0x00,
            ErasePage = 0x55,
            EraseAll = 0xaa
        ],
        PEND OFFSET(24) NUMBITS(1) [],
        LVE OFFSET(25) NUMBITS(1) [],
        UNLOCK OFFSET(28) NUMBITS(4) [
            Unlocked = 2,
            Locked = 3
        ]
    ],
    pub INTR [
        DONE OFFSET(0) NUMBITS(1) [],
        /// Access fault
        AF OFFSET(1) NUMBITS(1) [],
        DONEIE OFFSET(8) NUMBITS(1) [],
        AFIE OFFSET(9) NUMBITS(1) []
    ]
];
