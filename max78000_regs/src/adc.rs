//! Analog to digital converter registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const ADC_BASE: usize = 0x4003_4000;

register_structs! {
    pub AdcRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x008 => pub data: ReadOnly<u32, DATA::Register>),
        (0x00c => pub intr: ReadWrite<u32, INTR::Register>),
        (0x010 => pub limit: [ReadWrite<u32>; 4]),
        (0x020 => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        /// Start a conversion, cleared by hardware
        START OFFSET(0) NUMBITS(1) [],
        PWR OFFSET(1) NUMBITS(1) [],
        REFBUF_PWR OFFSET(3) NUMBITS(1) [],
        REF_SEL OFFSET(4) NUMBITS(1) [
            Internal = 0,
            Vdd = 1
        ],
        REF_SCALE OFFSET(8) NUMBITS(1) [],
        SCALE OFFSET(9) NUMBITS(1) [],
        CLK_EN OFFSET(11) NUMBITS(1) [],
        CH_SEL OFFSET(12) NUMBITS(5) [],
        ADC_DIVSEL OFFSET(17) NUMBITS(2) [],
        DATA_ALIGN OFFSET(20) NUMBITS(1) [
            Lsb = 0,
            Msb = 1
        ]
    ],
    pub STATUS [
        ACTIVE OFFSET(0) NUMBITS(1) [],
        AFE_PWR_UP_ACTIVE OFFSET(2) NUMBITS(1) [],
        OVERFLOW OFFSET(3) NUMBITS(1) []
    ],
    pub DATA [
        DATA OFFSET(0) NUMBITS(16) []
    ],
    /// Enables in the low half, write one to clear flags in the high half.
    pub INTR [
        DONE_IE OFFSET(0) NUMBITS(1) [],
        REF_READY_IE OFFSET(1) NUMBITS(1) [],
        HI_LIMIT_IE OFFSET(2) NUMBITS(1) [],
        LO_LIMIT_IE OFFSET(3) NUMBITS(1) [],
        OVERFLOW_IE OFFSET(4) NUMBITS(1) [],
        PWR_RDY_IE OFFSET(5) NUMBITS(1) [],
        DONE_IF OFFSET(16) NUMBITS(1) [],
        REF_READY_IF OFFSET(17) NUMBITS(1) [],
        HI_LIMIT_IF OFFSET(18) NUMBITS(1) [],
        LO_LIMIT_IF OFFSET(19) NUMBITS(1) [],
        OVERFLOW_IF OFFSET(20) NUMBITS(1) [],
        PWR_RDY_IF OFFSET(21) NUMBITS(1) [],
        PENDING OFFSET(22) NUMBITS(1) []
    ]
];
