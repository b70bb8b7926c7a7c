//! 32 bit timer registers. The a and b halves only run independently when
//! cascade is off; the drivers use the timer as a single 32 bit counter
//! driven through the a fields.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

pub const TMR0_BASE: usize = 0x4001_0000;
pub const TMR1_BASE: usize = 0x4001_1000;
pub const TMR2_BASE: usize = 0x4001_2000;
pub const TMR3_BASE: usize = 0x4001_3000;
pub const TMR4_BASE: usize = 0x4008_0c00;
pub const TMR5_BASE: usize = 0x4008_1000;

register_structs! {
    pub TmrRegisters {
        (0x000 => pub cnt: ReadWrite<u32>),
        (0x004 => pub cmp: ReadWrite<u32>),
        (0x008 => pub pwm: ReadWrite<u32>),
        (0x00c => pub intfl: ReadWrite<u32, INTFL::Register>),
        (0x010 => pub ctrl0: ReadWrite<u32, CTRL0::Register>),
        (0x014 => pub nolcmp: ReadWrite<u32>),
        (0x018 => pub ctrl1: ReadWrite<u32, CTRL1::Register>),
        (0x01c => pub wkfl: ReadWrite<u32>),
        (0x020 => @END),
    }
}

register_bitfields![u32,
    pub INTFL [
        IRQ_A OFFSET(0) NUMBITS(1) [],
        WRDONE_A OFFSET(8) NUMBITS(1) [],
        WR_DIS_A OFFSET(9) NUMBITS(1) [],
        IRQ_B OFFSET(16) NUMBITS(1) [],
        WRDONE_B OFFSET(24) NUMBITS(1) []
    ],
    pub CTRL0 [
        MODE_A OFFSET(0) NUMBITS(4) [
            OneShot = 0,
            Continuous = 1,
            Counter = 2,
            Pwm = 3,
            Capture = 4,
            Compare = 5,
            Gated = 6,
            CaptureCompare = 7,
            DualEdge = 8
        ],
        /// Prescaler, the counter ticks at the source clock / 2^CLKDIV_A
        CLKDIV_A OFFSET(4) NUMBITS(4) [],
        POL_A OFFSET(8) NUMBITS(1) [],
        PWMSYNC_A OFFSET(9) NUMBITS(1) [],
        NOLHPOL_A OFFSET(10) NUMBITS(1) [],
        NOLLPOL_A OFFSET(11) NUMBITS(1) [],
        PWMCKBD_A OFFSET(12) NUMBITS(1) [],
        RST_A OFFSET(13) NUMBITS(1) [],
        CLKEN_A OFFSET(14) NUMBITS(1) [],
        EN_A OFFSET(15) NUMBITS(1) [],
        MODE_B OFFSET(16) NUMBITS(4) [],
        CLKDIV_B OFFSET(20) NUMBITS(4) [],
        POL_B OFFSET(24) NUMBITS(1) [],
        RST_B OFFSET(29) NUMBITS(1) [],
        CLKEN_B OFFSET(30) NUMBITS(1) [],
        EN_B OFFSET(31) NUMBITS(1) []
    ],
    pub CTRL1 [
        CLKSEL_A OFFSET(0) NUMBITS(2) [
            Pclk = 0,
            Ibro = 1,
            Ertco = 2
        ],
        CLKEN_A OFFSET(2) NUMBITS(1) [],
        CLKRDY_A OFFSET(3) NUMBITS(1) [],
        EVENT_SEL_A OFFSET(4) NUMBITS(3) [],
        NEGTRIG_A OFFSET(7) NUMBITS(1) [],
        IE_A OFFSET(8) NUMBITS(1) [],
        CAPEVENT_SEL_A OFFSET(9) NUMBITS(2) [],
        SW_CAPEVENT_A OFFSET(11) NUMBITS(1) [],
        WE_A OFFSET(12) NUMBITS(1) [],
        OUTEN_A OFFSET(13) NUMBITS(1) [],
        OUTBEN_A OFFSET(14) NUMBITS(1) [],
        CLKSEL_B OFFSET(16) NUMBITS(2) [],
        CLKEN_B OFFSET(18) NUMBITS(1) [],
        CLKRDY_B OFFSET(19) NUMBITS(1) [],
        IE_B OFFSET(24) NUMBITS(1) [],
        /// Chain the a and b halves into one 32 bit timer
        CASCADE OFFSET(31) NUMBITS(1) []
    ]
];
