//! SPI controller registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const SPI0_BASE: usize = 0x400b_e000;
pub const SPI1_BASE: usize = 0x4004_6000;

register_structs! {
    pub SpiRegisters {
        /// Access width selects how many bytes move through the fifo.
        (0x000 => pub fifo32: ReadWrite<u32>),
        (0x004 => pub ctrl0: ReadWrite<u32, CTRL0::Register>),
        (0x008 => pub ctrl1: ReadWrite<u32, CTRL1::Register>),
        (0x00c => pub ctrl2: ReadWrite<u32, CTRL2::Register>),
        (0x010 => pub sstime: ReadWrite<u32, SSTIME::Register>),
        (0x014 => pub clkctrl: ReadWrite<u32, CLKCTRL::Register>),
        (0x018 => _reserved0),
        (0x01c => pub dma: ReadWrite<u32, DMA::Register>),
        (0x020 => pub intfl: ReadWrite<u32, INT::Register>),
        (0x024 => pub inten: ReadWrite<u32, INT::Register>),
        (0x028 => pub wkfl: ReadWrite<u32>),
        (0x02c => pub wken: ReadWrite<u32>),
        (0x030 => pub stat: ReadOnly<u32, STAT::Register>),
        (0x034 => @END),
    }
}

impl SpiRegisters {
    /// Byte wide view of the fifo, moves one 8 bit frame per access.
    pub fn fifo8(&self) -> &ReadWrite<u8> {
        // safety: the lowest byte lane of fifo32 is itself a valid u8 register
        unsafe { &*(&self.fifo32 as *const ReadWrite<u32> as *const ReadWrite<u8>) }
    }

    /// Half word view of the fifo, moves one frame of up to 16 bits per access.
    pub fn fifo16(&self) -> &ReadWrite<u16> {
        // safety: the low half word of fifo32 is itself a valid u16 register
        unsafe { &*(&self.fifo32 as *const ReadWrite<u32> as *const ReadWrite<u16>) }
    }
}

register_bitfields![u32,
    pub CTRL0 [
        EN OFFSET(0) NUMBITS(1) [],
        MST_MODE OFFSET(1) NUMBITS(1) [],
        SS_IO OFFSET(4) NUMBITS(1) [],
        /// Starts a master transaction, cleared by hardware
        START OFFSET(5) NUMBITS(1) [],
        /// Keep slave select asserted after the transaction
        SS_CTRL OFFSET(8) NUMBITS(1) [],
        SS_ACTIVE OFFSET(16) NUMBITS(4) []
    ],
    pub CTRL1 [
        TX_NUM_CHAR OFFSET(0) NUMBITS(16) [],
        RX_NUM_CHAR OFFSET(16) NUMBITS(16) []
    ],
    pub CTRL2 [
        CLKPHA OFFSET(0) NUMBITS(1) [],
        CLKPOL OFFSET(1) NUMBITS(1) [],
        /// Bits per character, 0 means 16
        NUMBITS OFFSET(8) NUMBITS(4) [],
        DATA_WIDTH OFFSET(12) NUMBITS(2) [
            Mono = 0,
            Dual = 1,
            Quad = 2
        ],
        THREE_WIRE OFFSET(15) NUMBITS(1) [],
        SS_POL OFFSET(16) NUMBITS(4) []
    ],
    pub SSTIME [
        PRE OFFSET(0) NUMBITS(8) [],
        POST OFFSET(8) NUMBITS(8) [],
        INACT OFFSET(16) NUMBITS(8) []
    ],
    /// Serial clock is pclk / 2^CLKDIV, high for HI and low for LO of those
    /// ticks.
    pub CLKCTRL [
        LO OFFSET(0) NUMBITS(8) [],
        HI OFFSET(8) NUMBITS(8) [],
        CLKDIV OFFSET(16) NUMBITS(4) []
    ],
    pub DMA [
        TX_THD_VAL OFFSET(0) NUMBITS(5) [],
        TX_FIFO_EN OFFSET(6) NUMBITS(1) [],
        TX_FLUSH OFFSET(7) NUMBITS(1) [],
        TX_LVL OFFSET(8) NUMBITS(6) [],
        DMA_TX_EN OFFSET(15) NUMBITS(1) [],
        RX_THD_VAL OFFSET(16) NUMBITS(5) [],
        RX_FIFO_EN OFFSET(22) NUMBITS(1) [],
        RX_FLUSH OFFSET(23) NUMBITS(1) [],
        /// Bytes waiting in the receive fifo
        RX_LVL OFFSET(24) NUMBITS(6) [],
        DMA_RX_EN OFFSET(31) NUMBITS(1) []
    ],
    /// Layout of both the interrupt flag and enable registers.
    pub INT [
        TX_THD OFFSET(0) NUMBITS(1) [],
        TX_EM OFFSET(1) NUMBITS(1) [],
        RX_THD OFFSET(2) NUMBITS(1) [],
        RX_FULL OFFSET(3) NUMBITS(1) [],
        SSA OFFSET(4) NUMBITS(1) [],
        SSD OFFSET(5) NUMBITS(1) [],
        FAULT OFFSET(8) NUMBITS(1) [],
        ABORT OFFSET(9) NUMBITS(1) [],
        MST_DONE OFFSET(11) NUMBITS(1) [],
        TX_OV OFFSET(12) NUMBITS(1) [],
        TX_UN OFFSET(13) NUMBITS(1) [],
        RX_OV OFFSET(14) NUMBITS(1) [],
        RX_UN OFFSET(15) NUMBITS(1) []
    ],
    pub STAT [
        BUSY OFFSET(0) NUMBITS(1) []
    ]
];
