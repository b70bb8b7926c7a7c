//! I2C controller registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const I2C0_BASE: usize = 0x4001_d000;
pub const I2C1_BASE: usize = 0x4001_e000;
pub const I2C2_BASE: usize = 0x4001_f000;

register_structs! {
    pub I2cRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x008 => pub intfl0: ReadWrite<u32, INT0::Register>),
        (0x00c => pub inten0: ReadWrite<u32, INT0::Register>),
        (0x010 => pub intfl1: ReadWrite<u32, INT1::Register>),
        (0x014 => pub inten1: ReadWrite<u32, INT1::Register>),
        (0x018 => pub fifolen: ReadOnly<u32, FIFOLEN::Register>),
        (0x01c => pub rxctrl0: ReadWrite<u32, RXCTRL0::Register>),
        (0x020 => pub rxctrl1: ReadWrite<u32, RXCTRL1::Register>),
        (0x024 => pub txctrl0: ReadWrite<u32, TXCTRL0::Register>),
        (0x028 => pub txctrl1: ReadWrite<u32, TXCTRL1::Register>),
        (0x02c => pub fifo: ReadWrite<u32, FIFO::Register>),
        (0x030 => pub mstctrl: ReadWrite<u32, MSTCTRL::Register>),
        (0x034 => pub clklo: ReadWrite<u32, CLKLO::Register>),
        (0x038 => pub clkhi: ReadWrite<u32, CLKHI::Register>),
        (0x03c => pub hsclk: ReadWrite<u32, HSCLK::Register>),
        (0x040 => pub timeout: ReadWrite<u32, TIMEOUT::Register>),
        (0x044 => _reserved0),
        (0x048 => pub dma: ReadWrite<u32, DMA::Register>),
        (0x04c => pub slave: ReadWrite<u32, SLAVE::Register>),
        (0x050 => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        EN OFFSET(0) NUMBITS(1) [],
        MST_MODE OFFSET(1) NUMBITS(1) [],
        GC_ADDR_EN OFFSET(2) NUMBITS(1) [],
        IRXM_EN OFFSET(3) NUMBITS(1) [],
        IRXM_ACK OFFSET(4) NUMBITS(1) [],
        SCL_OUT OFFSET(6) NUMBITS(1) [],
        SDA_OUT OFFSET(7) NUMBITS(1) [],
        SCL OFFSET(8) NUMBITS(1) [],
        SDA OFFSET(9) NUMBITS(1) [],
        BB_MODE OFFSET(10) NUMBITS(1) [],
        READ OFFSET(11) NUMBITS(1) [],
        CLKSTR_DIS OFFSET(12) NUMBITS(1) [],
        ONE_MST_MODE OFFSET(13) NUMBITS(1) [],
        HS_EN OFFSET(15) NUMBITS(1) []
    ],
    pub STATUS [
        BUSY OFFSET(0) NUMBITS(1) [],
        RX_EM OFFSET(1) NUMBITS(1) [],
        RX_FULL OFFSET(2) NUMBITS(1) [],
        TX_EM OFFSET(3) NUMBITS(1) [],
        TX_FULL OFFSET(4) NUMBITS(1) [],
        MST_BUSY OFFSET(5) NUMBITS(1) []
    ],
    /// Layout of both the interrupt flag and enable registers 0. Flags are
    /// cleared by writing 1.
    pub INT0 [
        DONE OFFSET(0) NUMBITS(1) [],
        IRXM OFFSET(1) NUMBITS(1) [],
        GC_ADDR_MATCH OFFSET(2) NUMBITS(1) [],
        ADDR_MATCH OFFSET(3) NUMBITS(1) [],
        RX_THD OFFSET(4) NUMBITS(1) [],
        TX_THD OFFSET(5) NUMBITS(1) [],
        STOP OFFSET(6) NUMBITS(1) [],
        ADDR_ACK OFFSET(7) NUMBITS(1) [],
        ARB_ERR OFFSET(8) NUMBITS(1) [],
        TO_ERR OFFSET(9) NUMBITS(1) [],
        ADDR_NACK_ERR OFFSET(10) NUMBITS(1) [],
        DATA_ERR OFFSET(11) NUMBITS(1) [],
        DNR_ERR OFFSET(12) NUMBITS(1) [],
        START_ERR OFFSET(13) NUMBITS(1) [],
        STOP_ERR OFFSET(14) NUMBITS(1) [],
        TX_LOCKOUT OFFSET(15) NUMBITS(1) [],
        MAMI OFFSET(16) NUMBITS(6) [],
        RD_ADDR_MATCH OFFSET(22) NUMBITS(1) [],
        WR_ADDR_MATCH OFFSET(23) NUMBITS(1) []
    ],
    pub INT1 [
        RX_OV OFFSET(0) NUMBITS(1) [],
        TX_UN OFFSET(1) NUMBITS(1) [],
        START OFFSET(2) NUMBITS(1) []
    ],
    pub FIFOLEN [
        RX_DEPTH OFFSET(0) NUMBITS(8) [],
        TX_DEPTH OFFSET(8) NUMBITS(8) []
    ],
    pub RXCTRL0 [
        DNR OFFSET(0) NUMBITS(1) [],
        FLUSH OFFSET(7) NUMBITS(1) [],
        THD_LVL OFFSET(8) NUMBITS(4) []
    ],
    pub RXCTRL1 [
        /// Bytes to receive, 0 means 256
        CNT OFFSET(0) NUMBITS(8) [],
        LVL OFFSET(8) NUMBITS(4) []
    ],
    pub TXCTRL0 [
        PRELOAD_MODE OFFSET(0) NUMBITS(1) [],
        TX_READY_MODE OFFSET(1) NUMBITS(1) [],
        GC_ADDR_FLUSH_DIS OFFSET(2) NUMBITS(1) [],
        WR_ADDR_FLUSH_DIS OFFSET(3) NUMBITS(1) [],
        RD_ADDR_FLUSH_DIS OFFSET(4) NUMBITS(1) [],
        NACK_FLUSH_DIS OFFSET(5) NUMBITS(1) [],
        FLUSH OFFSET(7) NUMBITS(1) [],
        THD_VAL OFFSET(8) NUMBITS(4) []
    ],
    pub TXCTRL1 [
        PRELOAD_RDY OFFSET(0) NUMBITS(1) [],
        LVL OFFSET(8) NUMBITS(4) []
    ],
    pub FIFO [
        DATA OFFSET(0) NUMBITS(8) []
    ],
    pub MSTCTRL [
        START OFFSET(0) NUMBITS(1) [],
        RESTART OFFSET(1) NUMBITS(1) [],
        STOP OFFSET(2) NUMBITS(1) [],
        EX_ADDR_EN OFFSET(7) NUMBITS(1) []
    ],
    pub CLKLO [
        LO OFFSET(0) NUMBITS(9) []
    ],
    pub CLKHI [
        HI OFFSET(0) NUMBITS(9) []
    ],
    pub HSCLK [
        LO OFFSET(0) NUMBITS(8) [],
        HI OFFSET(8) NUMBITS(8) []
    ],
    pub TIMEOUT [
        SCL_TO_VAL OFFSET(0) NUMBITS(16) []
    ],
    pub DMA [
        TX_EN OFFSET(0) NUMBITS(1) [],
        RX_EN OFFSET(1) NUMBITS(1) []
    ],
    pub SLAVE [
        ADDR OFFSET(0) NUMBITS(10) [],
        EXT_ADDR_EN OFFSET(15) NUMBITS(1) []
    ]
];
