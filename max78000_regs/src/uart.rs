//! UART registers.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const UART0_BASE: usize = 0x4004_2000;
pub const UART1_BASE: usize = 0x4004_3000;
pub const UART2_BASE: usize = 0x4004_4000;

register_structs! {
    pub UartRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x008 => pub int_en: ReadWrite<u32, INT::Register>),
        (0x00c => pub int_fl: ReadWrite<u32, INT::Register>),
        (0x010 => pub clkdiv: ReadWrite<u32, CLKDIV::Register>),
        (0x014 => pub osr: ReadWrite<u32, OSR::Register>),
        (0x018 => pub txpeek: ReadOnly<u32>),
        (0x01c => pub pnr: ReadWrite<u32>),
        (0x020 => pub fifo: ReadWrite<u32, FIFO::Register>),
        (0x024 => _reserved0),
        (0x030 => pub dma: ReadWrite<u32>),
        (0x034 => pub wken: ReadWrite<u32>),
        (0x038 => pub wkfl: ReadWrite<u32>),
        (0x03c => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        RX_THD_VAL OFFSET(0) NUMBITS(4) [],
        PAR_EN OFFSET(4) NUMBITS(1) [],
        /// Set for odd parity
        PAR_EO OFFSET(5) NUMBITS(1) [],
        PAR_MD OFFSET(6) NUMBITS(1) [],
        CTS_DIS OFFSET(7) NUMBITS(1) [],
        TX_FLUSH OFFSET(8) NUMBITS(1) [],
        RX_FLUSH OFFSET(9) NUMBITS(1) [],
        CHAR_SIZE OFFSET(10) NUMBITS(2) [
            Bits5 = 0,
            Bits6 = 1,
            Bits7 = 2,
            Bits8 = 3
        ],
        /// Set for 2 stop bits (1.5 with 5 bit characters)
        STOPBITS OFFSET(12) NUMBITS(1) [],
        HFC_EN OFFSET(13) NUMBITS(1) [],
        RTS_DIS OFFSET(14) NUMBITS(1) [],
        BCLKEN OFFSET(15) NUMBITS(1) [],
        BCLKSRC OFFSET(16) NUMBITS(2) [
            PeripheralClock = 0,
            Clk1 = 1,
            Clk2 = 2,
            Clk3 = 3
        ],
        DPFE_EN OFFSET(18) NUMBITS(1) [],
        BCLKRDY OFFSET(19) NUMBITS(1) [],
        UCAGM OFFSET(20) NUMBITS(1) [],
        FDM OFFSET(21) NUMBITS(1) [],
        DESM OFFSET(22) NUMBITS(1) []
    ],
    pub STATUS [
        TX_BUSY OFFSET(0) NUMBITS(1) [],
        RX_BUSY OFFSET(1) NUMBITS(1) [],
        RX_EM OFFSET(4) NUMBITS(1) [],
        RX_FULL OFFSET(5) NUMBITS(1) [],
        TX_EM OFFSET(6) NUMBITS(1) [],
        TX_FULL OFFSET(7) NUMBITS(1) [],
        RX_LVL OFFSET(8) NUMBITS(4) [],
        TX_LVL OFFSET(12) NUMBITS(4) []
    ],
    pub INT [
        RX_FERR OFFSET(0) NUMBITS(1) [],
        RX_PAR OFFSET(1) NUMBITS(1) [],
        CTS_EV OFFSET(2) NUMBITS(1) [],
        RX_OV OFFSET(3) NUMBITS(1) [],
        RX_THD OFFSET(4) NUMBITS(1) [],
        TX_OB OFFSET(5) NUMBITS(1) [],
        TX_HE OFFSET(6) NUMBITS(1) []
    ],
    pub CLKDIV [
        CLKDIV OFFSET(0) NUMBITS(20) []
    ],
    pub OSR [
        OSR OFFSET(0) NUMBITS(3) []
    ],
    pub FIFO [
        DATA OFFSET(0) NUMBITS(8) [],
        RX_PAR OFFSET(8) NUMBITS(1) []
    ]
];
