//! Global control registers: system clock generation, peripheral clock gates
//! and resets.

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const GCR_BASE: usize = 0x4000_0000;

register_structs! {
    pub GcrRegisters {
        (0x000 => pub sysctrl: ReadWrite<u32, SYSCTRL::Register>),
        (0x004 => pub rst0: ReadWrite<u32, RST0::Register>),
        (0x008 => pub clkctrl: ReadWrite<u32, CLKCTRL::Register>),
        (0x00c => pub pm: ReadWrite<u32, PM::Register>),
        (0x010 => _reserved0),
        (0x018 => pub pclkdiv: ReadWrite<u32, PCLKDIV::Register>),
        (0x01c => _reserved1),
        (0x024 => pub pclkdis0: ReadWrite<u32, PCLKDIS0::Register>),
        (0x028 => pub memctrl: ReadWrite<u32>),
        (0x02c => pub memz: ReadWrite<u32>),
        (0x030 => _reserved2),
        (0x040 => pub sysst: ReadOnly<u32>),
        (0x044 => pub rst1: ReadWrite<u32, RST1::Register>),
        (0x048 => pub pclkdis1: ReadWrite<u32, PCLKDIS1::Register>),
        (0x04c => pub eventen: ReadWrite<u32>),
        (0x050 => pub revision: ReadOnly<u32>),
        (0x054 => pub sysie: ReadWrite<u32>),
        (0x058 => _reserved3),
        (0x064 => pub eccerr: ReadWrite<u32>),
        (0x068 => pub ecced: ReadWrite<u32>),
        (0x06c => pub eccie: ReadWrite<u32>),
        (0x070 => pub eccaddr: ReadWrite<u32>),
        (0x074 => @END),
    }
}

register_bitfields![u32,
    pub SYSCTRL [
        /// Flush the instruction cache, cleared by hardware when done
        ICC0_FLUSH OFFSET(6) NUMBITS(1) [],
        SWD_DIS OFFSET(14) NUMBITS(1) [],
        CHKRES OFFSET(15) NUMBITS(1) [],
        CHKRD OFFSET(16) NUMBITS(1) []
    ],
    pub RST0 [
        DMA OFFSET(0) NUMBITS(1) [],
        WDT0 OFFSET(1) NUMBITS(1) [],
        GPIO0 OFFSET(2) NUMBITS(1) [],
        GPIO1 OFFSET(3) NUMBITS(1) [],
        TMR0 OFFSET(5) NUMBITS(1) [],
        TMR1 OFFSET(6) NUMBITS(1) [],
        TMR2 OFFSET(7) NUMBITS(1) [],
        TMR3 OFFSET(8) NUMBITS(1) [],
        UART0 OFFSET(11) NUMBITS(1) [],
        UART1 OFFSET(12) NUMBITS(1) [],
        SPI1 OFFSET(13) NUMBITS(1) [],
        I2C0 OFFSET(16) NUMBITS(1) [],
        RTC OFFSET(17) NUMBITS(1) [],
        CNN OFFSET(18) NUMBITS(1) [],
        TRNG OFFSET(24) NUMBITS(1) [],
        ADC OFFSET(26) NUMBITS(1) [],
        UART2 OFFSET(28) NUMBITS(1) [],
        SOFT OFFSET(29) NUMBITS(1) [],
        PERIPH OFFSET(30) NUMBITS(1) [],
        SYS OFFSET(31) NUMBITS(1) []
    ],
    pub CLKCTRL [
        /// System clock prescaler, divides by 2^n
        SYSCLK_DIV OFFSET(6) NUMBITS(3) [],
        SYSCLK_SEL OFFSET(9) NUMBITS(3) [
            Iso = 0,
            Inro = 3,
            Ipo = 4,
            Ibro = 5,
            Ertco = 6,
            Extclk = 7
        ],
        SYSCLK_RDY OFFSET(13) NUMBITS(1) [],
        ERTCO_EN OFFSET(17) NUMBITS(1) [],
        ISO_EN OFFSET(18) NUMBITS(1) [],
        IPO_EN OFFSET(19) NUMBITS(1) [],
        IBRO_EN OFFSET(20) NUMBITS(1) [],
        IBRO_VS OFFSET(21) NUMBITS(1) [],
        ERTCO_RDY OFFSET(25) NUMBITS(1) [],
        ISO_RDY OFFSET(26) NUMBITS(1) [],
        IPO_RDY OFFSET(27) NUMBITS(1) [],
        IBRO_RDY OFFSET(28) NUMBITS(1) [],
        INRO_RDY OFFSET(29) NUMBITS(1) []
    ],
    pub PM [
        MODE OFFSET(0) NUMBITS(4) [
            Active = 0,
            Sleep = 1,
            Standby = 2,
            Backup = 4,
            Lpm = 8,
            Upm = 9,
            PowerDown = 10
        ],
        GPIO_WE OFFSET(4) NUMBITS(1) [],
        RTC_WE OFFSET(5) NUMBITS(1) []
    ],
    pub PCLKDIV [
        ADCFRQ OFFSET(10) NUMBITS(4) [],
        CNNCLKDIV OFFSET(14) NUMBITS(3) [],
        CNNCLKSEL OFFSET(17) NUMBITS(1) []
    ],
    /// A set bit gates the peripheral's clock off.
    pub PCLKDIS0 [
        GPIO0 OFFSET(0) NUMBITS(1) [],
        GPIO1 OFFSET(1) NUMBITS(1) [],
        DMA OFFSET(5) NUMBITS(1) [],
        SPI1 OFFSET(6) NUMBITS(1) [],
        UART0 OFFSET(9) NUMBITS(1) [],
        UART1 OFFSET(10) NUMBITS(1) [],
        I2C0 OFFSET(13) NUMBITS(1) [],
        TMR0 OFFSET(15) NUMBITS(1) [],
        TMR1 OFFSET(16) NUMBITS(1) [],
        TMR2 OFFSET(17) NUMBITS(1) [],
        TMR3 OFFSET(18) NUMBITS(1) [],
        ADC OFFSET(23) NUMBITS(1) [],
        CNN OFFSET(25) NUMBITS(1) [],
        I2C1 OFFSET(28) NUMBITS(1) [],
        PT OFFSET(29) NUMBITS(1) []
    ],
    pub RST1 [
        I2C1 OFFSET(0) NUMBITS(1) [],
        PT OFFSET(1) NUMBITS(1) [],
        OWM OFFSET(7) NUMBITS(1) [],
        CRC OFFSET(9) NUMBITS(1) [],
        AES OFFSET(10) NUMBITS(1) [],
        SPI0 OFFSET(11) NUMBITS(1) [],
        SMPHR OFFSET(16) NUMBITS(1) [],
        I2S OFFSET(19) NUMBITS(1) [],
        I2C2 OFFSET(20) NUMBITS(1) [],
        CPU1 OFFSET(31) NUMBITS(1) []
    ],
    /// A set bit gates the peripheral's clock off.
    pub PCLKDIS1 [
        UART2 OFFSET(1) NUMBITS(1) [],
        TRNG OFFSET(2) NUMBITS(1) [],
        SMPHR OFFSET(9) NUMBITS(1) [],
        OWM OFFSET(13) NUMBITS(1) [],
        CRC OFFSET(14) NUMBITS(1) [],
        AES OFFSET(15) NUMBITS(1) [],
        SPI0 OFFSET(16) NUMBITS(1) [],
        PCIF OFFSET(18) NUMBITS(1) [],
        I2S OFFSET(23) NUMBITS(1) [],
        I2C2 OFFSET(24) NUMBITS(1) [],
        WDT0 OFFSET(27) NUMBITS(1) [],
        CPU1 OFFSET(31) NUMBITS(1) []
    ]
];
