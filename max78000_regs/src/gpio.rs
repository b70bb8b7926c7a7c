//! GPIO port registers. Every register holds one bit per pin of the port.

use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

pub const GPIO0_BASE: usize = 0x4000_8000;
pub const GPIO1_BASE: usize = 0x4000_9000;
pub const GPIO2_BASE: usize = 0x4008_0400;

register_structs! {
    pub GpioRegisters {
        /// Function select bit 0, set for io mode
        (0x000 => pub en0: ReadWrite<u32>),
        (0x004 => pub en0_set: WriteOnly<u32>),
        (0x008 => pub en0_clr: WriteOnly<u32>),
        (0x00c => pub outen: ReadWrite<u32>),
        (0x010 => pub outen_set: WriteOnly<u32>),
        (0x014 => pub outen_clr: WriteOnly<u32>),
        (0x018 => pub out: ReadWrite<u32>),
        (0x01c => pub out_set: WriteOnly<u32>),
        (0x020 => pub out_clr: WriteOnly<u32>),
        (0x024 => pub in_: ReadOnly<u32>),
        (0x028 => pub intmode: ReadWrite<u32>),
        (0x02c => pub intpol: ReadWrite<u32>),
        /// Input buffer enable
        (0x030 => pub inen: ReadWrite<u32>),
        (0x034 => pub inten: ReadWrite<u32>),
        (0x038 => pub inten_set: WriteOnly<u32>),
        (0x03c => pub inten_clr: WriteOnly<u32>),
        (0x040 => pub intfl: ReadOnly<u32>),
        (0x044 => _reserved0),
        (0x048 => pub intfl_clr: WriteOnly<u32>),
        (0x04c => pub wken: ReadWrite<u32>),
        (0x050 => pub wken_set: WriteOnly<u32>),
        (0x054 => pub wken_clr: WriteOnly<u32>),
        (0x058 => _reserved1),
        (0x05c => pub dualedge: ReadWrite<u32>),
        /// Weak pull enable
        (0x060 => pub padctrl0: ReadWrite<u32>),
        /// Strong pull enable
        (0x064 => pub padctrl1: ReadWrite<u32>),
        (0x068 => pub en1: ReadWrite<u32>),
        (0x06c => pub en1_set: WriteOnly<u32>),
        (0x070 => pub en1_clr: WriteOnly<u32>),
        (0x074 => pub en2: ReadWrite<u32>),
        (0x078 => pub en2_set: WriteOnly<u32>),
        (0x07c => pub en2_clr: WriteOnly<u32>),
        (0x080 => _reserved2),
        (0x0a8 => pub hysen: ReadWrite<u32>),
        (0x0ac => pub srsel: ReadWrite<u32>),
        (0x0b0 => pub ds0: ReadWrite<u32>),
        (0x0b4 => pub ds1: ReadWrite<u32>),
        /// Pull select, set for pull up
        (0x0b8 => pub ps: ReadWrite<u32>),
        (0x0bc => _reserved3),
        /// Supply select, set for vddioh
        (0x0c0 => pub vssel: ReadWrite<u32>),
        (0x0c4 => @END),
    }
}
