//! R8C/M120AN variable vector numbers.
//!
//! Slot 0 is the BRK instruction entry; the rest are peripheral sources.

pub const VECTOR_COUNT: usize = 32;

pub const BRK: usize = 0;
pub const FLASH_READY: usize = 1;
pub const COMPARATOR_B1: usize = 4;
pub const COMPARATOR_B3: usize = 5;
pub const TIMER_RC: usize = 7;
pub const KEY_INPUT: usize = 13;
pub const ADC: usize = 14;
pub const UART0_TX: usize = 17;
pub const UART0_RX: usize = 18;
pub const INT2: usize = 21;
pub const TIMER_RJ2: usize = 22;
pub const PERIODIC_TIMER: usize = 23;
pub const TIMER_RB2: usize = 24;
pub const INT1: usize = 25;
pub const INT3: usize = 26;
pub const INT0: usize = 29;

pub type VectorTable = super::VectorTable<VECTOR_COUNT>;
