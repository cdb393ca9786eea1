//! ATmega128 interrupt vector numbers, as used by `avr-device`.

pub const VECTOR_COUNT: usize = 35;

pub const RESET: usize = 0;
pub const INT0: usize = 1;
pub const INT1: usize = 2;
pub const INT2: usize = 3;
pub const INT3: usize = 4;
pub const INT4: usize = 5;
pub const INT5: usize = 6;
pub const INT6: usize = 7;
pub const INT7: usize = 8;
pub const TIMER2_COMP: usize = 9;
pub const TIMER2_OVF: usize = 10;
pub const TIMER1_CAPT: usize = 11;
pub const TIMER1_COMPA: usize = 12;
pub const TIMER1_COMPB: usize = 13;
pub const TIMER1_OVF: usize = 14;
pub const TIMER0_COMP: usize = 15;
pub const TIMER0_OVF: usize = 16;
pub const SPI_STC: usize = 17;
pub const USART0_RX: usize = 18;
pub const USART0_UDRE: usize = 19;
pub const USART0_TX: usize = 20;
pub const ADC: usize = 21;
pub const EE_READY: usize = 22;
pub const ANALOG_COMP: usize = 23;
pub const TIMER1_COMPC: usize = 24;
pub const TIMER3_CAPT: usize = 25;
pub const TIMER3_COMPA: usize = 26;
pub const TIMER3_COMPB: usize = 27;
pub const TIMER3_COMPC: usize = 28;
pub const TIMER3_OVF: usize = 29;
pub const USART1_RX: usize = 30;
pub const USART1_UDRE: usize = 31;
pub const USART1_TX: usize = 32;
pub const TWI: usize = 33;
pub const SPM_READY: usize = 34;

/// Table indexed like the hardware vectors.
pub type VectorTable = super::VectorTable<VECTOR_COUNT>;
