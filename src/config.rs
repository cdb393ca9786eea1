//! Build-time configuration constants.

use crate::hal::divider::ClockConfig;

/// CPU frequency in Hz, exported by `build.rs` (override with `MCU_FREQ_HZ`).
pub const CPU_FREQ_HZ: u32 = parse_hz(env!("MCU_FREQ_HZ"));

pub const SYSTEM_CLOCK: ClockConfig = ClockConfig::from_hz(CPU_FREQ_HZ);

/// Main loop pacing rate.
pub const TICK_HZ: u32 = 60;

/// Interrupt level for the tick timer; 0 runs it polled.
pub const TICK_IRQ_LEVEL: u8 = 1;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

const fn parse_hz(s: &str) -> u32 {
    let bytes = s.as_bytes();
    assert!(!bytes.is_empty(), "MCU_FREQ_HZ is empty");
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        assert!(b.is_ascii_digit(), "MCU_FREQ_HZ must be decimal");
        value = value * 10 + (b - b'0') as u32;
        i += 1;
    }
    value
}
