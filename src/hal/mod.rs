pub mod divider;
pub mod power;
pub mod timer;

#[cfg(target_arch = "avr")]
pub mod tc16;
#[cfg(target_arch = "avr")]
pub mod usart;

// Re-export commonly used types
pub use divider::{resolve, ClockConfig, DividerPlan, DividerTable, Tap, UnattainableFrequency};
pub use power::{Idle, SpinIdle};
pub use timer::{Callback, TickDelay, Timer, TimerRegisters};

#[cfg(target_arch = "avr")]
pub use power::{Power, SleepIdle};
#[cfg(target_arch = "avr")]
pub use tc16::Tc16;
#[cfg(target_arch = "avr")]
pub use usart::Usart0;
