//! Low-power waiting.

/// How the foreground context waits for an interrupt to make progress.
pub trait Idle {
    /// Suspends until some interrupt has run, or returns at once on targets
    /// without a wait instruction.
    fn wait(&self);

    /// Waits until `done` returns `true`. `done` is evaluated before every wait.
    fn until<F: FnMut() -> bool>(&self, mut done: F) {
        while !done() {
            self.wait();
        }
    }
}

/// Portable yield point; burns cycles instead of sleeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpinIdle;

impl Idle for SpinIdle {
    #[inline]
    fn wait(&self) {
        core::hint::spin_loop();
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::{Power, SleepIdle};

#[cfg(target_arch = "avr")]
mod avr {
    use super::Idle;
    use avr_device::atmega128a::CPU;

    const SLEEP_ENABLE: u8 = 1 << 5;
    const SLEEP_MODE_MASK: u8 = 0x1C;

    pub struct Power {
        _private: (),
    }

    impl Power {
        pub const fn new() -> Self {
            Self { _private: () }
        }

        /// SM2..SM0 = 0: Idle mode, which keeps the timers clocked.
        #[inline]
        pub fn select_idle_mode(&self) {
            unsafe {
                let p = CPU::ptr();
                (*p).mcucr.modify(|r, w| w.bits(r.bits() & !SLEEP_MODE_MASK));
            }
        }

        #[inline]
        pub fn enable_sleep(&self) {
            unsafe {
                let p = CPU::ptr();
                (*p).mcucr.modify(|r, w| w.bits(r.bits() | SLEEP_ENABLE));
            }
        }

        #[inline]
        pub fn disable_sleep(&self) {
            unsafe {
                let p = CPU::ptr();
                (*p).mcucr.modify(|r, w| w.bits(r.bits() & !SLEEP_ENABLE));
            }
        }

        pub fn enter_idle_mode(&self) {
            self.select_idle_mode();
            self.enable_sleep();
            avr_device::asm::sleep();
            self.disable_sleep();
        }
    }

    impl Default for Power {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Idle sleep mode; timers and USARTs keep running and wake the core.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SleepIdle;

    impl Idle for SleepIdle {
        fn wait(&self) {
            Power::new().enter_idle_mode();
        }

        /// Interrupts are enabled while sleeping; the caller's interrupt state
        /// is restored on return.
        // Interrupts stay masked between the last check of `done` and `sleep`,
        // otherwise a tick landing in that window is slept through.
        fn until<F: FnMut() -> bool>(&self, mut done: F) {
            let power = Power::new();
            power.select_idle_mode();
            let sreg = avr_device::interrupt::disable_save();
            loop {
                avr_device::interrupt::disable();
                if done() {
                    unsafe { avr_device::interrupt::restore(sreg) };
                    break;
                }
                power.enable_sleep();
                // `sei` only takes effect after the following instruction.
                unsafe { core::arch::asm!("sei", "sleep") };
                power.disable_sleep();
            }
        }
    }
}
