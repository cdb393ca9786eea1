//! Periodic countdown timer driver.
//!
//! A [`Timer`] owns one hardware timer and produces a stream of ticks at a
//! requested rate. Foreground code paces itself with [`Timer::synchronize`];
//! interrupt-driven work goes through [`Timer::set_callback`].
//!
//! With a non-zero interrupt level the timer must be bound in the vector
//! table, since ticks are counted by its [`Service`] handler. With level 0
//! nothing is bound and `synchronize` polls the expiry flag itself; the tick
//! counter behaves the same either way.

use core::cell::Cell;
use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use critical_section::Mutex;
use embedded_hal::blocking::delay::DelayMs;

use super::divider::{resolve, ClockConfig, DividerPlan, DividerTable, UnattainableFrequency};
use super::power::Idle;
use crate::vectors::Service;

/// Work run from interrupt context on every tick. Keep it short.
pub type Callback = fn();

/// Register-level access to one timer peripheral.
///
/// Implementations only move bits; sequencing is the driver's job.
pub trait TimerRegisters: Sync {
    /// Prescaler of this timer model.
    const DIVIDERS: &'static DividerTable;

    /// Takes the module out of standby, where the part has one.
    fn power_up(&self) {}

    fn set_running(&self, running: bool);

    /// Periodic countdown mode with the given prescaler clock-select code.
    fn set_mode(&self, select: u8);

    fn set_reload(&self, reload: u16);

    /// Interrupt level; 0 disables the timer interrupt.
    fn set_interrupt(&self, priority: u8);

    /// Expiry flag, set by hardware on every underflow.
    fn pending(&self) -> bool;

    fn clear_pending(&self);

    /// Live down-counter. May tear while the hardware reloads.
    fn count(&self) -> u16;
}

#[derive(Clone, Copy)]
struct Active {
    target_hz: u32,
    plan: DividerPlan,
}

struct TimerState {
    /// Only word written from interrupt context.
    ticks: AtomicU16,
    running: AtomicBool,
    armed: AtomicBool,
    active: Mutex<Cell<Option<Active>>>,
    callback: Mutex<Cell<Option<Callback>>>,
}

pub struct Timer<R, I> {
    regs: R,
    idle: I,
    clock: ClockConfig,
    state: TimerState,
}

impl<R, I> Timer<R, I> {
    pub const fn new(regs: R, idle: I, clock: ClockConfig) -> Self {
        Self {
            regs,
            idle,
            clock,
            state: TimerState {
                ticks: AtomicU16::new(0),
                running: AtomicBool::new(false),
                armed: AtomicBool::new(false),
                active: Mutex::new(Cell::new(None)),
                callback: Mutex::new(Cell::new(None)),
            },
        }
    }
}

impl<R: TimerRegisters, I: Idle> Timer<R, I> {
    /// Starts ticking at `target_hz`.
    ///
    /// `priority` is the interrupt level; 0 leaves the interrupt disabled and
    /// [`synchronize`](Self::synchronize) falls back to polling.
    ///
    /// Every call clears the registered callback, including a failed one;
    /// register it again afterwards. The tick counter keeps its value. On
    /// error the timer is left stopped.
    pub fn start(&self, target_hz: u32, priority: u8) -> Result<(), UnattainableFrequency> {
        self.regs.power_up();
        self.stop();
        critical_section::with(|cs| {
            self.state.callback.borrow(cs).set(None);
            self.state.active.borrow(cs).set(None);
        });

        let plan = resolve(self.clock, target_hz, R::DIVIDERS)?;
        self.program(target_hz, plan);

        self.regs.clear_pending();
        self.regs.set_interrupt(priority);
        self.state.armed.store(priority != 0, Ordering::Release);
        self.run(true);
        Ok(())
    }

    /// Reprograms the period without touching interrupt arming or the callback.
    ///
    /// A stopped timer stays stopped; the new period applies once it runs.
    pub fn set_frequency(&self, target_hz: u32) -> Result<(), UnattainableFrequency> {
        let plan = resolve(self.clock, target_hz, R::DIVIDERS)?;
        let running = self.is_running();
        if running {
            self.run(false);
        }
        self.program(target_hz, plan);
        if running {
            self.run(true);
        }
        Ok(())
    }

    fn run(&self, running: bool) {
        self.regs.set_running(running);
        self.state.running.store(running, Ordering::Release);
    }

    fn program(&self, target_hz: u32, plan: DividerPlan) {
        self.regs.set_mode(plan.select());
        self.regs.set_reload(plan.reload());
        critical_section::with(|cs| {
            self.state
                .active
                .borrow(cs)
                .set(Some(Active { target_hz, plan }));
        });
    }

    /// Stops counting and disarms the interrupt. Does not wake a pending
    /// `synchronize`.
    pub fn stop(&self) {
        self.run(false);
        self.regs.set_interrupt(0);
        self.state.armed.store(false, Ordering::Release);
    }

    pub fn set_callback(&self, callback: Option<Callback>) {
        critical_section::with(|cs| self.state.callback.borrow(cs).set(callback));
    }

    /// Blocks until the next tick.
    ///
    /// Never returns on the tick that was current at the call. Must not be
    /// called from interrupt context.
    pub fn synchronize(&self) {
        if self.is_armed() {
            let snapshot = self.ticks();
            self.idle.until(|| self.ticks() != snapshot);
        } else {
            nb::block!(self.poll_expired()).unwrap_or_else(|never| match never {});
        }
    }

    fn poll_expired(&self) -> nb::Result<(), Infallible> {
        if !self.regs.pending() {
            return Err(nb::Error::WouldBlock);
        }
        self.regs.clear_pending();
        self.bump();
        Ok(())
    }

    // Exactly one context increments: the handler when armed, `synchronize` otherwise.
    #[inline]
    fn bump(&self) {
        let n = self.state.ticks.load(Ordering::Relaxed);
        self.state.ticks.store(n.wrapping_add(1), Ordering::Release);
    }

    /// Ticks seen so far, wrapping. Compare snapshots by inequality.
    #[inline]
    pub fn ticks(&self) -> u16 {
        self.state.ticks.load(Ordering::Acquire)
    }

    /// Live down-counter value.
    pub fn read_counter(&self) -> u16 {
        // The two halves can be caught mid-reload; take two matching reads.
        let mut n = self.regs.count();
        loop {
            let again = self.regs.count();
            if again == n {
                return n;
            }
            n = again;
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state.armed.load(Ordering::Acquire)
    }

    fn active(&self) -> Option<Active> {
        critical_section::with(|cs| self.state.active.borrow(cs).get())
    }

    pub fn plan(&self) -> Option<DividerPlan> {
        self.active().map(|a| a.plan)
    }

    /// Value in the reload register.
    pub fn reload(&self) -> Option<u16> {
        self.plan().map(|p| p.reload())
    }

    /// Rate last requested through `start` or `set_frequency`.
    pub fn frequency(&self) -> Option<u32> {
        self.active().map(|a| a.target_hz)
    }

    pub fn clock(&self) -> ClockConfig {
        self.clock
    }

    /// Whole ticks covering `ms`, rounded up.
    pub fn ticks_for_ms(&self, ms: u32) -> u32 {
        let Some(plan) = self.plan() else {
            return 0;
        };
        let hz = plan.achieved_hz(self.clock) as u64;
        ((ms as u64 * hz + 999) / 1000) as u32
    }

    /// Millisecond delay paced by this timer's ticks.
    pub fn delay(&self) -> TickDelay<'_, R, I> {
        TickDelay { timer: self }
    }
}

impl<R: TimerRegisters, I: Idle + Sync> Service for Timer<R, I> {
    fn service(&self) {
        self.regs.clear_pending();
        self.bump();
        let callback = critical_section::with(|cs| self.state.callback.borrow(cs).get());
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Blocking delay in whole timer ticks. Resolution is one tick period.
pub struct TickDelay<'a, R, I> {
    timer: &'a Timer<R, I>,
}

impl<R: TimerRegisters, I: Idle> DelayMs<u16> for TickDelay<'_, R, I> {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..self.timer.ticks_for_ms(ms as u32) {
            self.timer.synchronize();
        }
    }
}

impl<R: TimerRegisters, I: Idle> DelayMs<u8> for TickDelay<'_, R, I> {
    fn delay_ms(&mut self, ms: u8) {
        DelayMs::<u16>::delay_ms(self, ms as u16);
    }
}
