#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

use tick_firmware::hal::divider::{ClockConfig, DividerTable, R8C_TIMER_RB};
use tick_firmware::hal::{Idle, TimerRegisters};

pub const CLOCK_20M: ClockConfig = ClockConfig::from_hz(20_000_000);

/// Register block of a simulated TimerRB.
///
/// While running, the expiry flag comes up on every `period_polls`-th look at
/// it, which stands in for the hardware underflow in polling mode.
pub struct MockRegisters {
    pub running: AtomicBool,
    pub select: AtomicU8,
    pub reload: AtomicU16,
    pub priority: AtomicU8,
    pub pending: AtomicBool,
    pub power_ups: AtomicU32,
    pub count_reads: AtomicU32,
    period_polls: u32,
    polls_left: AtomicU32,
    scripted_counts: Mutex<VecDeque<u16>>,
}

impl MockRegisters {
    pub const fn new(period_polls: u32) -> Self {
        Self {
            running: AtomicBool::new(false),
            select: AtomicU8::new(0),
            reload: AtomicU16::new(0),
            priority: AtomicU8::new(0),
            pending: AtomicBool::new(false),
            power_ups: AtomicU32::new(0),
            count_reads: AtomicU32::new(0),
            period_polls,
            polls_left: AtomicU32::new(period_polls),
            scripted_counts: Mutex::new(VecDeque::new()),
        }
    }

    /// Counter underflow: raise the expiry flag if the timer runs.
    pub fn underflow(&self) {
        if self.running.load(Ordering::SeqCst) {
            self.pending.store(true, Ordering::SeqCst);
        }
    }

    /// Values returned by the next `count` reads, oldest first.
    pub fn script_counts(&self, values: &[u16]) {
        self.scripted_counts.lock().unwrap().extend(values.iter().copied());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn priority(&self) -> u8 {
        self.priority.load(Ordering::SeqCst)
    }
}

impl TimerRegisters for &'static MockRegisters {
    const DIVIDERS: &'static DividerTable = &R8C_TIMER_RB;

    fn power_up(&self) {
        self.power_ups.fetch_add(1, Ordering::SeqCst);
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    fn set_mode(&self, select: u8) {
        self.select.store(select, Ordering::SeqCst);
    }

    fn set_reload(&self, reload: u16) {
        self.reload.store(reload, Ordering::SeqCst);
    }

    fn set_interrupt(&self, priority: u8) {
        self.priority.store(priority, Ordering::SeqCst);
    }

    fn pending(&self) -> bool {
        if self.pending.load(Ordering::SeqCst) {
            return true;
        }
        if !self.is_running() {
            return false;
        }
        let left = self.polls_left.load(Ordering::SeqCst);
        if left <= 1 {
            self.polls_left.store(self.period_polls, Ordering::SeqCst);
            self.pending.store(true, Ordering::SeqCst);
            true
        } else {
            self.polls_left.store(left - 1, Ordering::SeqCst);
            false
        }
    }

    fn clear_pending(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }

    fn count(&self) -> u16 {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        self.scripted_counts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.reload.load(Ordering::SeqCst))
    }
}

/// Idle whose every wait lets one timer interrupt happen.
pub struct IrqIdle {
    fire: fn(),
    pub waits: AtomicU32,
}

impl IrqIdle {
    pub const fn new(fire: fn()) -> Self {
        Self {
            fire,
            waits: AtomicU32::new(0),
        }
    }

    pub fn waits(&self) -> u32 {
        self.waits.load(Ordering::SeqCst)
    }
}

impl Idle for &IrqIdle {
    fn wait(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
        (self.fire)();
    }
}
