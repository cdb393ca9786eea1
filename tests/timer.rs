mod common;

use std::sync::atomic::{AtomicU32, Ordering};

use common::{IrqIdle, MockRegisters, CLOCK_20M};
use embedded_hal::blocking::delay::DelayMs;
use tick_firmware::hal::{Timer, UnattainableFrequency};
use tick_firmware::vectors::{r8c_m120an, Service};

type MockTimer = Timer<&'static MockRegisters, &'static IrqIdle>;

/// Declares a TimerRB wired into an R8C vector table. Each idle wait of the
/// foreground raises the underflow and dispatches the TimerRB vector.
macro_rules! fixture {
    ($regs:ident, $idle:ident, $timer:ident) => {
        static $regs: MockRegisters = MockRegisters::new(3);
        static $idle: IrqIdle = IrqIdle::new(fire);
        static $timer: MockTimer = Timer::new(&$regs, &$idle, CLOCK_20M);
        static VECTORS: r8c_m120an::VectorTable =
            r8c_m120an::VectorTable::new(on_break).bind(r8c_m120an::TIMER_RB2, &$timer);

        fn on_break() {}

        fn fire() {
            $regs.underflow();
            VECTORS.dispatch(r8c_m120an::TIMER_RB2);
        }
    };
}

macro_rules! counter {
    ($calls:ident, $callback:ident) => {
        static $calls: AtomicU32 = AtomicU32::new(0);

        fn $callback() {
            $calls.fetch_add(1, Ordering::SeqCst);
        }
    };
}

#[test]
fn start_programs_the_hardware() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(60, 2).unwrap();

    assert_eq!(REGS.power_ups.load(Ordering::SeqCst), 1);
    assert!(REGS.is_running());
    assert_eq!(REGS.priority(), 2);
    // f8, 333_333 / 8 - 1
    assert_eq!(REGS.select.load(Ordering::SeqCst), 0b001);
    assert_eq!(REGS.reload.load(Ordering::SeqCst), 41_665);
    assert!(TIMER.is_armed());
    assert_eq!(TIMER.reload(), Some(41_665));
    assert_eq!(TIMER.frequency(), Some(60));
    assert_eq!(TIMER.plan().map(|p| p.tap()), Some(3));
}

#[test]
fn interrupt_mode_counts_every_tick() {
    fixture!(REGS, IDLE, TIMER);
    counter!(CALLS, on_tick);

    TIMER.start(60, 1).unwrap();
    TIMER.set_callback(Some(on_tick));

    let before = TIMER.ticks();
    for _ in 0..100 {
        TIMER.synchronize();
    }

    assert_eq!(TIMER.ticks().wrapping_sub(before), 100);
    assert_eq!(IDLE.waits(), 100);
    assert_eq!(CALLS.load(Ordering::SeqCst), 100);
    assert!(!REGS.pending.load(Ordering::SeqCst));
}

#[test]
fn polling_mode_counts_every_tick() {
    fixture!(REGS, IDLE, TIMER);
    counter!(CALLS, on_tick);

    TIMER.start(60, 0).unwrap();
    TIMER.set_callback(Some(on_tick));
    assert!(!TIMER.is_armed());
    assert_eq!(REGS.priority(), 0);

    let before = TIMER.ticks();
    for _ in 0..100 {
        TIMER.synchronize();
    }

    assert_eq!(TIMER.ticks().wrapping_sub(before), 100);
    // spins on the flag, never sleeps, never runs the interrupt callback
    assert_eq!(IDLE.waits(), 0);
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    assert!(!REGS.pending.load(Ordering::SeqCst));
}

#[test]
fn both_modes_share_one_counter() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(1000, 1).unwrap();
    for _ in 0..100 {
        TIMER.synchronize();
    }
    TIMER.start(1000, 0).unwrap();
    for _ in 0..100 {
        TIMER.synchronize();
    }

    assert_eq!(TIMER.ticks(), 200);
    assert_eq!(IDLE.waits(), 100);
    assert!(REGS.is_running());
}

#[test]
fn synchronize_waits_for_a_fresh_tick() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(60, 1).unwrap();

    // A tick lands just before the call
    REGS.underflow();
    TIMER.service();
    assert_eq!(TIMER.ticks(), 1);

    TIMER.synchronize();
    assert_eq!(TIMER.ticks(), 2);
    assert_eq!(IDLE.waits(), 1);
}

#[test]
fn failed_start_leaves_timer_stopped() {
    fixture!(REGS, IDLE, TIMER);
    counter!(CALLS, on_tick);

    TIMER.start(60, 1).unwrap();
    TIMER.set_callback(Some(on_tick));

    assert_eq!(
        TIMER.start(20_000_000, 1),
        Err(UnattainableFrequency { target_hz: 20_000_000 })
    );
    assert!(!REGS.is_running());
    assert_eq!(REGS.priority(), 0);
    assert!(!TIMER.is_armed());
    assert_eq!(TIMER.plan(), None);
    assert_eq!(TIMER.ticks_for_ms(100), 0);

    // callback was reset along with the rest of the configuration
    TIMER.service();
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);

    assert!(TIMER.start(2, 1).is_err());
    assert!(TIMER.start(0, 1).is_err());
}

#[test]
fn restart_clears_the_callback() {
    fixture!(REGS, IDLE, TIMER);
    counter!(CALLS, on_tick);

    TIMER.start(60, 1).unwrap();
    TIMER.set_callback(Some(on_tick));
    TIMER.synchronize();
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    TIMER.start(120, 1).unwrap();
    TIMER.synchronize();
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    TIMER.set_callback(Some(on_tick));
    TIMER.synchronize();
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);

    TIMER.set_callback(None);
    TIMER.synchronize();
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    assert_eq!(TIMER.ticks(), 4);
}

#[test]
fn stop_is_idempotent() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(1000, 1).unwrap();
    for _ in 0..5 {
        TIMER.synchronize();
    }

    TIMER.stop();
    let ticks = TIMER.ticks();
    assert!(!REGS.is_running());
    assert_eq!(REGS.priority(), 0);
    assert!(!TIMER.is_armed());

    TIMER.stop();
    assert_eq!(TIMER.ticks(), ticks);
    assert!(!REGS.is_running());
    assert_eq!(REGS.priority(), 0);
    assert!(!TIMER.is_armed());
    assert_eq!(TIMER.frequency(), Some(1000));
}

#[test]
fn read_counter_retries_torn_reads() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(1000, 1).unwrap();

    // low byte wrapped between the two halves of a read
    REGS.script_counts(&[0x00FF, 0x01FF, 0x0100, 0x0100]);
    assert_eq!(TIMER.read_counter(), 0x0100);
    assert_eq!(REGS.count_reads.load(Ordering::SeqCst), 4);

    // stable value costs exactly two reads
    assert_eq!(TIMER.read_counter(), 19_999);
    assert_eq!(REGS.count_reads.load(Ordering::SeqCst), 6);
}

#[test]
fn set_frequency_keeps_arming_and_callback() {
    fixture!(REGS, IDLE, TIMER);
    counter!(CALLS, on_tick);

    TIMER.start(60, 1).unwrap();
    TIMER.set_callback(Some(on_tick));

    TIMER.set_frequency(1000).unwrap();
    assert!(TIMER.is_armed());
    assert!(REGS.is_running());
    assert_eq!(REGS.priority(), 1);
    assert_eq!(REGS.select.load(Ordering::SeqCst), 0b000);
    assert_eq!(TIMER.reload(), Some(19_999));

    TIMER.synchronize();
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    // a failed retune changes nothing
    assert!(TIMER.set_frequency(1).is_err());
    assert_eq!(TIMER.frequency(), Some(1000));
    assert_eq!(REGS.reload.load(Ordering::SeqCst), 19_999);
}

#[test]
fn set_frequency_leaves_a_stopped_timer_stopped() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(60, 1).unwrap();
    TIMER.stop();

    TIMER.set_frequency(1000).unwrap();
    assert!(!REGS.is_running());
    assert!(!TIMER.is_running());
    assert!(!TIMER.is_armed());
    assert_eq!(REGS.reload.load(Ordering::SeqCst), 19_999);
    assert_eq!(TIMER.frequency(), Some(1000));

    // never started successfully
    assert!(TIMER.start(1, 1).is_err());
    TIMER.set_frequency(60).unwrap();
    assert!(!REGS.is_running());
    assert!(!TIMER.is_running());

    TIMER.start(60, 0).unwrap();
    assert!(TIMER.is_running());
    TIMER.set_frequency(1000).unwrap();
    assert!(REGS.is_running());
    assert!(TIMER.is_running());
}

#[test]
fn delay_counts_whole_ticks() {
    fixture!(REGS, IDLE, TIMER);

    assert_eq!(TIMER.ticks_for_ms(1000), 0);

    TIMER.start(1000, 0).unwrap();
    TIMER.delay().delay_ms(10u16);
    assert_eq!(TIMER.ticks(), 10);

    TIMER.start(60, 0).unwrap();
    TIMER.delay().delay_ms(1000u16);
    assert_eq!(TIMER.ticks(), 70);

    // rounds up to one full period
    TIMER.delay().delay_ms(1u8);
    assert_eq!(TIMER.ticks(), 71);
}

#[test]
fn tick_counter_wraps() {
    fixture!(REGS, IDLE, TIMER);

    TIMER.start(1000, 0).unwrap();
    let start = TIMER.ticks();
    let mut last = start;
    for _ in 0..(u16::MAX as u32 + 6) {
        TIMER.synchronize();
        let now = TIMER.ticks();
        assert_ne!(now, last);
        last = now;
    }
    assert_eq!(TIMER.ticks(), start.wrapping_add(5));
}
