//! ATmega128 16-bit Timer/Counter 1 and 3 in CTC mode on OCRnA.
//!
//! The hardware counts up from zero to OCRnA; `count` reports the remaining
//! clocks so the driver sees a down-counter like on other parts.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use avr_device::atmega128a::{TC1, TC3};

use super::divider::{DividerTable, ATMEGA128_TC16};
use super::timer::TimerRegisters;

const WGM_N2: u8 = 1 << 3;
const CS_MASK: u8 = 0x07;
// OCIEnA in TIMSK/ETIMSK and OCFnA in TIFR/ETIFR
const OCIE_A: u8 = 1 << 4;
const OCF_A: u8 = 1 << 4;

/// One 16-bit timer, `T` being its register block.
pub struct Tc16<T> {
    select: AtomicU8,
    reload: AtomicU16,
    _timer: PhantomData<fn() -> T>,
}

impl<T> Tc16<T> {
    const fn new() -> Self {
        Self {
            select: AtomicU8::new(0),
            reload: AtomicU16::new(0),
            _timer: PhantomData,
        }
    }
}

impl Tc16<TC1> {
    pub const fn timer1() -> Self {
        Self::new()
    }
}

impl Tc16<TC3> {
    pub const fn timer3() -> Self {
        Self::new()
    }
}

// TC1 and TC3 have the same layout under different register names; the
// interrupt mask and flag of TC3 live in the extended ETIMSK/ETIFR.
macro_rules! tc16_registers {
    ($timer:ident, $tccra:ident, $tccrb:ident, $tcnt:ident, $ocra:ident, $timsk:ident, $tifr:ident) => {
        impl TimerRegisters for Tc16<$timer> {
            const DIVIDERS: &'static DividerTable = &ATMEGA128_TC16;

            fn set_running(&self, running: bool) {
                let cs = if running {
                    self.select.load(Ordering::Relaxed) & CS_MASK
                } else {
                    0
                };
                unsafe {
                    let p = $timer::ptr();
                    (*p).$tccrb.modify(|r, w| w.bits((r.bits() & !CS_MASK) | cs));
                }
            }

            fn set_mode(&self, select: u8) {
                self.select.store(select, Ordering::Relaxed);
                // WGM = 4: clear timer on compare match with OCRnA
                unsafe {
                    let p = $timer::ptr();
                    (*p).$tccra.write(|w| w.bits(0));
                    (*p).$tccrb.write(|w| w.bits(WGM_N2));
                }
            }

            fn set_reload(&self, reload: u16) {
                self.reload.store(reload, Ordering::Relaxed);
                // 16-bit registers share the TEMP latch with the other timers
                avr_device::interrupt::free(|_| unsafe {
                    let p = $timer::ptr();
                    (*p).$ocra.write(|w| w.bits(reload));
                    (*p).$tcnt.write(|w| w.bits(0));
                })
            }

            fn set_interrupt(&self, priority: u8) {
                // AVR priorities are fixed by vector position; any level just enables.
                avr_device::interrupt::free(|_| unsafe {
                    let p = $timer::ptr();
                    (*p).$timsk.modify(|r, w| {
                        if priority != 0 {
                            w.bits(r.bits() | OCIE_A)
                        } else {
                            w.bits(r.bits() & !OCIE_A)
                        }
                    });
                })
            }

            fn pending(&self) -> bool {
                unsafe { (*$timer::ptr()).$tifr.read().bits() & OCF_A != 0 }
            }

            fn clear_pending(&self) {
                // write-one-to-clear, other flags untouched
                unsafe { (*$timer::ptr()).$tifr.write(|w| w.bits(OCF_A)) }
            }

            fn count(&self) -> u16 {
                let reload = self.reload.load(Ordering::Relaxed);
                let tcnt = avr_device::interrupt::free(|_| unsafe {
                    (*$timer::ptr()).$tcnt.read().bits()
                });
                reload.saturating_sub(tcnt)
            }
        }
    };
}

tc16_registers!(TC1, tccr1a, tccr1b, tcnt1, ocr1a, timsk, tifr);
tc16_registers!(TC3, tccr3a, tccr3b, tcnt3, ocr3a, etimsk, etifr);
