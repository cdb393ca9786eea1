//! Build-time interrupt vector dispatch.
//!
//! A [`VectorTable`] has one slot per hardware interrupt source. Every slot
//! starts out as the shared no-op stub; drivers that need interrupt service
//! are bound into exactly one slot while the table is assembled in a `static`
//! initializer:
//!
//! ```ignore
//! static TIMER_B: Timer<Tc16<TC1>, SleepIdle> = Timer::new(Tc16::timer1(), SleepIdle, SYSTEM_CLOCK);
//!
//! static VECTORS: VectorTable<{ atmega128::VECTOR_COUNT }> =
//!     VectorTable::new(on_break).bind(atmega128::TIMER1_COMPA, &TIMER_B);
//! ```
//!
//! Binding an out-of-range slot, slot 0, or a slot that is already bound fails
//! const evaluation, so a bad table never reaches the image.

pub mod atmega128;
pub mod r8c_m120an;

/// Interrupt-context entry point of a peripheral driver.
///
/// `service` runs with the interrupt's own vector masked. It must not block,
/// allocate, or wait on the timer it serves.
pub trait Service: Sync {
    fn service(&self);
}

/// Handler for vectors nobody claimed.
pub struct Stub;

impl Service for Stub {
    #[inline(always)]
    fn service(&self) {}
}

/// Contents of one vector slot.
#[derive(Clone, Copy)]
pub enum Vector {
    /// Slot 0: break / reset entry.
    Break(fn()),
    Stub(&'static Stub),
    Bound(&'static dyn Service),
}

impl Vector {
    /// Runs whatever the slot points at.
    #[inline]
    pub fn invoke(&self) {
        match self {
            Vector::Break(entry) => entry(),
            Vector::Stub(stub) => stub.service(),
            Vector::Bound(handler) => handler.service(),
        }
    }

    #[inline]
    pub const fn is_bound(&self) -> bool {
        matches!(self, Vector::Bound(_))
    }
}

/// Fixed-size interrupt dispatch table with `N` hardware vectors.
pub struct VectorTable<const N: usize> {
    slots: [Vector; N],
}

impl<const N: usize> VectorTable<N> {
    /// Table with every slot stubbed except slot 0, which runs `on_break`.
    pub const fn new(on_break: fn()) -> Self {
        assert!(N > 0, "vector table needs at least the break slot");
        let mut slots = [Vector::Stub(&Stub); N];
        slots[0] = Vector::Break(on_break);
        Self { slots }
    }

    /// Points `slot` at `handler`.
    pub const fn bind(mut self, slot: usize, handler: &'static dyn Service) -> Self {
        assert!(slot < N, "vector slot out of range");
        assert!(slot != 0, "slot 0 is reserved for the break entry");
        if let Vector::Bound(_) = self.slots[slot] {
            panic!("vector slot bound twice");
        }
        self.slots[slot] = Vector::Bound(handler);
        self
    }

    /// Called from the hardware trampoline for `slot`. Unknown slots are ignored.
    #[inline]
    pub fn dispatch(&self, slot: usize) {
        if let Some(vector) = self.slots.get(slot) {
            vector.invoke();
        }
    }

    #[inline]
    pub const fn get(&self, slot: usize) -> Option<&Vector> {
        if slot < N {
            Some(&self.slots[slot])
        } else {
            None
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Vector> {
        self.slots.iter()
    }

    /// Number of slots bound to a driver.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|v| v.is_bound()).count()
    }
}

impl<'a, const N: usize> IntoIterator for &'a VectorTable<N> {
    type Item = &'a Vector;
    type IntoIter = core::slice::Iter<'a, Vector>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Generates one AVR interrupt handler per listed vector, each forwarding to
/// `$table.dispatch(index)`.
///
/// ```ignore
/// dispatch_vectors!(VECTORS => TIMER1_COMPA, USART0_RX);
/// ```
#[cfg(target_arch = "avr")]
#[macro_export]
macro_rules! dispatch_vectors {
    ($table:path => $($name:ident),+ $(,)?) => {
        $(
            #[avr_device::interrupt(atmega128a)]
            #[allow(non_snake_case)]
            fn $name() {
                $table.dispatch($crate::vectors::atmega128::$name);
            }
        )+
    };
}
