//! Frequency to prescaler/reload resolution for down-counting timers.

use core::fmt;

/// System clock feeding the timer prescalers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    hz: u32,
}

impl ClockConfig {
    /// Panics (at compile time when used in a const) on a zero clock.
    pub const fn from_hz(hz: u32) -> Self {
        assert!(hz > 0, "system clock must be non-zero");
        Self { hz }
    }

    #[inline]
    pub const fn hz(&self) -> u32 {
        self.hz
    }
}

/// One hardware-selectable prescaler ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tap {
    /// log2 of the division ratio
    pub shift: u8,
    /// Clock-select code written to the timer mode register
    pub select: u8,
}

impl Tap {
    pub const fn new(shift: u8, select: u8) -> Self {
        Self { shift, select }
    }

    #[inline]
    pub const fn ratio(&self) -> u32 {
        1 << self.shift
    }
}

/// Static description of the prescaler of one timer model.
///
/// Taps are in ascending ratio order. Ratios are not required to double from
/// one tap to the next; the resolver always shifts by the tap's absolute ratio.
#[derive(Debug)]
pub struct DividerTable {
    /// Largest period the counter can represent, i.e. `1 << width`.
    pub max_count: u32,
    pub taps: &'static [Tap],
}

/// R8C TimerRB (f1, f2, f4, f8, f32, f64, f128).
pub const R8C_TIMER_RB: DividerTable = DividerTable {
    max_count: 65536,
    taps: &[
        Tap::new(0, 0b000),
        Tap::new(1, 0b011),
        Tap::new(2, 0b100),
        Tap::new(3, 0b001),
        Tap::new(5, 0b101),
        Tap::new(6, 0b110),
        Tap::new(7, 0b111),
    ],
};

/// ATmega128 Timer1/Timer3, CS1x/CS3x bits.
pub const ATMEGA128_TC16: DividerTable = DividerTable {
    max_count: 65536,
    taps: &[
        Tap::new(0, 1),
        Tap::new(3, 2),
        Tap::new(6, 3),
        Tap::new(8, 4),
        Tap::new(10, 5),
    ],
};

/// ATmega128 Timer2, CS2x bits.
///
/// 8-bit counter: the same taps as Timer1 with a 256-clock period limit.
pub const ATMEGA128_TC2: DividerTable = DividerTable {
    max_count: 256,
    taps: &[
        Tap::new(0, 1),
        Tap::new(3, 2),
        Tap::new(6, 3),
        Tap::new(8, 4),
        Tap::new(10, 5),
    ],
};

/// The requested frequency cannot be produced from the clock with any tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnattainableFrequency {
    pub target_hz: u32,
}

impl fmt::Display for UnattainableFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unattainable timer frequency: {} Hz", self.target_hz)
    }
}

impl ufmt::uDisplay for UnattainableFrequency {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        ufmt::uwrite!(f, "unattainable timer frequency: {} Hz", self.target_hz)
    }
}

/// Prescaler tap and reload value for one timer period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DividerPlan {
    tap: u8,
    shift: u8,
    select: u8,
    reload: u16,
}

impl DividerPlan {
    /// Index into the divider table the plan was resolved against.
    #[inline]
    pub const fn tap(&self) -> u8 {
        self.tap
    }

    #[inline]
    pub const fn select(&self) -> u8 {
        self.select
    }

    #[inline]
    pub const fn ratio(&self) -> u32 {
        1 << self.shift
    }

    /// Value programmed into the reload register (period minus one).
    #[inline]
    pub const fn reload(&self) -> u16 {
        self.reload
    }

    /// Timer clocks per tick.
    #[inline]
    pub const fn period(&self) -> u32 {
        self.reload as u32 + 1
    }

    /// Tick rate the plan actually produces, truncated to whole Hz.
    pub const fn achieved_hz(&self, clock: ClockConfig) -> u32 {
        (clock.hz() >> self.shift) / self.period()
    }
}

/// Picks the smallest prescaler tap that fits `clock / target_hz` in the
/// counter, and the matching reload value.
pub fn resolve(
    clock: ClockConfig,
    target_hz: u32,
    table: &DividerTable,
) -> Result<DividerPlan, UnattainableFrequency> {
    let err = UnattainableFrequency { target_hz };
    if target_hz == 0 {
        return Err(err);
    }

    let base = clock.hz() / target_hz;
    let (index, tap, count) = table
        .taps
        .iter()
        .enumerate()
        .map(|(index, tap)| (index, tap, base >> tap.shift))
        .find(|&(_, _, count)| count <= table.max_count)
        .ok_or(err)?;

    // Hardware reloads count down to zero inclusive.
    let reload = count.checked_sub(1).filter(|&r| r != 0).ok_or(err)?;
    let reload = u16::try_from(reload).map_err(|_| err)?;

    Ok(DividerPlan {
        tap: index as u8,
        shift: tap.shift,
        select: tap.select,
        reload,
    })
}
