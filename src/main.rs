#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use core::sync::atomic::{AtomicU8, Ordering};

use avr_device::atmega128a::TC1;
use panic_halt as _;
use tick_firmware::config::{SYSTEM_CLOCK, TICK_HZ, TICK_IRQ_LEVEL, UART_BAUD};
use tick_firmware::dispatch_vectors;
use tick_firmware::drivers::SerialConsole;
use tick_firmware::hal::{SleepIdle, Tc16, Timer, Usart0};
use tick_firmware::vectors::atmega128::{self, VectorTable};

static TIMER1: Timer<Tc16<TC1>, SleepIdle> = Timer::new(Tc16::timer1(), SleepIdle, SYSTEM_CLOCK);

static VECTORS: VectorTable = VectorTable::new(on_break).bind(atmega128::TIMER1_COMPA, &TIMER1);

// Every peripheral vector goes through the table; unbound ones hit the stub.
dispatch_vectors!(VECTORS =>
    INT0, INT1, INT2, INT3, INT4, INT5, INT6, INT7,
    TIMER2_COMP, TIMER2_OVF,
    TIMER1_CAPT, TIMER1_COMPA, TIMER1_COMPB, TIMER1_OVF,
    TIMER0_COMP, TIMER0_OVF,
    SPI_STC, USART0_RX, USART0_UDRE, USART0_TX,
    ADC, EE_READY, ANALOG_COMP,
    TIMER1_COMPC, TIMER3_CAPT, TIMER3_COMPA, TIMER3_COMPB, TIMER3_COMPC, TIMER3_OVF,
    USART1_RX, USART1_UDRE, USART1_TX, TWI, SPM_READY,
);

static HEARTBEAT: AtomicU8 = AtomicU8::new(0);

fn on_break() {}

fn heartbeat() {
    let n = HEARTBEAT.load(Ordering::Relaxed);
    HEARTBEAT.store(n.wrapping_add(1), Ordering::Relaxed);
}

#[avr_device::entry]
fn main() -> ! {
    let dp = match avr_device::atmega128a::Peripherals::take() {
        Some(dp) => dp,
        None => loop {},
    };

    let mut console = SerialConsole::new(Usart0::new(SYSTEM_CLOCK.hz(), UART_BAUD));

    // LED on PB0, sinks current
    dp.PORTB.ddrb.write(|w| unsafe { w.bits(0x01) });

    let started = TIMER1.start(TICK_HZ, TICK_IRQ_LEVEL);
    TIMER1.set_callback(Some(heartbeat));

    unsafe { avr_device::interrupt::enable() };

    console.write_line("Start tick firmware").ok();
    if let Err(err) = started {
        ufmt::uwriteln!(console, "{}\r", err).ok();
        loop {
            avr_device::asm::sleep();
        }
    }
    if let Some(plan) = TIMER1.plan() {
        console.debug("Divider tap", plan.tap()).ok();
        ufmt::uwriteln!(console, "Reload: {}\r", plan.reload()).ok();
    }

    let mut phase: u8 = 0;
    let mut cycle: u8 = TICK_HZ as u8;
    loop {
        TIMER1.synchronize();

        let lit = phase < cycle / 3;
        dp.PORTB
            .portb
            .modify(|r, w| unsafe { w.bits(if lit { r.bits() & !0x01 } else { r.bits() | 0x01 }) });

        if let Some(byte) = console.read_byte() {
            console.write_byte(byte).ok();
            // any key toggles between 1 Hz and 2 Hz blinking
            cycle = if cycle == TICK_HZ as u8 { (TICK_HZ / 2) as u8 } else { TICK_HZ as u8 };
        }

        phase += 1;
        if phase >= cycle {
            phase = 0;
            ufmt::uwriteln!(
                console,
                "ticks={} heartbeat={} counter={}\r",
                TIMER1.ticks(),
                HEARTBEAT.load(Ordering::Relaxed),
                TIMER1.read_counter()
            )
            .ok();
        }
    }
}
