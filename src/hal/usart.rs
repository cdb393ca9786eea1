//! Polled USART0, 8N1.

use core::convert::Infallible;

use avr_device::atmega128a::USART0;
use embedded_hal::serial::{Read, Write};

// UCSZ01:UCSZ00 in UCSR0C
const UCSZ_8BIT: u8 = 0b11 << 1;

pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    pub fn new(clock_hz: u32, baud: u32) -> Self {
        let ubrr = (clock_hz / (16 * baud)).saturating_sub(1) as u16;
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0h.write(|w| w.bits((ubrr >> 8) as u8));
            (*p).ubrr0l.write(|w| w.bits(ubrr as u8));
            (*p).ucsr0c.write(|w| w.bits(UCSZ_8BIT));
            (*p).ucsr0b.write(|w| w.rxen0().set_bit().txen0().set_bit());
        }
        Self { _private: () }
    }

    #[inline]
    fn tx_ready(&self) -> bool {
        unsafe { (*USART0::ptr()).ucsr0a.read().udre0().bit_is_set() }
    }

    #[inline]
    fn rx_ready(&self) -> bool {
        unsafe { (*USART0::ptr()).ucsr0a.read().rxc0().bit_is_set() }
    }
}

impl Write<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if !self.tx_ready() {
            return Err(nb::Error::WouldBlock);
        }
        unsafe { (*USART0::ptr()).udr0.write(|w| w.bits(word)) };
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.tx_ready() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl Read<u8> for Usart0 {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if !self.rx_ready() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(unsafe { (*USART0::ptr()).udr0.read().bits() })
    }
}
