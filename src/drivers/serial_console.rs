use embedded_hal::serial::{Read, Write};

/// Line-oriented text output over any byte serial port.
///
/// Also implements [`ufmt::uWrite`], so `ufmt::uwriteln!` works on it.
pub struct SerialConsole<S> {
    serial: S,
}

impl<S> SerialConsole<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: Write<u8>> SerialConsole<S> {
    pub fn write_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        nb::block!(self.serial.write(byte))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), S::Error> {
        s.bytes().try_for_each(|b| self.write_byte(b))
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), S::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }

    // Debug helper - print hex value
    pub fn write_hex(&mut self, val: u8) -> Result<(), S::Error> {
        const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";
        self.write_byte(HEX_CHARS[(val >> 4) as usize])?;
        self.write_byte(HEX_CHARS[(val & 0xF) as usize])
    }

    // Print formatted debug info
    pub fn debug(&mut self, msg: &str, val: u8) -> Result<(), S::Error> {
        self.write_str("[DBG] ")?;
        self.write_str(msg)?;
        self.write_str(": 0x")?;
        self.write_hex(val)?;
        self.write_str("\r\n")
    }

    pub fn flush(&mut self) -> Result<(), S::Error> {
        nb::block!(self.serial.flush())
    }
}

impl<S: Read<u8>> SerialConsole<S> {
    /// Next received byte, if one is waiting.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.serial.read().ok()
    }
}

impl<S: Write<u8>> ufmt::uWrite for SerialConsole<S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        SerialConsole::write_str(self, s)
    }
}
