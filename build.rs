use std::env;

const DEFAULT_MCU_FREQ_HZ: u32 = 16_000_000;

fn main() {
    println!("cargo:rerun-if-env-changed=MCU_FREQ_HZ");

    // The timer divider arithmetic needs the system clock; refuse to build without a usable one.
    let freq = match env::var("MCU_FREQ_HZ") {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(hz) if hz > 0 => hz,
            _ => panic!("MCU_FREQ_HZ must be a positive integer in Hz, got {raw:?}"),
        },
        Err(_) => DEFAULT_MCU_FREQ_HZ,
    };

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ={freq}");

    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega128");
        println!("cargo:warning=Building for ATmega128 at {freq} Hz");
    }
}
