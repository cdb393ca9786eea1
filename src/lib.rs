//! Periodic timer core and build-time interrupt dispatch for small MCUs.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod config;
pub mod drivers;
pub mod hal;
pub mod vectors;
