//! Core driver for the JetBot two-channel DC motor board on no-std platforms.
//!
//! For a runnable host demo, see the `jetbot-app/mock-mcu` binary.
#![no_std]

pub mod utils;

#[doc(hidden)]
pub use static_cell as __static_cell;
