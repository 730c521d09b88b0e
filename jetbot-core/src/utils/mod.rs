//! Utility re-exports and helper macros for the JetBot motor board.
//!
//! - `controllers`: register map, I2C motor driver and the shared controller
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod controllers;

pub use controllers::i2c::{
    DeviceError, Direction, DriverConfig, InvalidMotor, Motor, MotorDriver, SpeedPolicy, SpeedWrite,
};
pub use controllers::{MotorCommand, SystemController};

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::__static_cell::StaticCell<$t> =
            $crate::__static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
