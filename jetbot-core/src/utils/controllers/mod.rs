//! Module Exports
//!
//! This file exports the motor board controllers.
//!
//! - `registers`: register map and fixed values of the board.
//! - `i2c`: the single-owner `MotorDriver` and its command types.
//!
//! `SystemController` shares one driver between callers and makes each
//! two-register speed transaction atomic with respect to the others.

/// Module for driving the motor board over I2C.
pub mod i2c;
pub mod registers;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embedded_hal::i2c::I2c;

pub use i2c::{DeviceError, DriverConfig, Motor, MotorCommand, MotorDriver, SpeedPolicy};

pub struct SystemController<I2C> {
    driver: Mutex<CriticalSectionRawMutex, RefCell<MotorDriver<I2C>>>,
}

impl<I2C, E> SystemController<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    /// Open the motor board at `address` (default `0x14`) with the given speed
    /// policy (default saturate). Fails if the frequency write fails.
    pub fn new(
        i2c: I2C,
        address: Option<u8>,
        speed_policy: Option<SpeedPolicy>,
    ) -> Result<Self, DeviceError<E>> {
        let config = DriverConfig {
            address: address.unwrap_or(registers::DEVICE_ADDRESS),
            speed_policy: speed_policy.unwrap_or_default(),
            ..DriverConfig::default()
        };

        Ok(Self::from_driver(MotorDriver::new(i2c, config)?))
    }

    pub fn from_driver(driver: MotorDriver<I2C>) -> Self {
        SystemController {
            driver: Mutex::new(RefCell::new(driver)),
        }
    }

    /// Run `f` with exclusive access to the driver.
    pub fn with_driver<R>(
        &self,
        f: impl FnOnce(&mut MotorDriver<I2C>) -> R,
    ) -> R {
        self.driver.lock(|driver| {
            let mut driver = driver.borrow_mut();
            f(&mut *driver)
        })
    }

    /// Set a motor's speed; both register writes happen under one lock.
    pub fn set_motor_speed(
        &self,
        motor: Motor,
        speed: i16,
    ) -> Result<(), DeviceError<E>> {
        self.with_driver(|driver| driver.set_motor_speed(motor, speed))
    }

    /// Execute a command under the lock and log its outcome.
    ///
    /// A `pair` or `stop` command covering both motors is atomic as a whole.
    pub fn execute(
        &self,
        command: MotorCommand,
    ) -> Result<(), DeviceError<E>> {
        tracing::info!("Received motor command: {:?}", command);
        let result = self.with_driver(|driver| driver.execute_command(command));
        match &result {
            Ok(()) => tracing::info!("Motor command executed successfully"),
            Err(e) => tracing::error!("Motor command failed: {:?}", e),
        }
        result
    }

    /// Tear down the controller and hand the bus back.
    pub fn release(self) -> I2C {
        self.driver.into_inner().into_inner().release()
    }
}
