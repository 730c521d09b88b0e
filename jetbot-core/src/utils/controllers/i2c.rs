//! I2C motor driver for the JetBot motor board.
//!
//! This module translates a logical `(motor, speed)` request into the two raw
//! register writes the board understands, and owns the bus handle for the
//! lifetime of the driver. Opening the driver configures the PWM frequency.

use core::fmt;

use embedded_hal::i2c::I2c;
use serde::{Deserialize, Serialize};

use super::registers;

/// Errors that can occur when driving the motor board.
#[derive(Debug)]
pub enum DeviceError<E: fmt::Debug> {
    /// The underlying bus transfer failed.
    I2cError(E),
    /// Speed magnitude above 255 while running with [`SpeedPolicy::Reject`].
    SpeedOutOfRange(i16),
}

/// Raw motor selector that is neither 1 nor 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMotor(pub u8);

impl fmt::Display for InvalidMotor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "invalid motor selector {}, expected 1 or 2", self.0)
    }
}

/// One of the two motor channels on the board.
///
/// Serialized as the raw selector `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Motor {
    M1,
    M2,
}

impl Motor {
    /// Magnitude register of this motor's register pair.
    pub const fn pwm_register(self) -> u8 {
        match self {
            Motor::M1 => registers::PWM_A,
            Motor::M2 => registers::PWM_B,
        }
    }

    /// Direction register of this motor's register pair.
    pub const fn direction_register(self) -> u8 {
        self.pwm_register() + registers::DIRECTION_OFFSET
    }
}

impl TryFrom<u8> for Motor {
    type Error = InvalidMotor;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Motor::M1),
            2 => Ok(Motor::M2),
            other => Err(InvalidMotor(other)),
        }
    }
}

impl From<Motor> for u8 {
    fn from(motor: Motor) -> u8 {
        match motor {
            Motor::M1 => 1,
            Motor::M2 => 2,
        }
    }
}

/// Rotation direction code written to a direction register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Forward = 0x01,
    Reverse = 0x02,
}

impl Direction {
    /// Only strictly positive speeds run forward; zero maps to `Reverse`.
    pub const fn from_speed(speed: i16) -> Self {
        if speed > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// How speeds whose magnitude does not fit in one byte are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Clamp the magnitude to 255.
    #[default]
    Saturate,
    /// Refuse the command without touching the bus.
    Reject,
}

impl SpeedPolicy {
    /// Magnitude byte for `speed`, or `None` if the policy refuses it.
    pub fn magnitude(
        self,
        speed: i16,
    ) -> Option<u8> {
        let abs = speed.unsigned_abs();
        match self {
            SpeedPolicy::Saturate => Some(abs.min(u16::from(registers::MAX_MAGNITUDE)) as u8),
            SpeedPolicy::Reject => u8::try_from(abs).ok(),
        }
    }
}

/// Driver configuration, fixed once the driver is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// 7-bit I2C address of the board.
    pub address: u8,
    /// Value written to `PWM_FREQ` on open.
    pub pwm_frequency: u8,
    pub speed_policy: SpeedPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: registers::DEVICE_ADDRESS,
            pwm_frequency: registers::PWM_FREQ_100HZ,
            speed_policy: SpeedPolicy::Saturate,
        }
    }
}

/// The two register writes that make up one speed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedWrite {
    pub motor: Motor,
    pub magnitude: u8,
    pub direction: Direction,
}

impl SpeedWrite {
    /// Encode a speed command, or `None` if `policy` rejects the speed.
    pub fn new(
        motor: Motor,
        speed: i16,
        policy: SpeedPolicy,
    ) -> Option<Self> {
        Some(Self {
            motor,
            magnitude: policy.magnitude(speed)?,
            direction: Direction::from_speed(speed),
        })
    }

    /// `[register, value]` payloads in bus order: magnitude, then direction.
    pub fn transactions(&self) -> [[u8; 2]; 2] {
        [
            [self.motor.pwm_register(), self.magnitude],
            [self.motor.direction_register(), self.direction as u8],
        ]
    }
}

/// Motor command variants accepted by the driver.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum MotorCommand {
    /// Set one motor's signed speed.
    Set { m: Motor, s: i16 },
    /// Set motor 1 to `a` and motor 2 to `b`.
    Pair { a: i16, b: i16 },
    /// Stop one motor, or both when `m` is omitted.
    Stop {
        #[serde(default)]
        m: Option<Motor>,
    },
}

/// Driver for the two-channel motor board, owning its bus handle.
pub struct MotorDriver<I2C> {
    i2c: I2C,
    config: DriverConfig,
}

impl<I2C, E> MotorDriver<I2C>
where
    I2C: I2c<Error = E>,
    E: fmt::Debug,
{
    /// Open the driver and configure the PWM frequency.
    ///
    /// The frequency register is written exactly once, here. No speed command
    /// can be issued before this succeeds.
    pub fn new(
        i2c: I2C,
        config: DriverConfig,
    ) -> Result<Self, DeviceError<E>> {
        let mut driver = MotorDriver { i2c, config };
        driver.write_register(registers::PWM_FREQ, config.pwm_frequency)?;
        tracing::info!(
            "Motor driver at 0x{:02X} opened, PWM frequency selector 0x{:02X}",
            config.address,
            config.pwm_frequency
        );
        Ok(driver)
    }

    /// Release the bus handle. Motors keep their last commanded state.
    pub fn release(self) -> I2C {
        tracing::info!("Motor driver at 0x{:02X} released", self.config.address);
        self.i2c
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Set `motor` to a signed speed: magnitude `|speed|`, direction from the sign.
    ///
    /// The magnitude register is written first, then the direction register.
    /// If the first write fails the second is not attempted.
    pub fn set_motor_speed(
        &mut self,
        motor: Motor,
        speed: i16,
    ) -> Result<(), DeviceError<E>> {
        let policy = self.config.speed_policy;
        let write =
            SpeedWrite::new(motor, speed, policy).ok_or(DeviceError::SpeedOutOfRange(speed))?;
        if u16::from(write.magnitude) != speed.unsigned_abs() {
            tracing::warn!(?motor, speed, "speed saturated to {}", write.magnitude);
        }

        for [register, value] in write.transactions() {
            self.write_register(register, value)?;
        }
        Ok(())
    }

    /// Set both motors, motor 1 first.
    pub fn set_speeds(
        &mut self,
        m1: i16,
        m2: i16,
    ) -> Result<(), DeviceError<E>> {
        self.set_motor_speed(Motor::M1, m1)?;
        self.set_motor_speed(Motor::M2, m2)
    }

    /// Zero a motor's magnitude. The board has no brake state.
    pub fn stop(
        &mut self,
        motor: Motor,
    ) -> Result<(), DeviceError<E>> {
        self.set_motor_speed(motor, 0)
    }

    pub fn stop_all(&mut self) -> Result<(), DeviceError<E>> {
        self.set_speeds(0, 0)
    }

    /// Execute a high-level `MotorCommand`.
    pub fn execute_command(
        &mut self,
        command: MotorCommand,
    ) -> Result<(), DeviceError<E>> {
        match command {
            MotorCommand::Set { m, s } => self.set_motor_speed(m, s),
            MotorCommand::Pair { a, b } => self.set_speeds(a, b),
            MotorCommand::Stop { m: Some(m) } => self.stop(m),
            MotorCommand::Stop { m: None } => self.stop_all(),
        }
    }

    fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), DeviceError<E>> {
        tracing::debug!("write 0x{:02X} <- 0x{:02X}", register, value);
        self.i2c
            .write(self.config.address, &[register, value])
            .map_err(DeviceError::I2cError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_forward_only_for_positive_speeds() {
        for speed in [1, 100, 255, 300, i16::MAX] {
            assert_eq!(Direction::from_speed(speed), Direction::Forward);
        }
        for speed in [0, -1, -255, -300, i16::MIN] {
            assert_eq!(Direction::from_speed(speed), Direction::Reverse);
        }
        assert_eq!(Direction::Forward as u8, 0x01);
        assert_eq!(Direction::Reverse as u8, 0x02);
    }

    #[test]
    fn saturate_clamps_magnitude() {
        let p = SpeedPolicy::Saturate;
        assert_eq!(p.magnitude(0), Some(0));
        assert_eq!(p.magnitude(-50), Some(50));
        assert_eq!(p.magnitude(255), Some(255));
        assert_eq!(p.magnitude(-256), Some(255));
        assert_eq!(p.magnitude(i16::MIN), Some(255));
    }

    #[test]
    fn reject_refuses_wide_magnitude() {
        let p = SpeedPolicy::Reject;
        assert_eq!(p.magnitude(-255), Some(255));
        assert_eq!(p.magnitude(256), None);
        assert_eq!(p.magnitude(i16::MIN), None);
    }

    #[test]
    fn motor_selector_is_validated() {
        assert_eq!(Motor::try_from(1), Ok(Motor::M1));
        assert_eq!(Motor::try_from(2), Ok(Motor::M2));
        assert_eq!(Motor::try_from(0), Err(InvalidMotor(0)));
        assert_eq!(Motor::try_from(3), Err(InvalidMotor(3)));
    }

    #[test]
    fn register_pairs() {
        assert_eq!(Motor::M1.pwm_register(), 0x02);
        assert_eq!(Motor::M1.direction_register(), 0x03);
        assert_eq!(Motor::M2.pwm_register(), 0x03);
        assert_eq!(Motor::M2.direction_register(), 0x04);
    }

    #[test]
    fn speed_write_transactions() {
        let w = SpeedWrite::new(Motor::M2, -50, SpeedPolicy::Saturate).unwrap();
        assert_eq!(w.transactions(), [[0x03, 50], [0x04, 0x02]]);
        assert!(SpeedWrite::new(Motor::M1, 400, SpeedPolicy::Reject).is_none());
    }

    #[test]
    fn default_config() {
        let c = DriverConfig::default();
        assert_eq!(c.address, 0x14);
        assert_eq!(c.pwm_frequency, 0x64);
        assert_eq!(c.speed_policy, SpeedPolicy::Saturate);
    }
}
