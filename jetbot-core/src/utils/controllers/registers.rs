//! Register map of the JetBot motor board.
//!
//! Every register is a single byte addressed by a one-byte index. The motor
//! pairs are laid out as `(magnitude, direction)` with the direction register
//! at `magnitude + 1`.

/// Default 7-bit I2C address of the motor board.
pub const DEVICE_ADDRESS: u8 = 0x14;

pub const MODE1: u8 = 0x00;
pub const MODE2: u8 = 0x01;
/// Motor 1 magnitude; motor 1 direction lives at `PWM_A + 1`.
pub const PWM_A: u8 = 0x02;
/// Motor 2 magnitude. Shares its index with motor 1's direction register.
pub const PWM_B: u8 = 0x03;
/// PWM frequency selector.
pub const PWM_FREQ: u8 = 0xFE;

/// Frequency selector value for 100 Hz.
pub const PWM_FREQ_100HZ: u8 = 0x64;

/// Largest magnitude the board accepts.
pub const MAX_MAGNITUDE: u8 = u8::MAX;

/// Offset of the direction register from its magnitude register.
pub const DIRECTION_OFFSET: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_two_magnitude_aliases_motor_one_direction() {
        assert_eq!(PWM_B, PWM_A + DIRECTION_OFFSET);
        assert_eq!(PWM_B + DIRECTION_OFFSET, 0x04);
    }

    #[test]
    fn mode_and_frequency_registers() {
        assert_eq!(MODE1, 0x00);
        assert_eq!(MODE2, 0x01);
        assert_eq!(PWM_FREQ, 0xFE);
        assert_eq!(PWM_FREQ_100HZ, 100);
    }
}
