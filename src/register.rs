#![allow(dead_code)]

use bitflags::bitflags;

/// Set on the address byte of every write transaction
pub const WRITE_BIT: u8 = 0x80;

/// Highest register address; the top bit of the address byte is reserved for [WRITE_BIT]
pub const MAX_ADDRESS: u8 = 0x7F;

/// Product identification, reads 0x47
pub const PRODUCT_ID: u8 = 0x00;
/// Product revision
pub const REVISION_ID: u8 = 0x01;

/// Motion status, also latches the delta registers when read
pub const MOTION: u8 = 0x02;
/// X movement since the last report (LSB)
pub const DELTA_X_L: u8 = 0x03;
/// X movement since the last report (MSB)
pub const DELTA_X_H: u8 = 0x04;
/// Y movement since the last report (LSB)
pub const DELTA_Y_L: u8 = 0x05;
/// Y movement since the last report (MSB)
pub const DELTA_Y_H: u8 = 0x06;

/// Surface quality
pub const SQUAL: u8 = 0x07;
pub const RAW_DATA_SUM: u8 = 0x08;
pub const MAXIMUM_RAW_DATA: u8 = 0x09;
pub const MINIMUM_RAW_DATA: u8 = 0x0A;
pub const SHUTTER_LOWER: u8 = 0x0B;
pub const SHUTTER_UPPER: u8 = 0x0C;

/// Resolution, 16 bits split over two registers. Bring-up only writes
/// the high byte.
pub const RESOLUTION_L: u8 = 0x0E;
pub const RESOLUTION_H: u8 = 0x0F;

/// Rest mode and resolution mode
pub const CONFIG2: u8 = 0x10;
/// Camera angle
pub const ANGLE_TUNE: u8 = 0x11;
pub const FRAME_CAPTURE: u8 = 0x12;
/// SROM download and CRC control
pub const SROM_ENABLE: u8 = 0x13;

pub const RUN_DOWNSHIFT: u8 = 0x14;
pub const REST1_RATE_LOWER: u8 = 0x15;
pub const REST1_RATE_UPPER: u8 = 0x16;
pub const REST1_DOWNSHIFT: u8 = 0x17;
pub const REST2_RATE_LOWER: u8 = 0x18;
pub const REST2_RATE_UPPER: u8 = 0x19;
pub const REST2_DOWNSHIFT: u8 = 0x1A;
pub const REST3_RATE_LOWER: u8 = 0x1B;
pub const REST3_RATE_UPPER: u8 = 0x1C;

pub const OBSERVATION: u8 = 0x24;
pub const DATA_OUT_LOWER: u8 = 0x25;
pub const DATA_OUT_UPPER: u8 = 0x26;

/// Version of the running firmware, zero until an SROM has been loaded
pub const SROM_ID: u8 = 0x2A;
/// Minimum SQUAL for motion to be reported
pub const MIN_SQ_RUN: u8 = 0x2B;
/// Minimum number of valid features
pub const RAW_DATA_THRESHOLD: u8 = 0x2C;

/// Writing [POWER_UP_RESET_CODE] here reboots the chip
pub const POWER_UP_RESET: u8 = 0x3A;
/// Writing [SHUTDOWN_CODE] here powers the chip down
pub const SHUTDOWN: u8 = 0x3B;
/// Bitwise inverse of [PRODUCT_ID], reads 0xB8
pub const INVERSE_PRODUCT_ID: u8 = 0x3F;
pub const ANGLE_SNAP: u8 = 0x42;

pub const MOTION_BURST: u8 = 0x50;
/// Burst target for the firmware image
pub const SROM_LOAD_BURST: u8 = 0x62;
/// Lift detection height
pub const LIFT_CONFIG: u8 = 0x63;

pub const SHUTDOWN_CODE: u8 = 0xB6;
pub const POWER_UP_RESET_CODE: u8 = 0x5A;

/// Config2 pattern required before the SROM can be downloaded
pub const CONFIG2_SROM_DOWNLOAD: u8 = 0x20;
/// Config2 with rest mode off and a single resolution for both axes
pub const CONFIG2_REST_DISABLED: u8 = 0x00;

pub const SROM_ENABLE_START: u8 = 0x1D;
pub const SROM_ENABLE_CONFIRM: u8 = 0x18;

pub const EXPECTED_PRODUCT_ID: u8 = 0x47;
pub const EXPECTED_INVERSE_PRODUCT_ID: u8 = 0xB8;

/// Registers that have to be read once after a power-up reset,
/// in this order, to clear the motion latch.
pub const POST_RESET_LATCH: [u8; 5] = [MOTION, DELTA_X_L, DELTA_X_H, DELTA_Y_L, DELTA_Y_H];

bitflags! {
    /// Status bits of the [MOTION] register.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MotionStatus: u8 {
        /// Motion occurred since the last read
        const MOTION          = 0b1000_0000;
        /// Chip is lifted off the surface
        const LIFTED          = 0b0000_1000;
        /// Current operating mode (run, rest1, rest2, rest3)
        const OP_MODE         = 0b0000_0110;
        /// Set on the first pixel of a frame capture
        const FRAME_PIX_FIRST = 0b0000_0001;
    }
}

impl MotionStatus {
    pub fn has_motion(&self) -> bool {
        self.contains(MotionStatus::MOTION)
    }

    pub fn is_lifted(&self) -> bool {
        self.contains(MotionStatus::LIFTED)
    }

    /// 0 = run, 1..=3 = rest modes
    pub fn operating_mode(&self) -> u8 {
        (self.bits() & MotionStatus::OP_MODE.bits()) >> 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_status_decoding() {
        let status = MotionStatus::from_bits_retain(0b1000_1100);
        assert!(status.has_motion());
        assert!(status.is_lifted());
        assert_eq!(status.operating_mode(), 2);

        let idle = MotionStatus::from_bits_retain(0x00);
        assert!(!idle.has_motion());
        assert_eq!(idle.operating_mode(), 0);
    }

    #[test]
    fn test_inverse_product_id_matches() {
        assert_eq!(!EXPECTED_PRODUCT_ID, EXPECTED_INVERSE_PRODUCT_ID);
    }

    #[test]
    fn test_write_framing_cannot_collide_with_addresses() {
        assert_eq!(MAX_ADDRESS & WRITE_BIT, 0);
        assert_eq!(SROM_LOAD_BURST | WRITE_BIT, 0xE2);
    }
}
