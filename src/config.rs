/// Lift detection height.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LiftCutoff {
    #[default]
    Mm2 = 0b10,
    Mm3 = 0b11,
}

/// Settings written once during initialization, besides the resolution
/// which is passed to `initialize` directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub lift_cutoff: LiftCutoff,
    /// Frames below this SQUAL do not report motion
    pub min_squal_run: u8,
    /// Minimum number of valid features for a frame to count
    pub raw_data_threshold: u8,
    /// Camera angle, two's complement degrees
    pub angle_tune: u8,
    pub angle_snap: bool,
    /// Wait between the address and data phase of a read.
    ///
    /// The datasheet asks for 160us (tSRAD). Set to 0 to clock the data
    /// phase right after the address.
    pub read_address_wait_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lift_cutoff: LiftCutoff::default(),
            min_squal_run: 0x10,
            raw_data_threshold: 0x0A,
            angle_tune: 0,
            angle_snap: false,
            read_address_wait_us: 160,
        }
    }
}

impl Config {
    pub(crate) fn angle_snap_bits(&self) -> u8 {
        if self.angle_snap {
            0x80
        } else {
            0x00
        }
    }
}
