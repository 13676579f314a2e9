use esp_hal::gpio::GpioPin;

// SPI2
pub const SCK: u8 = 13;
pub type Sck = GpioPin<SCK>;
pub const MOSI: u8 = 11;
pub type Mosi = GpioPin<MOSI>;
pub const MISO: u8 = 12;
pub type Miso = GpioPin<MISO>;

// Chip select is driven as a plain GPIO so one transaction can span
// several transfers
pub const NCS: u8 = 10;
pub type Ncs = GpioPin<NCS>;

pub struct SensorPins {
    pub sck: Sck,
    pub mosi: Mosi,
    pub miso: Miso,
    pub ncs: Ncs,
}
