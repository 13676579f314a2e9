#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed. There is no retry; re-run the initialization.
    Bus(E),
    /// Register addresses are 7 bits wide.
    InvalidAddress(u8),
    /// The SROM image has no bytes to burst.
    EmptyFirmware,
    /// The identification registers do not describe a PMW3389.
    UnexpectedProduct {
        product_id: u8,
        inverse_product_id: u8,
    },
}

impl<E: core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        match self {
            Error::Bus(e) => write!(f, "Bus error: {}", e),
            Error::InvalidAddress(addr) => write!(f, "Invalid register address: {:#04x}", addr),
            Error::EmptyFirmware => write!(f, "SROM image is empty"),
            Error::UnexpectedProduct {
                product_id,
                inverse_product_id,
            } => write!(
                f,
                "Unexpected product ID: {:#04x} (inverse {:#04x})",
                product_id, inverse_product_id
            ),
        }
    }
}

impl<E> core::convert::From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Bus(error)
    }
}
