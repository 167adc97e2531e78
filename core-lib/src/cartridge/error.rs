use thiserror::Error;

/// Errors that can occur when loading a cartridge image
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("cartridge image too small for a header: {0} bytes")]
    InvalidSize(usize),
    #[error("cartridge image exceeds the unbanked 32 KiB window: {0} bytes")]
    TooLarge(usize),
    #[error("unsupported cartridge type {0:#04X} (only ROM-only images are mapped)")]
    UnsupportedCartridgeType(u8),
}
