/// core-lib/src/cartridge/mod.rs
use tracing::debug;

mod error;
pub use error::CartridgeError;

/// Logo bitmap checked by the boot firmware, mirrored at 0x0104.
pub const NINTENDO_LOGO: [u8; 0x30] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

pub const LOGO_ADDR: u16 = 0x0104;
pub const HEADER_END: usize = 0x150;
pub const MAX_ROM_SIZE: usize = 0x8000;

const TITLE: std::ops::RangeInclusive<usize> = 0x134..=0x143;
const CARTRIDGE_TYPE: usize = 0x147;
const HEADER_CHECKSUM: usize = 0x14D;

/// A flat, unbanked cartridge image (32 KiB at most)
#[derive(Debug, Clone)]
pub struct Cartridge {
    data: Vec<u8>,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::InvalidSize(rom.len()));
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(CartridgeError::TooLarge(rom.len()));
        }
        // 0x08/0x09 add RAM (and battery) without a bank controller
        let cart_type = rom[CARTRIDGE_TYPE];
        if !matches!(cart_type, 0x00 | 0x08 | 0x09) {
            return Err(CartridgeError::UnsupportedCartridgeType(cart_type));
        }
        let cartridge = Self { data: rom };
        debug!(
            title = %cartridge.title(),
            checksum_ok = cartridge.header_checksum_valid(),
            "Loaded cartridge"
        );
        Ok(cartridge)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the cartridge title from the ROM header
    pub fn title(&self) -> String {
        let title_bytes = &self.data[TITLE];
        let end = title_bytes.iter().position(|&b| b == 0).unwrap_or(title_bytes.len());
        String::from_utf8_lossy(&title_bytes[..end]).into_owned()
    }

    /// Header checksum over 0x134..=0x14C, as verified by the boot firmware
    pub fn header_checksum_valid(&self) -> bool {
        let sum = self.data[0x134..HEADER_CHECKSUM]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        sum == self.data[HEADER_CHECKSUM]
    }
}

#[cfg(test)]
mod tests;
