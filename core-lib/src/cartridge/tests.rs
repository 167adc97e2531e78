use super::*;
use pretty_assertions::assert_eq;

fn rom_with_title(title: &[u8]) -> Vec<u8> {
    let mut rom = vec![0; MAX_ROM_SIZE];
    rom[0x134..0x134 + title.len()].copy_from_slice(title);
    rom
}

#[test]
fn reads_title_up_to_nul() {
    let cart = Cartridge::new(rom_with_title(b"TETRIS")).unwrap();
    assert_eq!(cart.title(), "TETRIS");
}

#[test]
fn rejects_short_image() {
    let err = Cartridge::new(vec![0; 0x100]).unwrap_err();
    assert_eq!(err, CartridgeError::InvalidSize(0x100));
}

#[test]
fn rejects_banked_image() {
    let err = Cartridge::new(vec![0; MAX_ROM_SIZE * 2]).unwrap_err();
    assert_eq!(err, CartridgeError::TooLarge(MAX_ROM_SIZE * 2));

    let mut rom = vec![0; MAX_ROM_SIZE];
    rom[0x147] = 0x01;
    let err = Cartridge::new(rom).unwrap_err();
    assert_eq!(err, CartridgeError::UnsupportedCartridgeType(0x01));
}

#[test]
fn header_checksum_matches_firmware_formula() {
    let mut rom = rom_with_title(b"DEMO");
    let sum = rom[0x134..0x14D]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
    rom[0x14D] = sum;
    assert!(Cartridge::new(rom.clone()).unwrap().header_checksum_valid());

    rom[0x14D] = sum.wrapping_add(1);
    assert!(!Cartridge::new(rom).unwrap().header_checksum_valid());
}

#[test]
fn logo_is_forty_eight_bytes() {
    assert_eq!(NINTENDO_LOGO.len(), 0x30);
    assert_eq!(NINTENDO_LOGO[0], 0xCE);
    assert_eq!(NINTENDO_LOGO[0x2F], 0x3E);
}
