/// core-lib/src/mmu/tests.rs
use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn rom_only_image() -> Vec<u8> {
    let mut rom = vec![0; 0x8000];
    rom[0x0000] = 0xC3;
    rom[0x0100] = 0x00;
    rom[0x4000] = 0xAB;
    rom
}

#[test]
fn plain_storage_round_trips() {
    let mut mmu = MMU::new();
    mmu.write_byte(0xC000, 0x42);
    mmu.write_word(0xD000, 0xBEEF);
    assert_eq!(mmu.read_byte(0xC000), 0x42);
    assert_eq!(mmu.read_word(0xD000), 0xBEEF);
    assert_eq!(mmu.read_byte(0xD000), 0xEF);
}

#[test]
fn word_access_wraps_at_top_of_memory() {
    let mut mmu = MMU::new();
    mmu.write_word(0xFFFF, 0x1234);
    assert_eq!(mmu.read_byte(0xFFFF), 0x34);
    assert_eq!(mmu.read_byte(0x0000), 0x12);
}

#[test]
fn oam_dma_copies_160_bytes() {
    let mut mmu = MMU::new();
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC100 + i, i as u8 ^ 0x5A);
    }
    mmu.write_byte(DMA_ADDR, 0xC1);
    for i in 0..0xA0u16 {
        assert_eq!(mmu.read_byte(0xFE00 + i), i as u8 ^ 0x5A);
    }
    assert_eq!(mmu.read_byte(0xFEA0), 0x00);
}

#[test]
fn tile_cache_tracks_vram_writes() {
    let mut mmu = MMU::new();
    // tile 1, row 3: low plane 0b1010_0101, high plane 0b1100_0011
    mmu.write_byte(0x8016, 0b1010_0101);
    mmu.write_byte(0x8017, 0b1100_0011);
    assert_eq!(mmu.tile(1)[3], [3, 2, 1, 0, 0, 1, 2, 3]);

    // rewriting only the high plane refreshes the same row
    mmu.write_byte(0x8017, 0x00);
    assert_eq!(mmu.tile(1)[3], [1, 0, 1, 0, 0, 1, 0, 1]);
    assert_eq!(mmu.tile(1)[2], [0; 8]);
}

#[test]
fn last_tile_lives_at_97f0() {
    let mut mmu = MMU::new();
    mmu.write_byte(0x97FE, 0xFF);
    mmu.write_byte(0x97FF, 0xFF);
    assert_eq!(mmu.tile(TILE_COUNT - 1)[7], [3; 8]);
}

proptest! {
    #[test]
    fn tile_cache_matches_manual_decode(tile in 0usize..TILE_COUNT, row in 0usize..8, low: u8, high: u8) {
        let mut mmu = MMU::new();
        let addr = TILE_DATA_START + (tile * 16 + row * 2) as u16;
        mmu.write_byte(addr, low);
        mmu.write_byte(addr + 1, high);
        for x in 0..8 {
            let mask = 1 << (7 - x);
            let expected = u8::from(low & mask != 0) + 2 * u8::from(high & mask != 0);
            prop_assert_eq!(mmu.tile(tile)[row][x], expected);
        }
    }
}

#[test]
fn palettes_remap_shades() {
    let mut mmu = MMU::new();
    mmu.write_byte(BGP_ADDR, 0b1110_0100);
    assert_eq!(mmu.bg_palette(), &Color::SHADES);

    mmu.write_byte(OBP0_ADDR, 0b0001_1011);
    assert_eq!(
        mmu.sprite_palette(0),
        &[Color::BLACK, Color::DARK_GRAY, Color::LIGHT_GRAY, Color::WHITE]
    );

    mmu.write_byte(OBP1_ADDR, 0xFF);
    assert_eq!(mmu.sprite_palette(1), &[Color::BLACK; 4]);
    // OBP1 must not clobber OBP0
    assert_eq!(mmu.sprite_palette(0)[0], Color::BLACK);
    assert_eq!(mmu.sprite_palette(0)[3], Color::WHITE);
}

#[test]
fn div_write_resets_and_latches() {
    let mut mmu = MMU::new();
    mmu.poke(DIV_ADDR, 0x7F);
    mmu.write_byte(DIV_ADDR, 0x33);
    assert_eq!(mmu.read_byte(DIV_ADDR), 0);
    assert!(mmu.take_div_reset());
    assert!(!mmu.take_div_reset());
}

#[test]
fn ly_ignores_guest_writes() {
    let mut mmu = MMU::new();
    mmu.poke(LY_ADDR, 90);
    mmu.write_byte(LY_ADDR, 0);
    assert_eq!(mmu.read_byte(LY_ADDR), 90);
}

#[test]
fn stat_keeps_hardware_bits() {
    let mut mmu = MMU::new();
    mmu.poke(STAT_ADDR, 0b0000_0110);
    mmu.write_byte(STAT_ADDR, 0b0111_1001);
    assert_eq!(mmu.read_byte(STAT_ADDR), 0b0111_1110);
}

#[test]
fn boot_rom_is_loaded_with_logo() {
    let mut mmu = MMU::new();
    mmu.load_boot_rom(&[0x31, 0xFE, 0xFF]).unwrap();
    assert_eq!(mmu.read_byte(0x0000), 0x31);
    assert_eq!(mmu.read_byte(0x0002), 0xFF);
    assert_eq!(mmu.read_byte(0x0104), 0xCE);
    assert_eq!(mmu.read_byte(0x0133), 0x3E);
    assert!(mmu.boot_rom_mapped());
}

#[test]
fn oversized_boot_rom_is_rejected() {
    let mut mmu = MMU::new();
    let err = mmu.load_boot_rom(&[0; 257]).unwrap_err();
    assert_eq!(err, MmuError::BootRomTooLarge(257));
    assert!(!mmu.boot_rom_mapped());
}

#[test]
fn boot_rom_shadows_cartridge_until_switched_off() {
    let mut mmu = MMU::new();
    mmu.load_boot_rom(&[0x31; 0x100]).unwrap();
    mmu.load_cartridge_bytes(rom_only_image()).unwrap();
    assert_eq!(mmu.read_byte(0x0000), 0x31);
    assert_eq!(mmu.read_byte(0x4000), 0xAB);

    mmu.write_byte(BOOT_OFF_ADDR, 0x00);
    assert!(mmu.boot_rom_mapped());

    mmu.write_byte(BOOT_OFF_ADDR, 0x01);
    assert!(!mmu.boot_rom_mapped());
    assert_eq!(mmu.read_byte(0x0000), 0xC3);
}

#[test]
fn cartridge_without_boot_rom_maps_everything() {
    let mut mmu = MMU::new();
    mmu.load_cartridge_bytes(rom_only_image()).unwrap();
    assert_eq!(mmu.read_byte(0x0000), 0xC3);
}

#[test]
fn banked_cartridge_is_refused() {
    let mut mmu = MMU::new();
    let mut rom = rom_only_image();
    rom[0x147] = 0x01;
    assert!(matches!(
        mmu.load_cartridge_bytes(rom),
        Err(MmuError::Cartridge(CartridgeError::UnsupportedCartridgeType(0x01)))
    ));
}

#[test]
fn joypad_reads_selected_group() {
    let mut mmu = MMU::new();
    mmu.set_button(GameBoyButton::Start, true);
    mmu.set_button(GameBoyButton::Left, true);

    mmu.write_byte(JOYPAD_ADDR, 0x10); // actions
    assert_eq!(mmu.read_byte(JOYPAD_ADDR) & 0x0F, 0b0111);

    mmu.write_byte(JOYPAD_ADDR, 0x20); // directions
    assert_eq!(mmu.read_byte(JOYPAD_ADDR) & 0x0F, 0b1101);

    mmu.write_byte(JOYPAD_ADDR, 0x30);
    assert_eq!(mmu.read_byte(JOYPAD_ADDR) & 0x0F, 0x0F);
}

#[test]
fn joypad_press_requests_interrupt_once() {
    let mut mmu = MMU::new();
    mmu.set_button(GameBoyButton::A, true);
    assert_eq!(mmu.read_byte(0xFF0F) & 0x10, 0x10);

    mmu.write_byte(0xFF0F, 0);
    mmu.set_button(GameBoyButton::A, true);
    assert_eq!(mmu.read_byte(0xFF0F) & 0x10, 0);
}

#[test]
fn post_boot_matches_firmware_exit_state() {
    let mut mmu = MMU::new();
    mmu.load_boot_rom(&[0; 0x100]).unwrap();
    mmu.post_boot();
    assert_eq!(mmu.read_byte(0xFF40), 0x91);
    assert_eq!(mmu.bg_palette()[0], Color::WHITE);
    assert_eq!(mmu.bg_palette()[1], Color::BLACK);
    assert!(!mmu.boot_rom_mapped());
}
