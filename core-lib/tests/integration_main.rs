// Whole-machine scenarios: boot hand-off, interrupts end to end, and a
// rendered frame, all through the public API.

use anyhow::Result;
use dmg_core::bus::MemoryBus;
use dmg_core::interrupts::{IE_ADDR, IF_ADDR};
use dmg_core::ppu::{BGP_ADDR, TILEMAP_LOW};
use dmg_core::{Color, GameBoy, RunSignal, SCREEN_WIDTH};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Machine with `program` at 0x0000 and no boot image
fn machine_with_program(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new();
    for (addr, &byte) in (0u16..).zip(program) {
        gb.mmu.poke(addr, byte);
    }
    gb.cpu.regs.sp = 0xFFFE;
    gb
}

fn step_until(gb: &mut GameBoy, limit: usize, done: impl Fn(&GameBoy) -> bool) -> Result<()> {
    for _ in 0..limit {
        if done(gb) {
            return Ok(());
        }
        gb.step()?;
    }
    anyhow::bail!("condition not reached after {limit} steps")
}

#[test]
fn boot_rom_hands_over_to_cartridge() -> Result<()> {
    init_tracing();
    let mut boot = vec![0; 0x100];
    boot[..5].copy_from_slice(&[0x3E, 0x01, 0xC3, 0xFE, 0x00]); // LD A,1; JP $00FE
    boot[0xFE..].copy_from_slice(&[0xE0, 0x50]); // LDH ($50),A

    let mut rom = vec![0; 0x8000];
    rom[0x0000] = 0xAA;
    rom[0x0100] = 0x3C; // INC A
    rom[0x0101] = 0x76; // HALT

    let mut gb = GameBoy::with_boot_rom(&boot)?;
    gb.load_cartridge(rom)?;
    assert_eq!(gb.mmu.read_byte(0x0000), 0x3E);
    assert_eq!(gb.mmu.read_byte(0x0100), 0x3C);

    step_until(&mut gb, 100, |gb| gb.cpu.regs.halted)?;
    assert!(!gb.mmu.boot_rom_mapped());
    assert_eq!(gb.mmu.read_byte(0x0000), 0xAA);
    assert_eq!(gb.cpu.regs.a, 0x02);
    assert_eq!(gb.cpu.regs.pc, 0x0102);
    Ok(())
}

#[test]
fn timer_interrupt_runs_handler() -> Result<()> {
    init_tracing();
    let mut gb = machine_with_program(&[
        0x3E, 0x05, 0xE0, 0x07, // TAC = enabled, 16 cycles
        0x3E, 0xFF, 0xE0, 0x05, // TIMA = 0xFF
        0x3E, 0x04, 0xE0, 0xFF, // IE = timer
        0xFB, // EI
        0x76, // HALT
        0x18, 0xFE, // JR -2
    ]);
    // handler: LD B,$42; RETI
    for (addr, byte) in (0x50u16..).zip([0x06, 0x42, 0xD9]) {
        gb.mmu.poke(addr, byte);
    }

    step_until(&mut gb, 1_000, |gb| gb.cpu.regs.b == 0x42)?;
    assert_eq!(gb.mmu.read_byte(IF_ADDR) & 0x04, 0);
    gb.step()?;
    assert!(gb.cpu.regs.ime);
    assert_eq!(gb.cpu.regs.pc, 0x000E);
    Ok(())
}

#[test]
fn vblank_interrupt_fires_once_per_frame() -> Result<()> {
    init_tracing();
    let mut gb = machine_with_program(&[
        0x3E, 0x91, 0xE0, 0x40, // LCDC = on
        0x3E, 0x01, 0xE0, 0xFF, // IE = VBlank
        0xFB, // EI
        0x76, // HALT
        0x18, 0xFD, // JR -3 (back to HALT)
    ]);
    // handler: INC B; RETI
    gb.mmu.poke(0x40, 0x04);
    gb.mmu.poke(0x41, 0xD9);

    for _ in 0..3 {
        gb.run_frame()?;
    }
    // the third dispatch happened in the step that completed the frame
    assert_eq!(gb.cpu.regs.pc, 0x0040);
    gb.step()?;
    assert_eq!(gb.cpu.regs.b, 3);
    assert_eq!(gb.cpu.ppu.frames(), 3);
    assert_eq!(gb.mmu.read_byte(IE_ADDR), 0x01);
    Ok(())
}

#[test]
fn frame_shows_background_tile() -> Result<()> {
    init_tracing();
    // LD A,$91; LDH ($40),A; JR -2
    let mut gb = machine_with_program(&[0x3E, 0x91, 0xE0, 0x40, 0x18, 0xFE]);
    gb.mmu.write_byte(BGP_ADDR, 0xE4);
    for row in 0..8 {
        gb.mmu.write_byte(0x8010 + row * 2, 0xFF);
        gb.mmu.write_byte(0x8011 + row * 2, 0xFF);
    }
    gb.mmu.write_byte(TILEMAP_LOW, 1);

    gb.run_frame()?;
    let frame = gb.frame();
    assert_eq!(frame[0], Color::BLACK);
    assert_eq!(frame[7 * SCREEN_WIDTH + 7], Color::BLACK);
    assert_eq!(frame[8], Color::WHITE);
    assert_eq!(frame[8 * SCREEN_WIDTH], Color::WHITE);
    Ok(())
}

#[test]
fn run_loop_stops_on_quit_and_reports_cycles() -> Result<()> {
    let mut gb = machine_with_program(&[0x00, 0x00, 0x00, 0x18, 0xFE]);
    let mut steps = 0;
    let cycles = gb.run(|_| {
        steps += 1;
        if steps > 5 {
            RunSignal::Quit
        } else {
            RunSignal::Run
        }
    })?;
    // three NOPs and two taken JRs
    assert_eq!(cycles, 3 * 4 + 2 * 12);
    Ok(())
}

#[test]
fn fault_stops_the_run_loop() {
    let mut gb = machine_with_program(&[0x00, 0xF4]);
    let result = gb.run(|_| RunSignal::Run);
    let err = result.expect_err("illegal opcode must stop the loop");
    assert_eq!(err.to_string(), "illegal opcode 0xF4 at 0x0001");
    assert!(gb.cpu.fault().is_some());
}
