/// dmg CLI
///
/// Headless front end for the DMG kernel: runs a boot image (optionally with a
/// cartridge) for a bounded number of frames and can dump the screen or
/// disassemble a ROM.
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dmg_core::ppu::CYCLES_PER_FRAME;
use dmg_core::{cpu::disassemble, GameBoy, RunSignal, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Headless runner and disassembler for the DMG emulation kernel",
    long_about = None
)]
struct Cli {
    /// Enable debug output globally (for troubleshooting and development)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable verbose output globally (per-instruction trace)
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a boot image until the frame or cycle budget is spent
    Run {
        /// Boot image mapped at 0x0000 (at most 256 bytes)
        #[arg(value_name = "BOOT_ROM")]
        boot_rom: PathBuf,
        /// Flat ROM-only cartridge image (at most 32 KiB)
        #[arg(long, value_name = "PATH")]
        cartridge: Option<PathBuf>,
        /// Stop after this many completed frames
        #[arg(long, default_value_t = 60)]
        frames: u64,
        /// Stop after this many T-cycles [default: one frame more than --frames]
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
        /// Write the last completed frame as PNG
        #[arg(long, value_name = "PATH")]
        screenshot: Option<PathBuf>,
    },
    /// Disassemble a ROM or boot image
    Disasm {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// First address to decode (decimal, or hex with 0x or $)
        #[arg(long, default_value = "0", value_parser = parse_address)]
        start: u16,
        /// Number of instructions to print
        #[arg(long, default_value_t = 32)]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);

    match cli.command {
        Commands::Run {
            boot_rom,
            cartridge,
            frames,
            max_cycles,
            screenshot,
        } => {
            let max_cycles = max_cycles
                .unwrap_or_else(|| frames.saturating_add(1).saturating_mul(u64::from(CYCLES_PER_FRAME)));
            run(&boot_rom, cartridge.as_deref(), frames, max_cycles, screenshot.as_deref())
        }
        Commands::Disasm { file, start, count } => disasm(&file, start, count),
    }
}

/// `--verbose` and `--debug` win over `RUST_LOG`; the default is warnings only.
fn init_tracing(debug: bool, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trace")
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_file(path: &Path, what: &str) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        bail!("{what} not found: {}", path.display());
    }
    std::fs::read(path).with_context(|| format!("Failed to read {what} from {}", path.display()))
}

fn run(
    boot_rom: &Path,
    cartridge: Option<&Path>,
    frames: u64,
    max_cycles: u64,
    screenshot: Option<&Path>,
) -> anyhow::Result<()> {
    let boot = read_file(boot_rom, "boot ROM")?;
    let mut gb = GameBoy::with_boot_rom(&boot)
        .with_context(|| format!("Failed to load boot ROM {}", boot_rom.display()))?;
    if let Some(path) = cartridge {
        let rom = read_file(path, "cartridge")?;
        gb.load_cartridge(rom)
            .with_context(|| format!("Failed to load cartridge {}", path.display()))?;
    }

    info!(frames, max_cycles, "Starting emulation");
    gb.run(|gb| {
        if gb.cpu.ppu.frames() >= frames || gb.cpu.get_cycles() >= max_cycles {
            RunSignal::Quit
        } else {
            RunSignal::Run
        }
    })
    .with_context(|| format!("emulation stopped after {} cycles", gb.cpu.get_cycles()))?;

    println!(
        "frames: {}  cycles: {}  pc: {:#06X}",
        gb.cpu.ppu.frames(),
        gb.cpu.get_cycles(),
        gb.cpu.regs.pc
    );

    if let Some(path) = screenshot {
        save_screenshot(&gb, path)?;
        debug!(path = %path.display(), "Screenshot written");
    }
    Ok(())
}

fn save_screenshot(gb: &GameBoy, path: &Path) -> anyhow::Result<()> {
    let pixels: Vec<u8> = gb.frame().iter().flat_map(|c| c.to_rgb()).collect();
    let image = image::RgbImage::from_raw(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, pixels)
        .context("frame buffer does not match the screen size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write screenshot to {}", path.display()))
}

fn disasm(file: &Path, start: u16, count: usize) -> anyhow::Result<()> {
    let data = read_file(file, "file")?;
    let Some(code) = data.get(usize::from(start)..) else {
        bail!("start address {start:#06X} is past the end of {}", file.display());
    };
    for line in disassemble(code, start, count) {
        println!("{line}");
    }
    Ok(())
}

/// "336", "0x150" or "$150"
fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix('$')) {
        u16::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}
