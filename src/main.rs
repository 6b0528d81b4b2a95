use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chip8_vm::external::input::feed_keys;
use chip8_vm::external::output::render_ascii;
use chip8_vm::{consts, utils, Driver, DriverConfig, FrameSink, Instruction, Keypad, Processor, Rom};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "chip8-vm", about = "Run a program image on the 64x32 8-bit VM.")]
struct Args {
    /// Program image, loaded verbatim at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Instructions per second (0 = unpaced).
    #[arg(long, default_value_t = consts::DEFAULT_RATE_HZ)]
    rate_hz: u32,

    /// Number of instructions to execute before exiting (default: run until killed).
    #[arg(long)]
    max_steps: Option<u64>,

    /// Seed for the random-number instruction.
    #[arg(long)]
    seed: Option<u64>,

    /// How long each typed key stays held, in milliseconds.
    #[arg(long, default_value_t = 100)]
    key_hold_ms: u64,

    /// Don't read keys from stdin.
    #[arg(long)]
    no_input: bool,

    /// Print a listing of the program instead of running it.
    #[arg(long)]
    disassemble: bool,

    /// Print the last frame as text once the run ends.
    #[arg(long)]
    dump_frame: bool,
}

fn disassemble(rom: &Rom) {
    for (i, pair) in rom.buffer.chunks(consts::OP_CODE_BYTES).enumerate() {
        let addr = consts::PROG_OFFSET + i * consts::OP_CODE_BYTES;
        let word = utils::join_word(pair[0], pair.get(1).copied().unwrap_or(0));
        match Instruction::decode(word) {
            Some(instr) => println!("{:03X}  {:04X}  {}", addr, word, instr),
            None => println!("{:03X}  {:04X}  .word {:#06X}", addr, word, word),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = Rom::from_path(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    if args.disassemble {
        disassemble(&rom);
        return Ok(());
    }

    let keypad = Arc::new(Keypad::new());
    let sink = Arc::new(FrameSink::new());
    let mut processor = match args.seed {
        Some(seed) => Processor::with_seed(&rom, keypad.clone(), sink.clone(), seed)?,
        None => Processor::new(&rom, keypad.clone(), sink.clone())?,
    };

    // keys typed on stdin (qwerty layout, one press per character) reach the
    // keypad from their own thread
    if !args.no_input {
        let hold = Duration::from_millis(args.key_hold_ms);
        thread::Builder::new()
            .name("key-input".into())
            .spawn(move || {
                if let Err(e) = feed_keys(io::stdin().lock(), &keypad, hold) {
                    warn!("key input stopped: {}", e);
                }
            })?;
    }

    let driver = Driver::new(DriverConfig {
        rate_hz: args.rate_hz,
        max_steps: args.max_steps,
    });
    let summary = thread::Builder::new()
        .name("drive-loop".into())
        .spawn(move || driver.run(&mut processor))?
        .join()
        .map_err(|_| anyhow!("drive loop panicked"))??;

    info!(
        "ran {} steps, {} frames, {} beeps",
        summary.steps,
        summary.frames,
        sink.beep_count()
    );
    if args.dump_frame {
        print!("{}", render_ascii(&sink.frame()));
    }
    Ok(())
}
