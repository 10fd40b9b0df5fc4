//! Command-line front end: assemble, link, run and disassemble programs.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use vm16::disassembler::{formatter, DisassemblyOptions};
use vm16::machine::{steps_per_tick, TICK_RATE};
use vm16::{assembler, linker, ConsoleDevice, DiskDevice, Machine, ObjectFile};

const DEFAULT_FREQUENCY: u32 = 1_000_000;

/// vm16 - assembler, linker and emulator for a 16-bit virtual machine
#[derive(Parser, Debug)]
#[command(name = "vm16")]
#[command(about = "Assemble, link and run vm16 programs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble one source file into an object (<out>.code, <out>.addr, <out>.ref)
    Assemble {
        source: PathBuf,
        out: PathBuf,
    },

    /// Link objects, given by prefix, into a flat binary
    Link {
        #[arg(required = true)]
        objects: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        /// Print the linked address table
        #[arg(long)]
        map: bool,
    },

    /// Assemble and link sources in one go
    Build {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run a flat binary, or boot from a disk image
    Run(RunArgs),

    /// Disassemble a flat binary
    Disasm {
        binary: PathBuf,

        /// Address of the first byte
        #[arg(long, default_value_t = 0, value_parser = parse_address)]
        start: u16,

        /// Show raw bytes next to each instruction
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    image: PathBuf,

    /// Treat the image as a disk: boot from sector 0 and attach it
    #[arg(long)]
    disk: bool,

    /// Target instructions per second
    #[arg(long, default_value_t = DEFAULT_FREQUENCY)]
    frequency: u32,

    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Run as fast as possible instead of pacing to the target frequency
    #[arg(long)]
    no_pace: bool,

    /// Where to dump memory if the program halts with EXCEPTION set
    #[arg(long, default_value = "vm16.dump")]
    dump: PathBuf,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid address {s}: {e}"))
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn assemble_file(source: &Path) -> Result<ObjectFile> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("couldn't read {}", source.display()))?;
    let object = assembler::assemble(&text)
        .with_context(|| format!("couldn't assemble {}", source.display()))?;
    Ok(object)
}

fn write_binary(path: &Path, image: &ObjectFile) -> Result<()> {
    fs::write(path, &image.bytecode)
        .with_context(|| format!("couldn't write {}", path.display()))?;
    tracing::info!("wrote {} ({} bytes)", path.display(), image.bytecode.len());
    Ok(())
}

fn assemble_cmd(source: &Path, out: &Path) -> Result<()> {
    let object = assemble_file(source)?;
    object.write(out)?;
    println!(
        "{}: {} bytes, {} labels, {} references",
        source.display(),
        object.bytecode.len(),
        object.addresses.len(),
        object.references.len()
    );
    Ok(())
}

fn link_cmd(objects: &[PathBuf], output: &Path, map: bool) -> Result<()> {
    let objects = objects
        .iter()
        .map(|prefix| ObjectFile::read(prefix))
        .collect::<Result<Vec<_>, _>>()?;
    let image = linker::link(&objects)?;
    write_binary(output, &image)?;

    if map {
        for (label, address) in &image.addresses {
            println!("0x{:04X}  {}", address, label);
        }
    }
    Ok(())
}

fn build_cmd(sources: &[PathBuf], output: &Path) -> Result<()> {
    let objects = sources
        .iter()
        .map(|source| assemble_file(source))
        .collect::<Result<Vec<_>>>()?;
    let image = linker::link(&objects)?;
    write_binary(output, &image)
}

fn run_cmd(args: &RunArgs) -> Result<()> {
    let mut machine = if args.disk {
        let disk = DiskDevice::open(&args.image)
            .with_context(|| format!("couldn't open disk {}", args.image.display()))?;
        Machine::from_disk(disk)?
    } else {
        let image = fs::read(&args.image)
            .with_context(|| format!("couldn't read {}", args.image.display()))?;
        Machine::from_image(&image)?
    };
    tracing::info!("booting {}", args.image.display());

    let mut console = ConsoleDevice::new();
    console.set_transmit_callback(|byte| {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(&[byte]);
        let _ = stdout.flush();
    });
    machine.attach_console(console)?;

    let per_tick = steps_per_tick(args.frequency);
    let tick = Duration::from_secs(1) / TICK_RATE;
    let mut remaining = args.max_steps;

    while !machine.is_halted() {
        let budget = remaining.map_or(per_tick, |left| left.min(per_tick));
        if budget == 0 {
            tracing::warn!("step limit reached before shutdown");
            break;
        }

        let started = Instant::now();
        let retired = match machine.run_tick(budget) {
            Ok(retired) => retired,
            Err(err) => {
                eprint!("{}", machine.register_report());
                return Err(err).context("execution stopped");
            }
        };
        if let Some(left) = remaining.as_mut() {
            *left -= retired;
        }

        if !args.no_pace {
            if let Some(idle) = tick.checked_sub(started.elapsed()) {
                thread::sleep(idle);
            }
        }
    }

    print!("{}", machine.register_report());

    if machine.is_halted() && machine.faulted() {
        fs::write(&args.dump, machine.memory_dump())
            .with_context(|| format!("couldn't write {}", args.dump.display()))?;
        println!("EXCEPTION set, memory dumped to {}", args.dump.display());
    }
    Ok(())
}

fn disasm_cmd(binary: &Path, start: u16, hex: bool) -> Result<()> {
    let bytes = fs::read(binary).with_context(|| format!("couldn't read {}", binary.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", binary.display());
    }
    let options = DisassemblyOptions {
        start_address: start,
        hex_dump: hex,
    };
    print!("{}", formatter::Listing::new(&bytes, options));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match &cli.command {
        Command::Assemble { source, out } => assemble_cmd(source, out),
        Command::Link {
            objects,
            output,
            map,
        } => link_cmd(objects, output, *map),
        Command::Build { sources, output } => build_cmd(sources, output),
        Command::Run(args) => run_cmd(args),
        Command::Disasm { binary, start, hex } => disasm_cmd(binary, *start, *hex),
    }
}
