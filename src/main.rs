//! Enigma command-line front end.
//!
//! Reads a machine description, then encrypts or decrypts the messages of
//! INPUT (default stdin) into OUTPUT (default stdout).

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use enigma::{MachineConfig, Session};

/// Enigma rotor machine simulator
#[derive(Parser, Debug)]
#[command(name = "enigma")]
#[command(about = "Encrypt and decrypt messages with a simulated rotor cipher machine")]
#[command(version)]
struct Cli {
    /// Trace every converted symbol (rotor window, plugboard, output) on stderr
    #[arg(long)]
    verbose: bool,

    /// Machine description: alphabet, slot/pawl counts, rotor catalog
    config: PathBuf,

    /// Messages and settings lines (defaults to stdin)
    input: Option<PathBuf>,

    /// Where processed messages go (defaults to stdout)
    output: Option<PathBuf>,
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the defaults.
fn init_tracing(verbose: bool) {
    let default = if verbose { "enigma=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.config)
        .with_context(|| format!("could not open {}", cli.config.display()))?;
    let config = MachineConfig::parse(&text)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;
    let mut session = Session::new(&config)?;
    debug!(config = %cli.config.display(), "machine described");

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("could not open {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("could not open {}", path.display()))?;
            session.run(BufReader::new(file), output)
        }
        None => session.run(io::stdin().lock(), output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
