//! crs - Cauchy Reed-Solomon erasure coding utility
//!
//! Splits a file into `N` chunk files such that any `K` of them reconstruct
//! the original exactly, and reverses that split back into a file.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use commands::{cmd_decode, cmd_encode};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crs")]
#[command(author, version, about = "Cauchy Reed-Solomon erasure coding utility")]
#[command(long_about = "
crs splits a file into N chunk files such that any K of them are enough to
reconstruct the original exactly, using a Cauchy Reed-Solomon code over
GF(2^16).

Examples:
  crs encode input.bin 65551 chunk1 chunk2 chunk3 chunk4
  crs decode recovered.bin chunk1 chunk3 chunk4
")]
struct Cli {
    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into chunks, any K of which reconstruct it
    Encode {
        /// File to encode
        input: PathBuf,

        /// Size, in bytes, of each output chunk file (header + payload)
        chunk_size: usize,

        /// Output chunk file paths, one per requested identifier
        outputs: Vec<PathBuf>,
    },

    /// Reconstruct a file from a set of chunks
    Decode {
        /// Path to write the reconstructed file to
        output: PathBuf,

        /// Candidate chunk files (at least K must be mutually consistent)
        chunks: Vec<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            input,
            chunk_size,
            outputs,
        } => cmd_encode(&input, chunk_size, &outputs),
        Commands::Decode { output, chunks } => cmd_decode(&chunks, &output),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "crs", &mut io::stdout());
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
