//! hash-annotator - Annotate Kubernetes manifests with dependency hashes.
//!
//! Reads a manifest stream, hashes the resources selected by the config and
//! writes the hashes as annotations into the selected targets.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{ArgAction, Parser};
use tracing::debug;

use hash_annotator::{Annotator, Config, Error};

#[derive(Debug, Parser)]
#[command(name = "hash-annotator", version, about)]
struct Cli {
    /// Path to the annotator configuration file
    config: PathBuf,

    /// Manifest to read. Use '-' for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output location. Use '-' for stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = std::env::var("HASH_ANNOTATOR_LOG").unwrap_or_else(|_| default.to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let manifest = read_input(&cli.input)?;
    let config = Config::load(&cli.config)?;
    debug!(config = ?cli.config, "loaded config");

    let output = Annotator::new(config).run(&manifest)?;
    write_output(&cli.output, &output)
}

fn read_input(input: &str) -> Result<String, Error> {
    let context = "unable to read in manifest";
    if input == "-" {
        let mut manifest = String::new();
        io::stdin()
            .read_to_string(&mut manifest)
            .map_err(|e| Error::io(context, e))?;
        Ok(manifest)
    } else {
        fs::read_to_string(input).map_err(|e| Error::io(context, e))
    }
}

fn write_output(output: &str, content: &str) -> Result<(), Error> {
    let context = "unable to write output";
    if output == "-" {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| Error::io(context, e))
    } else {
        fs::write(output, content).map_err(|e| Error::io(context, e))
    }
}
