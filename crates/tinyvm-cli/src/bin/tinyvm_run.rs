//! `tinyvm-run <binary.bin>`: loads and executes a tinyvm binary image to
//! completion, relaying the program's own host-call output as it runs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tinyvm_isa::Fault;
use tinyvm_runtime::{ExitStatus, Image, Interpreter};

/// Load and run a tinyvm binary image.
#[derive(Parser)]
#[command(name = "tinyvm-run", version, about)]
struct Args {
    /// Path to the `.bin` image file.
    binary: PathBuf,
}

fn main() -> ExitCode {
    tinyvm_cli::init_logging();
    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tinyvm-run: {err:#}");
            ExitCode::from(tinyvm_cli::EXIT_FAULT)
        }
    }
}

/// Argument/IO errors (a missing binary file) are not part of `Fault`'s own
/// taxonomy, so they surface through `anyhow` at this boundary instead.
fn run(args: Args) -> Result<ExitCode> {
    let bytes = std::fs::read(&args.binary)
        .with_context(|| format!("could not read {}", args.binary.display()))?;

    let image = match Image::load(&bytes) {
        Ok(image) => image,
        Err(fault) => return Ok(report_fault(fault)),
    };

    let mut interpreter = match Interpreter::new(image) {
        Ok(interpreter) => interpreter,
        Err(fault) => return Ok(report_fault(fault)),
    };

    Ok(match interpreter.run() {
        Ok(ExitStatus::Exit) | Ok(ExitStatus::FellOff) => ExitCode::SUCCESS,
        Err(fault) => report_fault(fault),
    })
}

fn report_fault(fault: Fault) -> ExitCode {
    eprintln!("tinyvm-run: {fault}");
    ExitCode::from(fault.exit_code() as u8)
}
