//! `tinyvm-asm <source.asm>`: assembles tinyvm textual source into the
//! binary image format, writing `<source-without-ext>.bin` alongside it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

/// Assemble tinyvm textual source into its binary image format.
#[derive(Parser)]
#[command(name = "tinyvm-asm", version, about)]
struct Args {
    /// Path to the `.asm` source file.
    source: PathBuf,
}

fn main() -> ExitCode {
    tinyvm_cli::init_logging();
    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tinyvm-asm: {err:#}");
            ExitCode::from(tinyvm_cli::EXIT_FAULT)
        }
    }
}

/// Argument/IO errors (a missing file, a read-only output directory) are not
/// part of the assembler's own `AssembleError` taxonomy, so they surface
/// through `anyhow` at this boundary instead.
fn run(args: Args) -> Result<ExitCode> {
    let text = std::fs::read_to_string(&args.source)
        .with_context(|| format!("could not read {}", args.source.display()))?;

    match tinyvm_assembler::assemble(&text) {
        Ok(image) => {
            let output = output_path(&args.source);
            std::fs::write(&output, &image.bytes)
                .with_context(|| format!("could not write {}", output.display()))?;
            println!("Assembly successful! Wrote {} bytes.", image.bytes.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("error: {}:{}: {}", args.source.display(), error.line, error.message);
            }
            println!("Assembly failed!");
            Ok(ExitCode::from(tinyvm_cli::EXIT_FAULT))
        }
    }
}

fn output_path(source: &Path) -> PathBuf {
    source.with_extension("bin")
}
