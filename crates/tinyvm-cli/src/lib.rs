//! Plumbing shared by the `tinyvm-asm` and `tinyvm-run` binaries: the exit
//! code contract and log subscriber setup.
#![warn(missing_docs)]
#![deny(unsafe_code)]

/// Exit code for an assembler failure. VM faults instead use
/// `tinyvm_isa::Fault::exit_code`, which already encodes the
/// stack-overflow-vs-everything-else split.
pub const EXIT_FAULT: u8 = 100;

/// Install a `tracing-subscriber` formatter honoring `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt::init();
}
