//! Two-pass translator from the textual tinyvm assembly language to its
//! binary image format.
//!
//! Pass 1 ([`pass1`]) scans the source, resolving labels against byte
//! addresses and rewriting every line into a canonical intermediate form.
//! Pass 2 ([`pass2`]) resolves each line's arguments and emits the encoded
//! binary. The assembler accumulates every [`AssembleError`] it finds
//! rather than aborting on the first one, matching the VM's own
//! single-fault-but-surface-everything split: the interpreter stops at the
//! first runtime fault, but assembly is a batch process that should report
//! everything wrong with a source file in one run.
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod expr;
mod label;
mod lexer;
mod lookup;
mod pass1;
mod pass2;

pub use error::AssembleError;

use tinyvm_isa::Header;

/// The product of a successful assembly: a complete binary image ready to
/// be written to disk and loaded by `tinyvm_runtime::Image::load`.
#[derive(Debug, Clone)]
pub struct AssembledImage {
    /// The full image, header included.
    pub bytes: Vec<u8>,
}

/// Assemble `source` into a binary image, or the full list of diagnostics
/// if anything went wrong.
pub fn assemble(source: &str) -> Result<AssembledImage, Vec<AssembleError>> {
    let mut errors = Vec::new();
    let (header_fields, lines, mut labels) = pass1::run(source, &mut errors);
    let body = pass2::run(header_fields.mode, &lines, &mut labels, &mut errors);

    for name in labels.unreferenced() {
        tracing::warn!(label = name, "unreferenced label");
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Err(errors);
    }

    let header = Header {
        mode: header_fields.mode,
        heap_initial: header_fields.heap_initial,
        heap_max: header_fields.heap_max,
        data_start: header_fields.data_start,
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend(body);
    Ok(AssembledImage { bytes })
}

/// Re-exports convenient for downstream crates.
pub mod prelude {
    pub use crate::{assemble, AssembleError, AssembledImage};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_the_register_mode_addition_scenario() {
        let image = assemble(".MODE register\nLDI R0,#7\nLDI R1,#35\nADD R2,R0,R1\nEXIT").unwrap();
        assert_eq!(image.bytes.len(), tinyvm_isa::HEADER_LEN + 6 + 6 + 4 + 1);
    }

    #[test]
    fn assembles_the_stack_mode_addition_scenario() {
        let image = assemble(".MODE stack\nLDI #7\nLDI #35\nADD\nEXIT").unwrap();
        assert_eq!(image.bytes.len(), tinyvm_isa::HEADER_LEN + 5 + 5 + 1 + 1);
    }

    #[test]
    fn a_mislabeled_jump_fails_assembly_and_names_the_label() {
        let result = assemble(".MODE register\nJMP undefined_label\nEXIT");
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("undefined_label")));
    }

    #[test]
    fn multiple_problems_are_all_reported_in_one_run() {
        let result = assemble(".MODE register\nFROB R0\nJMP also_missing");
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
