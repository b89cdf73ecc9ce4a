//! Mnemonic lookup shared by both passes: the control-flow/host-call
//! opcodes are mode-independent, everything else falls through to
//! whichever instruction set `.MODE` selected.

use tinyvm_isa::{ControlOp, Mode, RegisterOp, Shape, StackOp};

/// The instruction-set table entry a mnemonic resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Opcode {
    /// Shared between both instruction sets.
    Control(ControlOp),
    /// Register-ISA only.
    Register(RegisterOp),
    /// Stack-ISA only.
    Stack(StackOp),
}

impl Opcode {
    /// The operand shape this opcode takes.
    pub fn shape(self) -> Shape {
        match self {
            Opcode::Control(op) => op.shape(),
            Opcode::Register(op) => op.shape(),
            Opcode::Stack(op) => op.shape(),
        }
    }

    /// The opcode byte to emit.
    pub fn byte(self) -> u8 {
        match self {
            Opcode::Control(op) => op.into(),
            Opcode::Register(op) => op.into(),
            Opcode::Stack(op) => op.into(),
        }
    }
}

/// Resolve a mnemonic against the shared control table first, then the
/// instruction set `mode` selects.
pub fn resolve(mode: Mode, mnemonic: &str) -> Option<Opcode> {
    if let Some(op) = ControlOp::from_mnemonic(mnemonic) {
        return Some(Opcode::Control(op));
    }
    match mode {
        Mode::Register => RegisterOp::from_mnemonic(mnemonic).map(Opcode::Register),
        Mode::Stack => StackOp::from_mnemonic(mnemonic).map(Opcode::Stack),
    }
}
