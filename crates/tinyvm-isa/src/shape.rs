//! Operand shapes shared by every opcode table.
//!
//! An instruction is a one-byte opcode followed by a fixed (per-opcode)
//! run of operand bytes. Fields are not naturally aligned: a `Shape` knows
//! only how many bytes each field occupies and in what order, so decoding
//! is always byte-by-byte assembly rather than a native unaligned load.

/// The operand layout that follows an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No operand bytes.
    None,
    /// A single register index or 8-bit immediate.
    Reg,
    /// Two register indices.
    Reg2,
    /// Three register indices.
    Reg3,
    /// One register, one 8-bit immediate; the register byte comes first
    /// on the wire (`LDL`/`LDA` and their `.64` variants).
    RegU8,
    /// One 8-bit immediate, one register; the immediate byte comes first
    /// on the wire (`STL`/`STA` and their `.64` variants).
    U8Reg,
    /// One register, one 32-bit immediate.
    RegImm32,
    /// One register, one 64-bit immediate.
    RegImm64,
    /// Two registers, one 32-bit immediate.
    Reg2Imm32,
    /// Two registers, one 64-bit immediate.
    Reg2Imm64,
    /// Two registers, one trailing byte (decimal precision for float/double
    /// to-string conversions).
    Reg2U8,
    /// A bare 32-bit immediate (jump/call targets, stack-ISA literals).
    Imm32,
    /// A bare 64-bit immediate.
    Imm64,
    /// A bare 8-bit immediate (`RET`, `SCALL`, `SARG` argument counts/ids).
    Imm8,
}

impl Shape {
    /// Number of operand bytes this shape occupies, not counting the
    /// leading opcode byte.
    pub const fn operand_len(self) -> usize {
        match self {
            Shape::None => 0,
            Shape::Reg | Shape::Imm8 => 1,
            Shape::Reg2 | Shape::RegU8 | Shape::U8Reg => 2,
            Shape::Reg3 | Shape::Reg2U8 => 3,
            Shape::RegImm32 => 5,
            Shape::Reg2Imm32 => 6,
            Shape::Imm32 => 4,
            Shape::RegImm64 => 9,
            Shape::Reg2Imm64 => 10,
            Shape::Imm64 => 8,
        }
    }

    /// Total instruction length in bytes, including the opcode byte.
    pub const fn instruction_len(self) -> usize {
        1 + self.operand_len()
    }

    /// Number of source-level arguments (registers, immediates, or the
    /// trailing precision byte) a mnemonic of this shape takes.
    pub const fn arg_count(self) -> usize {
        match self {
            Shape::None => 0,
            Shape::Reg | Shape::Imm32 | Shape::Imm64 | Shape::Imm8 => 1,
            Shape::Reg2 | Shape::RegU8 | Shape::U8Reg | Shape::RegImm32 | Shape::RegImm64 => 2,
            Shape::Reg3 | Shape::Reg2Imm32 | Shape::Reg2Imm64 | Shape::Reg2U8 => 3,
        }
    }
}
