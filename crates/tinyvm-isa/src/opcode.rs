//! Opcode tables for the shared control group and for each instruction set.
//!
//! Numbering follows the reference VM this toolchain is compatible with:
//! opcodes below `0x09` are interpreted identically regardless of mode,
//! and the two instruction sets reuse the numeric space from `0x09` up
//! with entirely different meanings per opcode.

use crate::shape::Shape;

macro_rules! op_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(= $disc:expr)? => ($mnemonic:literal, $shape:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant $(= $disc)?, )+
        }

        impl $name {
            /// All variants, in declaration (ascending opcode) order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Decode an opcode byte into this table, if it names a member.
            pub fn from_u8(byte: u8) -> Option<Self> {
                match byte {
                    $( x if x == $name::$variant as u8 => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The textual mnemonic used by the assembler.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( $name::$variant => $mnemonic, )+
                }
            }

            /// Operand layout following the opcode byte.
            pub const fn shape(self) -> Shape {
                match self {
                    $( $name::$variant => $shape, )+
                }
            }

            /// Look up a member by its assembly mnemonic.
            pub fn from_mnemonic(text: &str) -> Option<Self> {
                $name::ALL.iter().copied().find(|op| op.mnemonic() == text)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

op_enum! {
    /// Opcodes shared verbatim between both instruction sets: control flow
    /// and host calls.
    ControlOp {
        Nop = 0x00 => ("NOP", Shape::None),
        Exit => ("EXIT", Shape::None),
        Jmp => ("JMP", Shape::Imm32),
        Call => ("CALL", Shape::Imm32),
        Ret => ("RET", Shape::Imm8),
        Ret32 => ("RET.32", Shape::Imm8),
        Ret64 => ("RET.64", Shape::Imm8),
        Scall => ("SCALL", Shape::Imm8),
        Sarg => ("SARG", Shape::Imm8),
    }
}

op_enum! {
    /// The register-machine instruction set.
    RegisterOp {
        Mov = 0x09 => ("MOV", Shape::Reg2),
        MovD => ("MOV.64", Shape::Reg2),
        Ldi => ("LDI", Shape::RegImm32),
        LdiD => ("LDI.64", Shape::RegImm64),
        Stm => ("STM", Shape::Reg2),
        StmD => ("STM.64", Shape::Reg2),
        Stmi => ("STMI", Shape::Reg2Imm32),
        StmiD => ("STMI.64", Shape::Reg2Imm32),
        Ldm => ("LDM", Shape::Reg2),
        LdmD => ("LDM.64", Shape::Reg2),
        Ldmi => ("LDMI", Shape::Reg2Imm32),
        LdmiD => ("LDMI.64", Shape::Reg2Imm32),
        Ldl => ("LDL", Shape::RegU8),
        LdlD => ("LDL.64", Shape::RegU8),
        Lda => ("LDA", Shape::RegU8),
        LdaD => ("LDA.64", Shape::RegU8),
        Stl => ("STL", Shape::U8Reg),
        StlD => ("STL.64", Shape::U8Reg),
        Sta => ("STA", Shape::U8Reg),
        StaD => ("STA.64", Shape::U8Reg),
        /// Push a register's value to the top of stack (bridges into a
        /// `CALL`'s argument area).
        Movs => ("MOVS", Shape::Reg),
        MovsD => ("MOVS.64", Shape::Reg),
        /// Pop the top of stack into a register.
        Pop => ("POP", Shape::Reg),
        PopD => ("POP.64", Shape::Reg),
        /// Push a register's value to the top of stack. Distinct from
        /// `MOVS` only in the mnemonic used by callers pushing arguments.
        Push => ("PUSH", Shape::Reg),
        PushD => ("PUSH.64", Shape::Reg),

        Add = 0x23 => ("ADD", Shape::Reg3),
        AddD => ("ADD.64", Shape::Reg3),
        AddF => ("ADD.F", Shape::Reg3),
        AddF64 => ("ADD.F64", Shape::Reg3),
        Addi => ("ADDI", Shape::Reg2Imm32),
        AddiD => ("ADDI.64", Shape::Reg2Imm64),
        AddiF => ("ADDI.F", Shape::Reg2Imm32),
        AddiF64 => ("ADDI.F64", Shape::Reg2Imm64),
        Sub => ("SUB", Shape::Reg3),
        SubD => ("SUB.64", Shape::Reg3),
        SubF => ("SUB.F", Shape::Reg3),
        SubF64 => ("SUB.F64", Shape::Reg3),
        Subi => ("SUBI", Shape::Reg2Imm32),
        SubiD => ("SUBI.64", Shape::Reg2Imm64),
        SubiF => ("SUBI.F", Shape::Reg2Imm32),
        SubiF64 => ("SUBI.F64", Shape::Reg2Imm64),
        Mul => ("MUL", Shape::Reg3),
        MulD => ("MUL.64", Shape::Reg3),
        MulF => ("MUL.F", Shape::Reg3),
        MulF64 => ("MUL.F64", Shape::Reg3),
        Muli => ("MULI", Shape::Reg2Imm32),
        MuliD => ("MULI.64", Shape::Reg2Imm64),
        MuliF => ("MULI.F", Shape::Reg2Imm32),
        MuliF64 => ("MULI.F64", Shape::Reg2Imm64),
        Div => ("DIV", Shape::Reg3),
        DivD => ("DIV.64", Shape::Reg3),
        DivF => ("DIV.F", Shape::Reg3),
        DivF64 => ("DIV.F64", Shape::Reg3),
        Divi => ("DIVI", Shape::Reg2Imm32),
        DiviD => ("DIVI.64", Shape::Reg2Imm64),
        DiviF => ("DIVI.F", Shape::Reg2Imm32),
        DiviF64 => ("DIVI.F64", Shape::Reg2Imm64),

        Inv = 0x43 => ("INV", Shape::Reg2),
        InvD => ("INV.64", Shape::Reg2),
        Neg => ("NEG", Shape::Reg2),
        NegD => ("NEG.64", Shape::Reg2),
        NegF => ("NEG.F", Shape::Reg2),
        NegF64 => ("NEG.F64", Shape::Reg2),
        Bor => ("BOR", Shape::Reg3),
        BorD => ("BOR.64", Shape::Reg3),
        Bori => ("BORI", Shape::Reg2Imm32),
        BoriD => ("BORI.64", Shape::Reg2Imm64),
        Bxor => ("BXOR", Shape::Reg3),
        BxorD => ("BXOR.64", Shape::Reg3),
        Bxori => ("BXORI", Shape::Reg2Imm32),
        BxoriD => ("BXORI.64", Shape::Reg2Imm64),
        Band => ("BAND", Shape::Reg3),
        BandD => ("BAND.64", Shape::Reg3),
        Bandi => ("BANDI", Shape::Reg2Imm32),
        BandiD => ("BANDI.64", Shape::Reg2Imm64),

        Or = 0x55 => ("OR", Shape::Reg2),
        Ori => ("ORI", Shape::RegImm32),
        And => ("AND", Shape::Reg2),
        Andi => ("ANDI", Shape::RegImm32),
        Cpz => ("CPZ", Shape::Reg),
        CpzD => ("CPZ.64", Shape::Reg),
        Cpi => ("CPI", Shape::RegImm32),
        CpiD => ("CPI.64", Shape::RegImm64),
        Cpeq => ("CPEQ", Shape::Reg2),
        CpeqD => ("CPEQ.64", Shape::Reg2),
        CpeqF => ("CPEQ.F", Shape::Reg2),
        CpeqF64 => ("CPEQ.F64", Shape::Reg2),
        Cpnq => ("CPNQ", Shape::Reg2),
        CpnqD => ("CPNQ.64", Shape::Reg2),
        CpnqF => ("CPNQ.F", Shape::Reg2),
        CpnqF64 => ("CPNQ.F64", Shape::Reg2),
        Cpgt => ("CPGT", Shape::Reg2),
        CpgtD => ("CPGT.64", Shape::Reg2),
        CpgtF => ("CPGT.F", Shape::Reg2),
        CpgtF64 => ("CPGT.F64", Shape::Reg2),
        Cplt => ("CPLT", Shape::Reg2),
        CpltD => ("CPLT.64", Shape::Reg2),
        CpltF => ("CPLT.F", Shape::Reg2),
        CpltF64 => ("CPLT.F64", Shape::Reg2),
        Cpgq => ("CPGQ", Shape::Reg2),
        CpgqD => ("CPGQ.64", Shape::Reg2),
        CpgqF => ("CPGQ.F", Shape::Reg2),
        CpgqF64 => ("CPGQ.F64", Shape::Reg2),
        Cplq => ("CPLQ", Shape::Reg2),
        CplqD => ("CPLQ.64", Shape::Reg2),
        CplqF => ("CPLQ.F", Shape::Reg2),
        CplqF64 => ("CPLQ.F64", Shape::Reg2),
        Cpstr => ("CPSTR", Shape::Reg2),
        Cpchr => ("CPCHR", Shape::Reg2),
        Brz => ("BRZ", Shape::Imm32),
        Brnz => ("BRNZ", Shape::Imm32),
        Briz => ("BRIZ", Shape::Reg),
        Brinz => ("BRINZ", Shape::Reg),
        Jmpi => ("JMPI", Shape::Reg),

        Itol = 0x7c => ("ITOL", Shape::Reg2),
        Itof => ("ITOF", Shape::Reg2),
        Itod => ("ITOD", Shape::Reg2),
        Itos => ("ITOS", Shape::Reg2),
        Ltoi => ("LTOI", Shape::Reg2),
        Ltof => ("LTOF", Shape::Reg2),
        Ltod => ("LTOD", Shape::Reg2),
        Ltos => ("LTOS", Shape::Reg2),
        Ftoi => ("FTOI", Shape::Reg2),
        Ftol => ("FTOL", Shape::Reg2),
        Ftod => ("FTOD", Shape::Reg2),
        Ftos => ("FTOS", Shape::Reg2U8),
        Dtoi => ("DTOI", Shape::Reg2),
        Dtol => ("DTOL", Shape::Reg2),
        Dtof => ("DTOF", Shape::Reg2),
        Dtos => ("DTOS", Shape::Reg2U8),
        Stoi => ("STOI", Shape::Reg2Imm32),
        Stol => ("STOL", Shape::Reg2Imm64),
        Stof => ("STOF", Shape::Reg2Imm32),
        Stod => ("STOD", Shape::Reg2Imm64),

        New = 0x90 => ("NEW", Shape::Reg2),
        Newi => ("NEWI", Shape::RegImm32),
        Del => ("DEL", Shape::Reg),
        Resz => ("RESZ", Shape::Reg2),
        Reszi => ("RESZI", Shape::RegImm32),
        Size => ("SIZE", Shape::Reg2),
        Str => ("STR", Shape::RegImm32),
        Strcpy => ("STRCPY", Shape::Reg2Imm32),
        Strcat => ("STRCAT", Shape::Reg2Imm32),
        Strcmb => ("STRCMB", Shape::Reg3),
    }
}

op_enum! {
    /// The stack-machine instruction set. Operands that the register ISA
    /// names explicitly are instead popped from, or pushed to, the top of
    /// the operand stack.
    StackOp {
        Ldi = 0x09 => ("LDI", Shape::Imm32),
        LdiD => ("LDI.64", Shape::Imm64),
        Stm => ("STM", Shape::None),
        StmD => ("STM.64", Shape::None),
        Stmi => ("STMI", Shape::Imm32),
        StmiD => ("STMI.64", Shape::Imm32),
        Ldm => ("LDM", Shape::None),
        LdmD => ("LDM.64", Shape::None),
        Ldmi => ("LDMI", Shape::Imm32),
        LdmiD => ("LDMI.64", Shape::Imm32),
        Ldl => ("LDL", Shape::Imm8),
        LdlD => ("LDL.64", Shape::Imm8),
        Lda => ("LDA", Shape::Imm8),
        LdaD => ("LDA.64", Shape::Imm8),
        Stl => ("STL", Shape::Imm8),
        StlD => ("STL.64", Shape::Imm8),
        Sta => ("STA", Shape::Imm8),
        StaD => ("STA.64", Shape::Imm8),

        Add = 0x1b => ("ADD", Shape::None),
        AddD => ("ADD.64", Shape::None),
        AddF => ("ADD.F", Shape::None),
        AddF64 => ("ADD.F64", Shape::None),
        Sub => ("SUB", Shape::None),
        SubD => ("SUB.64", Shape::None),
        SubF => ("SUB.F", Shape::None),
        SubF64 => ("SUB.F64", Shape::None),
        Mul => ("MUL", Shape::None),
        MulD => ("MUL.64", Shape::None),
        MulF => ("MUL.F", Shape::None),
        MulF64 => ("MUL.F64", Shape::None),
        Div => ("DIV", Shape::None),
        DivD => ("DIV.64", Shape::None),
        DivF => ("DIV.F", Shape::None),
        DivF64 => ("DIV.F64", Shape::None),

        Inv = 0x2b => ("INV", Shape::None),
        InvD => ("INV.64", Shape::None),
        Neg => ("NEG", Shape::None),
        NegD => ("NEG.64", Shape::None),
        NegF => ("NEG.F", Shape::None),
        NegF64 => ("NEG.F64", Shape::None),
        Bor => ("BOR", Shape::None),
        BorD => ("BOR.64", Shape::None),
        Bxor => ("BXOR", Shape::None),
        BxorD => ("BXOR.64", Shape::None),
        Band => ("BAND", Shape::None),
        BandD => ("BAND.64", Shape::None),

        Or = 0x37 => ("OR", Shape::None),
        And => ("AND", Shape::None),
        Cpz => ("CPZ", Shape::None),
        CpzD => ("CPZ.64", Shape::None),
        Cpeq => ("CPEQ", Shape::None),
        CpeqD => ("CPEQ.64", Shape::None),
        CpeqF => ("CPEQ.F", Shape::None),
        CpeqF64 => ("CPEQ.F64", Shape::None),
        Cpnq => ("CPNQ", Shape::None),
        CpnqD => ("CPNQ.64", Shape::None),
        CpnqF => ("CPNQ.F", Shape::None),
        CpnqF64 => ("CPNQ.F64", Shape::None),
        Cpgt => ("CPGT", Shape::None),
        CpgtD => ("CPGT.64", Shape::None),
        CpgtF => ("CPGT.F", Shape::None),
        CpgtF64 => ("CPGT.F64", Shape::None),
        Cplt => ("CPLT", Shape::None),
        CpltD => ("CPLT.64", Shape::None),
        CpltF => ("CPLT.F", Shape::None),
        CpltF64 => ("CPLT.F64", Shape::None),
        Cpgq => ("CPGQ", Shape::None),
        CpgqD => ("CPGQ.64", Shape::None),
        CpgqF => ("CPGQ.F", Shape::None),
        CpgqF64 => ("CPGQ.F64", Shape::None),
        Cplq => ("CPLQ", Shape::None),
        CplqD => ("CPLQ.64", Shape::None),
        CplqF => ("CPLQ.F", Shape::None),
        CplqF64 => ("CPLQ.F64", Shape::None),
        Cpstr => ("CPSTR", Shape::None),
        Cpchr => ("CPCHR", Shape::None),
        Brz => ("BRZ", Shape::Imm32),
        Brnz => ("BRNZ", Shape::Imm32),
        Briz => ("BRIZ", Shape::None),
        Brinz => ("BRINZ", Shape::None),
        Jmpi => ("JMPI", Shape::None),

        Itol = 0x5a => ("ITOL", Shape::None),
        Itof => ("ITOF", Shape::None),
        Itod => ("ITOD", Shape::None),
        Itos => ("ITOS", Shape::None),
        Ltoi => ("LTOI", Shape::None),
        Ltof => ("LTOF", Shape::None),
        Ltod => ("LTOD", Shape::None),
        Ltos => ("LTOS", Shape::None),
        Ftoi => ("FTOI", Shape::None),
        Ftol => ("FTOL", Shape::None),
        Ftod => ("FTOD", Shape::None),
        Ftos => ("FTOS", Shape::Imm8),
        Dtoi => ("DTOI", Shape::None),
        Dtol => ("DTOL", Shape::None),
        Dtof => ("DTOF", Shape::None),
        Dtos => ("DTOS", Shape::Imm8),
        Stoi => ("STOI", Shape::Imm32),
        Stol => ("STOL", Shape::Imm64),
        Stof => ("STOF", Shape::Imm32),
        Stod => ("STOD", Shape::Imm64),

        New = 0x6e => ("NEW", Shape::None),
        Del => ("DEL", Shape::None),
        Resz => ("RESZ", Shape::None),
        Size => ("SIZE", Shape::None),
        Str => ("STR", Shape::Imm32),
        Strcpy => ("STRCPY", Shape::Imm32),
        Strcat => ("STRCAT", Shape::Imm32),
        Strcmb => ("STRCMB", Shape::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_opcode_numbering_matches_the_wire_format() {
        assert_eq!(ControlOp::Nop as u8, 0x00);
        assert_eq!(ControlOp::Exit as u8, 0x01);
        assert_eq!(ControlOp::Jmp as u8, 0x02);
        assert_eq!(ControlOp::Call as u8, 0x03);
        assert_eq!(ControlOp::Ret as u8, 0x04);
        assert_eq!(ControlOp::Scall as u8, 0x07);
        assert_eq!(ControlOp::Sarg as u8, 0x08);
    }

    #[test]
    fn register_opcode_numbering_matches_the_wire_format() {
        assert_eq!(RegisterOp::Mov as u8, 0x09);
        assert_eq!(RegisterOp::Ldi as u8, 0x0b);
        assert_eq!(RegisterOp::LdiD as u8, 0x0c);
        assert_eq!(RegisterOp::Add as u8, 0x23);
        assert_eq!(RegisterOp::Addi as u8, 0x27);
        assert_eq!(RegisterOp::AddiD as u8, 0x28);
    }

    #[test]
    fn stack_opcode_numbering_matches_the_wire_format() {
        assert_eq!(StackOp::Ldi as u8, 0x09);
        assert_eq!(StackOp::Add as u8, 0x1b);
    }

    #[test]
    fn instruction_lengths_match_the_documented_table() {
        assert_eq!(ControlOp::Nop.shape().instruction_len(), 1);
        assert_eq!(ControlOp::Exit.shape().instruction_len(), 1);
        assert_eq!(ControlOp::Jmp.shape().instruction_len(), 5);
        assert_eq!(ControlOp::Call.shape().instruction_len(), 5);
        assert_eq!(ControlOp::Ret.shape().instruction_len(), 2);
        assert_eq!(ControlOp::Scall.shape().instruction_len(), 2);
        assert_eq!(ControlOp::Sarg.shape().instruction_len(), 2);
        assert_eq!(RegisterOp::Mov.shape().instruction_len(), 3);
        assert_eq!(RegisterOp::Ldi.shape().instruction_len(), 6);
        assert_eq!(RegisterOp::LdiD.shape().instruction_len(), 10);
        assert_eq!(RegisterOp::Add.shape().instruction_len(), 4);
        assert_eq!(RegisterOp::Addi.shape().instruction_len(), 7);
        assert_eq!(RegisterOp::AddiD.shape().instruction_len(), 11);
        assert_eq!(StackOp::Ldi.shape().instruction_len(), 5);
        assert_eq!(StackOp::Add.shape().instruction_len(), 1);
    }

    #[test]
    fn every_mnemonic_round_trips_through_lookup() {
        for op in RegisterOp::ALL {
            assert_eq!(RegisterOp::from_mnemonic(op.mnemonic()), Some(*op));
        }
        for op in StackOp::ALL {
            assert_eq!(StackOp::from_mnemonic(op.mnemonic()), Some(*op));
        }
    }
}
