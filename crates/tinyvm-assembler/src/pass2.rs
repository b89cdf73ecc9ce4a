//! Pass 2: the emission pass. Resolves each canonical line's arguments to
//! concrete values and appends the binary encoding (or `.WORD` payload) to
//! the output buffer.

use tinyvm_isa::{Mode, Shape};

use crate::error::AssembleError;
use crate::expr;
use crate::label::LabelTable;
use crate::lookup;
use crate::pass1::IntermediateLine;

/// Emit the program body (everything after the 16-byte header) for the
/// canonical lines pass 1 produced.
pub fn run(mode: Mode, lines: &[IntermediateLine], labels: &mut LabelTable, errors: &mut Vec<AssembleError>) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        if line.opcode == ".WORD" {
            emit_word(line, &mut out, errors);
            continue;
        }

        let Some(op) = lookup::resolve(mode, &line.opcode) else {
            errors.push(AssembleError::new(line.source_line, format!("unknown instruction \"{}\"", line.opcode)));
            continue;
        };
        let shape = op.shape();
        let values: Vec<u64> = line
            .args
            .iter()
            .map(|arg| expr::evaluate(arg, labels, line.source_line, errors))
            .collect();
        if values.len() != shape.arg_count() {
            continue;
        }

        out.push(op.byte());
        out.extend(encode_operands(shape, &values));
    }
    out
}

fn encode_operands(shape: Shape, args: &[u64]) -> Vec<u8> {
    match shape {
        Shape::None => Vec::new(),
        Shape::Reg | Shape::Imm8 => vec![args[0] as u8],
        Shape::Reg2 => vec![args[0] as u8, args[1] as u8],
        // Source order is always `offset,register` (`LDL/STL b,Ra`); the
        // wire order differs per mnemonic family, matching the original.
        Shape::RegU8 => vec![args[1] as u8, args[0] as u8],
        Shape::U8Reg => vec![args[0] as u8, args[1] as u8],
        Shape::Reg3 | Shape::Reg2U8 => vec![args[0] as u8, args[1] as u8, args[2] as u8],
        Shape::RegImm32 => {
            let mut bytes = vec![args[0] as u8];
            bytes.extend_from_slice(&(args[1] as u32).to_le_bytes());
            bytes
        }
        Shape::RegImm64 => {
            let mut bytes = vec![args[0] as u8];
            bytes.extend_from_slice(&args[1].to_le_bytes());
            bytes
        }
        Shape::Reg2Imm32 => {
            let mut bytes = vec![args[0] as u8, args[1] as u8];
            bytes.extend_from_slice(&(args[2] as u32).to_le_bytes());
            bytes
        }
        Shape::Reg2Imm64 => {
            let mut bytes = vec![args[0] as u8, args[1] as u8];
            bytes.extend_from_slice(&args[2].to_le_bytes());
            bytes
        }
        Shape::Imm32 => (args[0] as u32).to_le_bytes().to_vec(),
        Shape::Imm64 => args[0].to_le_bytes().to_vec(),
    }
}

fn emit_word(line: &IntermediateLine, out: &mut Vec<u8>, errors: &mut Vec<AssembleError>) {
    let Some(count) = line.args.first().and_then(|v| v.parse::<u32>().ok()) else {
        errors.push(AssembleError::new(line.source_line, "invalid word count for \".WORD\""));
        return;
    };
    let byte_len = (count * 4) as usize;
    let Some(value) = line.args.get(1) else {
        errors.push(AssembleError::new(line.source_line, "no data defined for \".WORD\""));
        return;
    };

    if let Some(text) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(byte_len, 0);
        out.extend_from_slice(&bytes);
    } else if let Some(float_text) = value.strip_suffix('f') {
        match float_text.parse::<f32>() {
            Ok(v) => out.extend_from_slice(&v.to_le_bytes()),
            Err(_) => errors.push(AssembleError::new(line.source_line, format!("invalid float literal \"{value}\""))),
        }
    } else if value.contains('.') {
        match value.parse::<f64>() {
            Ok(v) => out.extend_from_slice(&v.to_le_bytes()),
            Err(_) => errors.push(AssembleError::new(line.source_line, format!("invalid double literal \"{value}\""))),
        }
    } else {
        match count {
            1 => match value.parse::<u32>() {
                Ok(v) => out.extend_from_slice(&v.to_le_bytes()),
                Err(_) => errors.push(AssembleError::new(line.source_line, format!("invalid integer literal \"{value}\""))),
            },
            2 => match value.parse::<u64>() {
                Ok(v) => out.extend_from_slice(&v.to_le_bytes()),
                Err(_) => errors.push(AssembleError::new(line.source_line, format!("invalid integer literal \"{value}\""))),
            },
            _ => errors.push(AssembleError::new(
                line.source_line,
                "\".WORD\" integer/float data must declare a count of 1 or 2",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass1;

    fn assemble_body(source: &str) -> (Vec<u8>, Vec<AssembleError>) {
        let mut errors = Vec::new();
        let (header, lines, mut labels) = pass1::run(source, &mut errors);
        let body = run(header.mode, &lines, &mut labels, &mut errors);
        (body, errors)
    }

    #[test]
    fn encodes_a_register_mode_addition() {
        let (body, errors) = assemble_body(".MODE register\nLDI R0,#7\nLDI R1,#35\nADD R2,R0,R1\nEXIT");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(body[0], tinyvm_isa::RegisterOp::Ldi as u8);
        assert_eq!(&body[2..6], &7u32.to_le_bytes());
    }

    #[test]
    fn a_string_word_is_padded_to_the_declared_length() {
        let (body, errors) = assemble_body(".MODE register\nEXIT\n.WORD 2, \"hi\"");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(&body[body.len() - 8..], &[b'h', b'i', 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn a_string_word_truncated_to_its_declared_length() {
        let (body, errors) = assemble_body(".MODE register\nEXIT\n.WORD 1, \"abcd\"");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(&body[body.len() - 4..], b"abcd");
    }

    #[test]
    fn an_undefined_label_fails_the_pass() {
        let (_, errors) = assemble_body(".MODE register\nJMP undefined_label");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("undefined_label"));
    }
}
