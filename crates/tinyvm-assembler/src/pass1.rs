//! Pass 1: the scanning pass. Resolves labels against byte addresses,
//! executes assembler directives, and rewrites every instruction line into
//! a canonical `(opcode, args, address)` intermediate form for pass 2.

use tinyvm_isa::Mode;

use crate::error::AssembleError;
use crate::label::LabelTable;
use crate::lexer;
use crate::lookup;

/// Header fields directives can mutate, in the byte-denominated units
/// `tinyvm_isa::Header` expects (the textual `.HEAP`/`.HEAP_MAX` operands
/// are KiB and get multiplied here, once, rather than at load time).
#[derive(Debug, Clone, Copy)]
pub struct HeaderFields {
    pub mode: Mode,
    pub heap_initial: u32,
    pub heap_max: u32,
    pub data_start: u32,
}

const DEFAULT_HEAP_INITIAL_KIB: u32 = 4096;
const DEFAULT_HEAP_MAX_KIB: u32 = 65536;

impl Default for HeaderFields {
    fn default() -> Self {
        Self {
            mode: Mode::Register,
            heap_initial: DEFAULT_HEAP_INITIAL_KIB * 1024,
            heap_max: DEFAULT_HEAP_MAX_KIB * 1024,
            data_start: 0,
        }
    }
}

/// A single canonical line ready for pass 2: an opcode (or `.WORD`), its
/// raw argument text, and the byte address it starts at.
#[derive(Debug, Clone)]
pub struct IntermediateLine {
    pub source_line: u32,
    pub opcode: String,
    pub args: Vec<String>,
    pub address: u32,
}

/// Run pass 1 over `source`, returning the header fields it collected, the
/// canonical instruction/`.WORD` stream, and the label table pass 2 will
/// keep resolving against.
pub fn run(source: &str, errors: &mut Vec<AssembleError>) -> (HeaderFields, Vec<IntermediateLine>, LabelTable) {
    let mut labels = LabelTable::new();
    let mut header = HeaderFields::default();
    let mut address: u32 = 0;
    let mut data_start: Option<u32> = None;
    let mut lines = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line_no = (index + 1) as u32;
        let tokenized = match lexer::tokenize(raw) {
            Ok(line) => line,
            Err(message) => {
                errors.push(AssembleError::new(line_no, message));
                continue;
            }
        };

        if let Some(label) = &tokenized.label {
            if !labels.define(label, address) {
                errors.push(AssembleError::new(line_no, format!("multiple label definitions: \"{label}\"")));
            }
        }

        let Some(opcode) = tokenized.opcode else {
            continue;
        };

        if let Some(directive) = opcode.strip_prefix('.') {
            if directive == "WORD" {
                if data_start.is_none() {
                    data_start = Some(address);
                }
                match word_byte_len(&tokenized.args, line_no, errors) {
                    Some(len) => {
                        lines.push(IntermediateLine {
                            source_line: line_no,
                            opcode: ".WORD".to_string(),
                            args: tokenized.args,
                            address,
                        });
                        address += len;
                    }
                    None => continue,
                }
            } else {
                run_header_directive(directive, &tokenized.args, &mut header, address, line_no, errors);
            }
            continue;
        }

        match lookup::resolve(header.mode, &opcode) {
            Some(op) => {
                let arg_count = op.shape().arg_count();
                if tokenized.args.len() != arg_count {
                    errors.push(AssembleError::new(
                        line_no,
                        format!(
                            "\"{opcode}\" takes {arg_count} argument(s), found {}",
                            tokenized.args.len()
                        ),
                    ));
                }
                let len = op.shape().instruction_len() as u32;
                lines.push(IntermediateLine {
                    source_line: line_no,
                    opcode,
                    args: tokenized.args,
                    address,
                });
                address += len;
            }
            None => {
                errors.push(AssembleError::new(line_no, format!("unknown instruction \"{opcode}\"")));
            }
        }
    }

    header.data_start = data_start.unwrap_or(address);
    (header, lines, labels)
}

fn word_byte_len(args: &[String], line_no: u32, errors: &mut Vec<AssembleError>) -> Option<u32> {
    let Some(count_text) = args.first() else {
        errors.push(AssembleError::new(line_no, "\".WORD\" requires a word count"));
        return None;
    };
    let Ok(count) = count_text.parse::<u32>() else {
        errors.push(AssembleError::new(
            line_no,
            format!("invalid word count \"{count_text}\" for \".WORD\""),
        ));
        return None;
    };
    match args.get(1) {
        Some(value) if !value.is_empty() => Some(count * 4),
        _ => {
            errors.push(AssembleError::new(line_no, "no data defined for \".WORD\""));
            None
        }
    }
}

fn run_header_directive(
    directive: &str,
    args: &[String],
    header: &mut HeaderFields,
    address: u32,
    line_no: u32,
    errors: &mut Vec<AssembleError>,
) {
    match directive {
        "MODE" => {
            if address > 0 {
                errors.push(AssembleError::new(
                    line_no,
                    "\".MODE\" may only be declared before instructions",
                ));
                return;
            }
            match args.first().map(|v| v.to_ascii_lowercase()) {
                Some(ref m) if m == "register" => header.mode = Mode::Register,
                Some(ref m) if m == "stack" => header.mode = Mode::Stack,
                _ => errors.push(AssembleError::new(line_no, "invalid argument for \".MODE\"")),
            }
        }
        "HEAP" => set_kib_field(&mut header.heap_initial, args, "HEAP", line_no, errors),
        "HEAP_MAX" => set_kib_field(&mut header.heap_max, args, "HEAP_MAX", line_no, errors),
        other => errors.push(AssembleError::new(line_no, format!("unknown assembler directive \".{other}\""))),
    }
}

fn set_kib_field(field: &mut u32, args: &[String], name: &str, line_no: u32, errors: &mut Vec<AssembleError>) {
    match args.first().and_then(|v| v.parse::<u32>().ok()) {
        Some(kib) => *field = kib * 1024,
        None => errors.push(AssembleError::new(
            line_no,
            format!("invalid argument for \".{name}\". Must be an unsigned 32-bit integer"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_land_on_the_following_instructions_address() {
        let source = "top: NOP\nJMP top";
        let mut errors = Vec::new();
        let (_, lines, mut labels) = run(source, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(lines.len(), 2);
        assert_eq!(labels.resolve("top"), Some(0));
    }

    #[test]
    fn mode_after_an_instruction_is_rejected() {
        let source = "NOP\n.MODE stack";
        let mut errors = Vec::new();
        run(source, &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn word_directives_set_data_start_and_reserve_bytes() {
        let source = ".MODE register\nEXIT\n.WORD 2, 7";
        let mut errors = Vec::new();
        let (header, lines, _) = run(source, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(header.data_start, 1);
        assert_eq!(lines.last().unwrap().address, 1);
    }

    #[test]
    fn an_unknown_instruction_is_reported() {
        let mut errors = Vec::new();
        run(".MODE register\nFROB R0", &mut errors);
        assert_eq!(errors.len(), 1);
    }
}
