//! Line tokenization: strip comments, split off a label, split the
//! mnemonic from its comma-separated arguments.
//!
//! Lines are processed independently of one another. A line comment starts
//! with `;` or `//`; a label is a token terminated by `:`; string literal
//! arguments are `"…"` and may contain commas.

/// One tokenized source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// A leading `label:`, if present.
    pub label: Option<String>,
    /// The mnemonic or `.directive`, if the line has one past its label.
    pub opcode: Option<String>,
    /// Comma-separated arguments, whitespace-trimmed.
    pub args: Vec<String>,
}

/// Tokenize one line. Returns `Err` with a human-readable message on a
/// lexical problem (invalid label, unterminated string, invalid mnemonic
/// characters).
pub fn tokenize(raw: &str) -> Result<Line, String> {
    let code = strip_comment(raw).trim();
    if code.is_empty() {
        return Ok(Line::default());
    }

    let (label, rest) = split_label(code)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Line {
            label,
            opcode: None,
            args: Vec::new(),
        });
    }

    let (opcode, args_text) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim_start()),
        None => (rest, ""),
    };
    validate_opcode(opcode)?;

    Ok(Line {
        label,
        opcode: Some(opcode.to_string()),
        args: split_args(args_text)?,
    })
}

fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b';' if !in_string => return &line[..i],
            b'/' if !in_string && i + 1 < bytes.len() && bytes[i + 1] == b'/' => return &line[..i],
            _ => {}
        }
        i += 1;
    }
    line
}

fn split_label(code: &str) -> Result<(Option<String>, &str), String> {
    match code.find(':') {
        Some(pos) => {
            let label = code[..pos].trim();
            if label.is_empty() || label.chars().any(char::is_whitespace) {
                return Err(format!("invalid label \"{label}\""));
            }
            Ok((Some(label.to_string()), &code[pos + 1..]))
        }
        None => Ok((None, code)),
    }
}

fn validate_opcode(opcode: &str) -> Result<(), String> {
    let valid = opcode
        .chars()
        .all(|c| c == '.' || c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(format!("invalid instruction \"{opcode}\""))
    }
}

fn split_args(text: &str) -> Result<Vec<String>, String> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    for c in text.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            ',' if !in_string => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if in_string {
        return Err("string has no closing \"".to_string());
    }
    args.push(current.trim().to_string());
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_label_opcode_and_args() {
        let line = tokenize("loop: ADDI R0,R0,#1 ; step").unwrap();
        assert_eq!(line.label.as_deref(), Some("loop"));
        assert_eq!(line.opcode.as_deref(), Some("ADDI"));
        assert_eq!(line.args, vec!["R0", "R0", "#1"]);
    }

    #[test]
    fn a_bare_comment_line_is_empty() {
        assert_eq!(tokenize("  // nothing here"), Ok(Line::default()));
        assert_eq!(tokenize("; also nothing"), Ok(Line::default()));
    }

    #[test]
    fn a_quoted_argument_may_contain_commas() {
        let line = tokenize(".WORD 8, \"a, b\"").unwrap();
        assert_eq!(line.opcode.as_deref(), Some(".WORD"));
        assert_eq!(line.args, vec!["8", "\"a, b\""]);
    }

    #[test]
    fn an_unterminated_string_is_an_error() {
        assert!(tokenize(".WORD 4, \"oops").is_err());
    }

    #[test]
    fn a_label_with_embedded_whitespace_is_rejected() {
        assert!(tokenize("bad label: NOP").is_err());
    }
}
