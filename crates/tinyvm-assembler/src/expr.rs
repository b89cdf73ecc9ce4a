//! Argument-expression evaluation: integer/float literals, labels, and a
//! single binary operator between two literal-or-label sub-terms.
//!
//! A leading `#` marks an argument as an immediate rather than a bare
//! register/label reference; it is stripped before evaluation since both
//! forms resolve through the same literal-or-label grammar.

use crate::error::AssembleError;
use crate::label::LabelTable;

/// Resolve one argument token to a 64-bit value, recording any failure
/// against `line` in `errors` and returning `0` for the token.
pub fn evaluate(arg: &str, labels: &mut LabelTable, line: u32, errors: &mut Vec<AssembleError>) -> u64 {
    let arg = arg.strip_prefix('#').unwrap_or(arg).trim();

    if is_signed_integer(arg) {
        return arg.parse::<i64>().unwrap_or(0) as u64;
    }

    if let Some(pos) = find_operator(arg) {
        let op = arg.as_bytes()[pos] as char;
        let (left_text, right_text) = (&arg[..pos], &arg[pos + 1..]);
        if find_operator(right_text).is_some() {
            errors.push(AssembleError::new(
                line,
                format!("invalid argument \"{arg}\": expressions with multiple operators are not supported"),
            ));
            return 0;
        }

        let left = resolve_term(left_text, labels, line, errors);
        let right = resolve_term(right_text, labels, line, errors);
        let (Some(left), Some(right)) = (left, right) else {
            return 0;
        };
        return match op {
            '+' => left.wrapping_add(right) as u64,
            '-' => left.wrapping_sub(right) as u64,
            '*' => left.wrapping_mul(right) as u64,
            '/' => {
                if right == 0 {
                    errors.push(AssembleError::new(line, format!("division by zero in \"{arg}\"")));
                    0
                } else {
                    (left / right) as u64
                }
            }
            _ => unreachable!("find_operator only returns +-*/"),
        };
    }

    let negative = arg.starts_with('-');
    let label = if negative { &arg[1..] } else { arg };
    match labels.resolve(label) {
        Some(address) => {
            if negative {
                (address as i64).wrapping_neg() as u32 as u64
            } else {
                address as u64
            }
        }
        None => {
            errors.push(AssembleError::new(line, format!("use of undefined label \"{label}\"")));
            0
        }
    }
}

fn resolve_term(text: &str, labels: &mut LabelTable, line: u32, errors: &mut Vec<AssembleError>) -> Option<u32> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse::<u32>().ok().or(Some(0));
    }
    match labels.resolve(text) {
        Some(address) => Some(address),
        None => {
            errors.push(AssembleError::new(line, format!("use of undefined label \"{text}\"")));
            None
        }
    }
}

fn is_signed_integer(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit())
}

/// First `+-*/` at an index greater than zero, so a leading `-` is treated
/// as negation rather than a binary operator.
fn find_operator(text: &str) -> Option<usize> {
    text.char_indices()
        .skip(1)
        .find(|&(_, c)| matches!(c, '+' | '-' | '*' | '/'))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literals_round_trip() {
        let mut labels = LabelTable::new();
        let mut errors = Vec::new();
        assert_eq!(evaluate("#7", &mut labels, 1, &mut errors), 7);
        assert_eq!(evaluate("-1", &mut labels, 1, &mut errors), u32::MAX as u64);
        assert!(errors.is_empty());
    }

    #[test]
    fn labels_resolve_through_the_table() {
        let mut labels = LabelTable::new();
        labels.define("top", 64);
        let mut errors = Vec::new();
        assert_eq!(evaluate("top", &mut labels, 1, &mut errors), 64);
        assert!(errors.is_empty());
    }

    #[test]
    fn a_single_binary_expression_evaluates() {
        let mut labels = LabelTable::new();
        labels.define("base", 100);
        let mut errors = Vec::new();
        assert_eq!(evaluate("base+4", &mut labels, 1, &mut errors), 104);
        assert!(errors.is_empty());
    }

    #[test]
    fn multiple_operators_is_an_error() {
        let mut labels = LabelTable::new();
        let mut errors = Vec::new();
        evaluate("1+2+3", &mut labels, 1, &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn an_undefined_label_is_an_error() {
        let mut labels = LabelTable::new();
        let mut errors = Vec::new();
        evaluate("nowhere", &mut labels, 1, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("nowhere"));
    }
}
