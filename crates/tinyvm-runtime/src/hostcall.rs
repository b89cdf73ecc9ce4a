//! `SARG`/`SCALL` host calls: print, input, and in-heap string building.
//!
//! Argument values are popped off the operand stack in declaration order
//! (the topmost pushed value is the first positional argument), matching
//! the width recorded by the `SARG` that preceded it. This is the typed
//! argument-descriptor re-expression the design notes ask for, in place
//! of raw pointer arithmetic over a flag byte.

use std::io::Write;

use tinyvm_isa::Fault;

use crate::interpreter::Interpreter;

/// Flag bit: the argument is a heap pointer to a NUL-terminated string.
pub const FLAG_POINTER: u8 = 0x80;
/// Flag bit: the argument is an `f64`.
pub const FLAG_DOUBLE: u8 = 0x40;
/// Flag bit: the argument is an `f32`.
pub const FLAG_FLOAT: u8 = 0x20;
/// Flag bit: the argument is a 64-bit integer.
pub const FLAG_INT64: u8 = 0x10;

/// The host calls `SCALL` dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCallId {
    /// Print a formatted string to standard output.
    Print,
    /// Read a line from standard input into a new heap string.
    Input,
    /// Render a formatted string into a new heap string.
    Str,
}

impl HostCallId {
    /// Decode a `SCALL #id` argument.
    pub fn from_u8(id: u8) -> Result<Self, Fault> {
        match id {
            0 => Ok(Self::Print),
            1 => Ok(Self::Input),
            2 => Ok(Self::Str),
            _ => Err(Fault::InvalidHostCall),
        }
    }
}

enum Arg {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Str(String),
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Int32(v) => write!(f, "{v}"),
            Arg::Int64(v) => write!(f, "{v}"),
            Arg::Float(v) => write!(f, "{v}"),
            Arg::Double(v) => write!(f, "{v}"),
            Arg::Str(v) => write!(f, "{v}"),
        }
    }
}

impl Interpreter {
    /// `SARG #flags`: record the type of the next variadic argument.
    pub(crate) fn sarg(&mut self, flags: u8) -> Result<(), Fault> {
        if self.sarg_count >= self.sarg_flags.len() {
            return Err(Fault::InvalidHostCall);
        }
        self.sarg_flags[self.sarg_count] = flags;
        self.sarg_count += 1;
        Ok(())
    }

    /// `SCALL #id`: run the named host call against the recorded
    /// argument flags, then clear the scratch buffer.
    pub(crate) fn scall(&mut self, id: u8) -> Result<(), Fault> {
        let call = HostCallId::from_u8(id)?;
        let result = match call {
            HostCallId::Print => self.host_print(),
            HostCallId::Input => self.host_input(),
            HostCallId::Str => self.host_str(),
        };
        self.sarg_count = 0;
        self.sarg_flags = [0u8; 8];
        result
    }

    fn pop_args(&mut self, skip_format: bool) -> Result<(String, Vec<Arg>), Fault> {
        let format_addr = self.pop()?;
        let format = self.heap_cstring(format_addr)?;
        let mut args = Vec::with_capacity(self.sarg_count);
        let flag_start = if skip_format { 1 } else { 0 };
        let flags_to_process = self.sarg_flags[flag_start..self.sarg_count].to_vec();
        for flags in flags_to_process {
            let arg = if flags & FLAG_POINTER != 0 {
                let addr = self.pop()?;
                Arg::Str(self.heap_cstring(addr)?)
            } else if flags & FLAG_DOUBLE != 0 {
                Arg::Double(f64::from_bits(self.pop_u64()?))
            } else if flags & FLAG_FLOAT != 0 {
                Arg::Float(f32::from_bits(self.pop()?))
            } else if flags & FLAG_INT64 != 0 {
                Arg::Int64(self.pop_u64()? as i64)
            } else {
                Arg::Int32(self.pop()? as i32)
            };
            args.push(arg);
        }
        Ok((format, args))
    }

    fn render(format: &str, args: &[Arg]) -> String {
        let mut out = String::with_capacity(format.len());
        let mut args = args.iter();
        let mut chars = format.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' {
                while matches!(chars.peek(), Some('l') | Some('.') | Some('0'..='9')) {
                    chars.next();
                }
                match chars.next() {
                    Some('%') => out.push('%'),
                    Some(_) => {
                        if let Some(arg) = args.next() {
                            out.push_str(&arg.to_string());
                        }
                    }
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn host_print(&mut self) -> Result<(), Fault> {
        let (format, args) = self.pop_args(true)?;
        let rendered = Self::render(&format, &args);
        print!("{rendered}");
        std::io::stdout().flush().ok();
        Ok(())
    }

    fn host_str(&mut self) -> Result<(), Fault> {
        let (format, args) = self.pop_args(true)?;
        let rendered = Self::render(&format, &args);
        let addr = self.heap.alloc_string(rendered.as_bytes())?;
        self.push(addr)
    }

    fn host_input(&mut self) -> Result<(), Fault> {
        let mut line = String::new();
        let read = std::io::stdin().read_line(&mut line);
        if read.is_err() {
            line.clear();
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let addr = self.heap.alloc_string(trimmed.as_bytes())?;
        self.push(addr)
    }
}
