use core::fmt;

/// Selects which instruction set a binary image executes under.
///
/// The mode is read once from the image header and is immutable for the
/// remainder of a run: opcodes `0x09` and above mean different things in
/// each mode, and nothing in the format allows switching mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Mode {
    /// Register machine: 32 general-purpose registers, `R31` doubles as the
    /// condition register.
    Register = 0,
    /// Stack machine: operations act on the top of an operand stack.
    Stack = 1,
}

impl Mode {
    /// Decode the `mode` header field.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Register),
            1 => Some(Self::Stack),
            _ => None,
        }
    }

    /// Encode back into the header field representation.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Stack => write!(f, "stack"),
        }
    }
}

impl core::str::FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Self::Register),
            "stack" => Ok(Self::Stack),
            _ => Err(()),
        }
    }
}
