//! Byte-at-a-time operand decoding.
//!
//! Fields are not naturally aligned, so every multi-byte operand is
//! assembled from individual bytes rather than read with a native
//! unaligned load. A bitmask/overlay decoder would need to produce the
//! same values; this is the byte-assembly path the design notes call
//! for when the host language has no unaligned-load primitive it wants
//! to rely on.

use tinyvm_isa::{RegId, Shape};

/// Operand bytes decoded according to an opcode's [`Shape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Operands {
    regs: [u8; 3],
    imm: u64,
}

impl Operands {
    /// Decode the operand bytes that follow an opcode byte at `body[0..]`.
    /// `body` must contain at least `shape.operand_len()` bytes.
    pub fn decode(shape: Shape, body: &[u8]) -> Self {
        let mut regs = [0u8; 3];
        let mut imm: u64 = 0;
        match shape {
            Shape::None => {}
            Shape::Reg => regs[0] = body[0],
            Shape::Imm8 => imm = body[0] as u64,
            Shape::Reg2 => {
                regs[0] = body[0];
                regs[1] = body[1];
            }
            Shape::RegU8 => {
                regs[0] = body[0];
                imm = body[1] as u64;
            }
            Shape::U8Reg => {
                imm = body[0] as u64;
                regs[0] = body[1];
            }
            Shape::Reg3 => {
                regs[0] = body[0];
                regs[1] = body[1];
                regs[2] = body[2];
            }
            Shape::Reg2U8 => {
                regs[0] = body[0];
                regs[1] = body[1];
                regs[2] = body[2];
            }
            Shape::RegImm32 => {
                regs[0] = body[0];
                imm = read_u32(&body[1..5]) as u64;
            }
            Shape::RegImm64 => {
                regs[0] = body[0];
                imm = read_u64(&body[1..9]);
            }
            Shape::Reg2Imm32 => {
                regs[0] = body[0];
                regs[1] = body[1];
                imm = read_u32(&body[2..6]) as u64;
            }
            Shape::Reg2Imm64 => {
                regs[0] = body[0];
                regs[1] = body[1];
                imm = read_u64(&body[2..10]);
            }
            Shape::Imm32 => imm = read_u32(&body[0..4]) as u64,
            Shape::Imm64 => imm = read_u64(&body[0..8]),
        }
        Self { regs, imm }
    }

    /// The `n`th register operand (0-indexed).
    pub fn reg(&self, n: usize) -> RegId {
        RegId::new(self.regs[n])
    }

    /// The single byte operand (for `Reg2U8`'s precision byte).
    pub fn byte2(&self) -> u8 {
        self.regs[2]
    }

    /// The immediate operand truncated to 8 bits.
    pub fn imm8(&self) -> u8 {
        self.imm as u8
    }

    /// The immediate operand truncated to 32 bits.
    pub fn imm32(&self) -> u32 {
        self.imm as u32
    }

    /// The full 64-bit immediate operand.
    pub fn imm64(&self) -> u64 {
        self.imm
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().unwrap())
}

fn read_u64(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes.try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reg_imm32() {
        let body = [5u8, 42, 0, 0, 0];
        let ops = Operands::decode(Shape::RegImm32, &body);
        assert_eq!(ops.reg(0), RegId::new(5));
        assert_eq!(ops.imm32(), 42);
    }

    #[test]
    fn decodes_reg2_imm64() {
        let mut body = [0u8; 10];
        body[0] = 1;
        body[1] = 2;
        body[2..10].copy_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        let ops = Operands::decode(Shape::Reg2Imm64, &body);
        assert_eq!(ops.reg(0), RegId::new(1));
        assert_eq!(ops.reg(1), RegId::new(2));
        assert_eq!(ops.imm64(), 0x0102_0304_0506_0708);
    }
}
