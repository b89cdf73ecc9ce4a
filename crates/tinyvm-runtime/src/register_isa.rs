//! Dispatch loop for the register-machine instruction set.

use tinyvm_isa::{ControlOp, Fault, RegisterOp, CONTROL_OPCODE_CEILING};

use crate::decode::Operands;
use crate::interpreter::{ExitStatus, Interpreter};
use crate::numeric;

/// Execute one instruction under the register ISA.
pub fn step(interp: &mut Interpreter) -> Result<Option<ExitStatus>, Fault> {
    let byte = interp.opcode_byte()?;
    if byte < CONTROL_OPCODE_CEILING {
        return step_control(interp, byte);
    }
    let op = RegisterOp::from_u8(byte).ok_or_else(|| {
        tracing::error!(opcode = byte, ip = interp.ip, "unknown register opcode");
        Fault::UnknownOpcode
    })?;
    let shape = op.shape();
    let body = interp.operand_bytes(shape.operand_len())?.to_vec();
    let operands = Operands::decode(shape, &body);
    interp.ip += shape.instruction_len();
    tracing::trace!(mnemonic = op.mnemonic(), "register step");
    execute(interp, op, operands)?;
    Ok(None)
}

fn step_control(interp: &mut Interpreter, byte: u8) -> Result<Option<ExitStatus>, Fault> {
    let op = ControlOp::from_u8(byte).ok_or(Fault::UnknownOpcode)?;
    crate::control::execute(interp, op)
}

fn execute(interp: &mut Interpreter, op: RegisterOp, ops: Operands) -> Result<(), Fault> {
    use RegisterOp::*;
    match op {
        Mov => {
            let v = interp.reg_u32(ops.reg(1))?;
            interp.set_reg_u32(ops.reg(0), v)
        }
        MovD => {
            let v = interp.reg_u64(ops.reg(1))?;
            interp.set_reg_u64(ops.reg(0), v)
        }
        Ldi => interp.set_reg_u32(ops.reg(0), ops.imm32()),
        LdiD => interp.set_reg_u64(ops.reg(0), ops.imm64()),

        Stm => {
            let addr = interp.reg_u32(ops.reg(0))?;
            let v = interp.reg_u32(ops.reg(1))?;
            interp.heap.write(addr, &v.to_le_bytes())
        }
        StmD => {
            let addr = interp.reg_u32(ops.reg(0))?;
            let v = interp.reg_u64(ops.reg(1))?;
            interp.heap.write(addr, &v.to_le_bytes())
        }
        Stmi => {
            let base = interp.reg_u32(ops.reg(0))?;
            let v = interp.reg_u32(ops.reg(1))?;
            interp.heap.write(base + ops.imm32(), &v.to_le_bytes())
        }
        StmiD => {
            let base = interp.reg_u32(ops.reg(0))?;
            let v = interp.reg_u64(ops.reg(1))?;
            interp.heap.write(base + ops.imm32(), &v.to_le_bytes())
        }
        Ldm => {
            let addr = interp.reg_u32(ops.reg(1))?;
            let bytes = interp.heap.read(addr, 4)?;
            interp.set_reg_u32(ops.reg(0), u32::from_le_bytes(bytes.try_into().unwrap()))
        }
        LdmD => {
            let addr = interp.reg_u32(ops.reg(1))?;
            let bytes = interp.heap.read(addr, 8)?;
            interp.set_reg_u64(ops.reg(0), u64::from_le_bytes(bytes.try_into().unwrap()))
        }
        Ldmi => {
            let base = interp.reg_u32(ops.reg(1))?;
            let bytes = interp.heap.read(base + ops.imm32(), 4)?;
            interp.set_reg_u32(ops.reg(0), u32::from_le_bytes(bytes.try_into().unwrap()))
        }
        LdmiD => {
            let base = interp.reg_u32(ops.reg(1))?;
            let bytes = interp.heap.read(base + ops.imm32(), 8)?;
            interp.set_reg_u64(ops.reg(0), u64::from_le_bytes(bytes.try_into().unwrap()))
        }

        Ldl => {
            let word = interp.local_word(ops.imm32());
            interp.set_reg_u32(ops.reg(0), interp.stack[word])
        }
        LdlD => {
            let word = interp.local_word(ops.imm32());
            let v = (interp.stack[word] as u64) | ((interp.stack[word + 1] as u64) << 32);
            interp.set_reg_u64(ops.reg(0), v)
        }
        Stl => {
            let word = interp.local_word(ops.imm32());
            let v = interp.reg_u32(ops.reg(0))?;
            interp.stack[word] = v;
            Ok(())
        }
        StlD => {
            let word = interp.local_word(ops.imm32());
            let v = interp.reg_u64(ops.reg(0))?;
            interp.stack[word] = v as u32;
            interp.stack[word + 1] = (v >> 32) as u32;
            Ok(())
        }
        Lda => {
            let word = interp.arg_word(ops.imm32());
            interp.set_reg_u32(ops.reg(0), interp.stack[word])
        }
        LdaD => {
            let word = interp.arg_word(ops.imm32());
            let v = (interp.stack[word] as u64) | ((interp.stack[word + 1] as u64) << 32);
            interp.set_reg_u64(ops.reg(0), v)
        }
        Sta => {
            let word = interp.arg_word(ops.imm32());
            let v = interp.reg_u32(ops.reg(0))?;
            interp.stack[word] = v;
            Ok(())
        }
        StaD => {
            let word = interp.arg_word(ops.imm32());
            let v = interp.reg_u64(ops.reg(0))?;
            interp.stack[word] = v as u32;
            interp.stack[word + 1] = (v >> 32) as u32;
            Ok(())
        }

        Movs | Push => {
            let v = interp.reg_u32(ops.reg(0))?;
            interp.push(v)
        }
        MovsD | PushD => {
            let v = interp.reg_u64(ops.reg(0))?;
            interp.push_u64(v)
        }
        Pop => {
            let v = interp.pop()?;
            interp.set_reg_u32(ops.reg(0), v)
        }
        PopD => {
            let v = interp.pop_u64()?;
            interp.set_reg_u64(ops.reg(0), v)
        }

        Add => bin_i32(interp, ops, i32::wrapping_add),
        Sub => bin_i32(interp, ops, i32::wrapping_sub),
        Mul => bin_i32(interp, ops, i32::wrapping_mul),
        Div => div_i32(interp, ops),
        AddD => bin_i64(interp, ops, i64::wrapping_add),
        SubD => bin_i64(interp, ops, i64::wrapping_sub),
        MulD => bin_i64(interp, ops, i64::wrapping_mul),
        DivD => div_i64(interp, ops),
        AddF => bin_f32(interp, ops, |a, b| a + b),
        SubF => bin_f32(interp, ops, |a, b| a - b),
        MulF => bin_f32(interp, ops, |a, b| a * b),
        DivF => bin_f32(interp, ops, |a, b| a / b),
        AddF64 => bin_f64(interp, ops, |a, b| a + b),
        SubF64 => bin_f64(interp, ops, |a, b| a - b),
        MulF64 => bin_f64(interp, ops, |a, b| a * b),
        DivF64 => bin_f64(interp, ops, |a, b| a / b),

        Addi => bini_i32(interp, ops, i32::wrapping_add),
        Subi => bini_i32(interp, ops, i32::wrapping_sub),
        Muli => bini_i32(interp, ops, i32::wrapping_mul),
        Divi => divi_i32(interp, ops),
        AddiD => bini_i64(interp, ops, i64::wrapping_add),
        SubiD => bini_i64(interp, ops, i64::wrapping_sub),
        MuliD => bini_i64(interp, ops, i64::wrapping_mul),
        DiviD => divi_i64(interp, ops),
        AddiF => bini_f32(interp, ops, |a, b| a + b),
        SubiF => bini_f32(interp, ops, |a, b| a - b),
        MuliF => bini_f32(interp, ops, |a, b| a * b),
        DiviF => bini_f32(interp, ops, |a, b| a / b),
        AddiF64 => bini_f64(interp, ops, |a, b| a + b),
        SubiF64 => bini_f64(interp, ops, |a, b| a - b),
        MuliF64 => bini_f64(interp, ops, |a, b| a * b),
        DiviF64 => bini_f64(interp, ops, |a, b| a / b),

        Inv => {
            let v = interp.reg_u32(ops.reg(1))? as i32;
            interp.set_reg_u32(ops.reg(0), (!v) as u32)
        }
        InvD => {
            let v = interp.reg_u64(ops.reg(1))? as i64;
            interp.set_reg_u64(ops.reg(0), (!v) as u64)
        }
        Neg => {
            let v = interp.reg_u32(ops.reg(1))? as i32;
            interp.set_reg_u32(ops.reg(0), v.wrapping_neg() as u32)
        }
        NegD => {
            let v = interp.reg_u64(ops.reg(1))? as i64;
            interp.set_reg_u64(ops.reg(0), v.wrapping_neg() as u64)
        }
        NegF => {
            let v = interp.reg_f32(ops.reg(1))?;
            interp.set_reg_f32(ops.reg(0), -v)
        }
        NegF64 => {
            let v = interp.reg_f64(ops.reg(1))?;
            interp.set_reg_f64(ops.reg(0), -v)
        }

        Bor => bin_i32(interp, ops, |a, b| a | b),
        Bxor => bin_i32(interp, ops, |a, b| a ^ b),
        Band => bin_i32(interp, ops, |a, b| a & b),
        BorD => bin_i64(interp, ops, |a, b| a | b),
        BxorD => bin_i64(interp, ops, |a, b| a ^ b),
        BandD => bin_i64(interp, ops, |a, b| a & b),
        Bori => bini_i32(interp, ops, |a, b| a | b),
        Bxori => bini_i32(interp, ops, |a, b| a ^ b),
        Bandi => bini_i32(interp, ops, |a, b| a & b),
        BoriD => bini_i64(interp, ops, |a, b| a | b),
        BxoriD => bini_i64(interp, ops, |a, b| a ^ b),
        BandiD => bini_i64(interp, ops, |a, b| a & b),

        Or => {
            let a = interp.reg_u32(ops.reg(0))?;
            let b = interp.reg_u32(ops.reg(1))?;
            interp.set_cpr((a != 0) || (b != 0));
            Ok(())
        }
        And => {
            let a = interp.reg_u32(ops.reg(0))?;
            let b = interp.reg_u32(ops.reg(1))?;
            interp.set_cpr((a != 0) && (b != 0));
            Ok(())
        }
        Ori => {
            let a = interp.reg_u32(ops.reg(0))?;
            interp.set_cpr((a != 0) || (ops.imm32() != 0));
            Ok(())
        }
        Andi => {
            let a = interp.reg_u32(ops.reg(0))?;
            interp.set_cpr((a != 0) && (ops.imm32() != 0));
            Ok(())
        }

        Cpz => {
            let v = interp.reg_u32(ops.reg(0))?;
            interp.set_cpr(v == 0);
            Ok(())
        }
        CpzD => {
            let v = interp.reg_u64(ops.reg(0))?;
            interp.set_cpr(v == 0);
            Ok(())
        }
        Cpi => {
            let v = interp.reg_u32(ops.reg(0))? as i32;
            interp.set_cpr(v == ops.imm32() as i32);
            Ok(())
        }
        CpiD => {
            let v = interp.reg_u64(ops.reg(0))? as i64;
            interp.set_cpr(v == ops.imm64() as i64);
            Ok(())
        }
        Cpeq => cmp_i32(interp, ops, |a, b| a == b),
        Cpnq => cmp_i32(interp, ops, |a, b| a != b),
        Cpgt => cmp_i32(interp, ops, |a, b| a > b),
        Cplt => cmp_i32(interp, ops, |a, b| a < b),
        Cpgq => cmp_i32(interp, ops, |a, b| a >= b),
        Cplq => cmp_i32(interp, ops, |a, b| a <= b),
        CpeqD => cmp_i64(interp, ops, |a, b| a == b),
        CpnqD => cmp_i64(interp, ops, |a, b| a != b),
        CpgtD => cmp_i64(interp, ops, |a, b| a > b),
        CpltD => cmp_i64(interp, ops, |a, b| a < b),
        CpgqD => cmp_i64(interp, ops, |a, b| a >= b),
        CplqD => cmp_i64(interp, ops, |a, b| a <= b),
        CpeqF => cmp_f32(interp, ops, |a, b| a == b),
        CpnqF => cmp_f32(interp, ops, |a, b| a != b),
        CpgtF => cmp_f32(interp, ops, |a, b| a > b),
        CpltF => cmp_f32(interp, ops, |a, b| a < b),
        CpgqF => cmp_f32(interp, ops, |a, b| a >= b),
        CplqF => cmp_f32(interp, ops, |a, b| a <= b),
        CpeqF64 => cmp_f64(interp, ops, |a, b| a == b),
        CpnqF64 => cmp_f64(interp, ops, |a, b| a != b),
        CpgtF64 => cmp_f64(interp, ops, |a, b| a > b),
        CpltF64 => cmp_f64(interp, ops, |a, b| a < b),
        CpgqF64 => cmp_f64(interp, ops, |a, b| a >= b),
        CplqF64 => cmp_f64(interp, ops, |a, b| a <= b),
        Cpstr => {
            let a = interp.reg_u32(ops.reg(0))?;
            let b = interp.reg_u32(ops.reg(1))?;
            let eq = interp.heap_str_eq(a, b)?;
            interp.set_cpr(eq);
            Ok(())
        }
        Cpchr => {
            let a = interp.reg_u32(ops.reg(0))?;
            let b = interp.reg_u32(ops.reg(1))?;
            let ca = interp.heap.read(a, 1)?[0];
            let cb = interp.heap.read(b, 1)?[0];
            interp.set_cpr(ca == cb);
            Ok(())
        }

        Brz => {
            let take = interp.cpr() == 0;
            branch_if(interp, ops.imm32(), take)
        }
        Brnz => {
            let take = interp.cpr() != 0;
            branch_if(interp, ops.imm32(), take)
        }
        Briz => {
            let target = interp.reg_u32(ops.reg(0))?;
            let take = interp.cpr() == 0;
            branch_if(interp, target, take)
        }
        Brinz => {
            let target = interp.reg_u32(ops.reg(0))?;
            let take = interp.cpr() != 0;
            branch_if(interp, target, take)
        }
        Jmpi => {
            let target = interp.reg_u32(ops.reg(0))?;
            interp.ip = target as usize;
            Ok(())
        }

        Itol => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u32(ra)? as i32 as i64;
            interp.set_reg_u64(rb, v as u64)
        }),
        Itof => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u32(ra)? as i32 as f32;
            interp.set_reg_f32(rb, v)
        }),
        Itod => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u32(ra)? as i32 as f64;
            interp.set_reg_f64(rb, v)
        }),
        Ltoi => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u64(ra)? as i64 as i32;
            interp.set_reg_u32(rb, v as u32)
        }),
        Ltof => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u64(ra)? as i64 as f32;
            interp.set_reg_f32(rb, v)
        }),
        Ltod => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_u64(ra)? as i64 as f64;
            interp.set_reg_f64(rb, v)
        }),
        Ftoi => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f32(ra)? as i32;
            interp.set_reg_u32(rb, v as u32)
        }),
        Ftol => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f32(ra)? as i64;
            interp.set_reg_u64(rb, v as u64)
        }),
        Ftod => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f32(ra)? as f64;
            interp.set_reg_f64(rb, v)
        }),
        Dtoi => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f64(ra)? as i32;
            interp.set_reg_u32(rb, v as u32)
        }),
        Dtol => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f64(ra)? as i64;
            interp.set_reg_u64(rb, v as u64)
        }),
        Dtof => conv(interp, ops, |interp, ra, rb| {
            let v = interp.reg_f64(ra)? as f32;
            interp.set_reg_f32(rb, v)
        }),
        Itos => {
            let v = interp.reg_u32(ops.reg(0))? as i32;
            let addr = interp.heap.alloc_string(numeric::itos(v).as_bytes())?;
            interp.set_reg_u32(ops.reg(1), addr)
        }
        Ltos => {
            let v = interp.reg_u64(ops.reg(0))? as i64;
            let addr = interp.heap.alloc_string(numeric::ltos(v).as_bytes())?;
            interp.set_reg_u32(ops.reg(1), addr)
        }
        Ftos => {
            let v = interp.reg_f32(ops.reg(0))?;
            let text = numeric::ftos(v, ops.byte2());
            let addr = interp.heap.alloc_string(text.as_bytes())?;
            interp.set_reg_u32(ops.reg(1), addr)
        }
        Dtos => {
            let v = interp.reg_f64(ops.reg(0))?;
            let text = numeric::dtos(v, ops.byte2());
            let addr = interp.heap.alloc_string(text.as_bytes())?;
            interp.set_reg_u32(ops.reg(1), addr)
        }
        Stoi => {
            let text = interp.heap_cstring(interp.reg_u32(ops.reg(1))?)?;
            let v = numeric::stoi(&text, ops.imm32() as i32);
            interp.set_reg_u32(ops.reg(0), v as u32)
        }
        Stol => {
            let text = interp.heap_cstring(interp.reg_u32(ops.reg(1))?)?;
            let v = numeric::stol(&text, ops.imm64() as i64);
            interp.set_reg_u64(ops.reg(0), v as u64)
        }
        Stof => {
            let text = interp.heap_cstring(interp.reg_u32(ops.reg(1))?)?;
            let v = numeric::stof(&text, f32::from_bits(ops.imm32()));
            interp.set_reg_f32(ops.reg(0), v)
        }
        Stod => {
            let text = interp.heap_cstring(interp.reg_u32(ops.reg(1))?)?;
            let v = numeric::stod(&text, f64::from_bits(ops.imm64()));
            interp.set_reg_f64(ops.reg(0), v)
        }

        New => {
            let size = interp.reg_u32(ops.reg(1))?;
            let addr = interp.heap.alloc(size)?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
        Newi => {
            let addr = interp.heap.alloc(ops.imm32())?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
        Del => {
            let addr = interp.reg_u32(ops.reg(0))?;
            interp.heap.free(addr)
        }
        Resz => {
            let addr = interp.reg_u32(ops.reg(0))?;
            let size = interp.reg_u32(ops.reg(1))?;
            let new_addr = interp.heap.realloc(addr, size)?;
            interp.set_reg_u32(ops.reg(0), new_addr)
        }
        Reszi => {
            let addr = interp.reg_u32(ops.reg(0))?;
            let new_addr = interp.heap.realloc(addr, ops.imm32())?;
            interp.set_reg_u32(ops.reg(0), new_addr)
        }
        Size => {
            let addr = interp.reg_u32(ops.reg(1))?;
            let size = interp.heap.size_of(addr)?;
            interp.set_reg_u32(ops.reg(0), size)
        }
        Str => {
            let text = interp.program_cstring(ops.imm32())?;
            let addr = interp.heap.alloc_string(&text)?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
        Strcpy => {
            let src = interp.reg_u32(ops.reg(1))?;
            let addr = interp.heap.alloc_substring(src, ops.imm32())?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
        Strcat => {
            let src = interp.reg_u32(ops.reg(1))?;
            let literal = interp.program_cstring(ops.imm32())?;
            let tail = interp.heap.alloc_string(&literal)?;
            let addr = interp.heap.alloc_combined(src, tail)?;
            interp.heap.free(tail)?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
        Strcmb => {
            let a = interp.reg_u32(ops.reg(1))?;
            let b = interp.reg_u32(ops.reg(2))?;
            let addr = interp.heap.alloc_combined(a, b)?;
            interp.set_reg_u32(ops.reg(0), addr)
        }
    }
}

fn branch_if(interp: &mut Interpreter, target: u32, take: bool) -> Result<(), Fault> {
    if take {
        interp.ip = target as usize;
    }
    Ok(())
}

fn bin_i32(interp: &mut Interpreter, ops: Operands, f: impl Fn(i32, i32) -> i32) -> Result<(), Fault> {
    let a = interp.reg_u32(ops.reg(1))? as i32;
    let b = interp.reg_u32(ops.reg(2))? as i32;
    interp.set_reg_u32(ops.reg(0), f(a, b) as u32)
}

fn bini_i32(interp: &mut Interpreter, ops: Operands, f: impl Fn(i32, i32) -> i32) -> Result<(), Fault> {
    let a = interp.reg_u32(ops.reg(1))? as i32;
    interp.set_reg_u32(ops.reg(0), f(a, ops.imm32() as i32) as u32)
}

fn div_i32(interp: &mut Interpreter, ops: Operands) -> Result<(), Fault> {
    let a = interp.reg_u32(ops.reg(1))? as i32;
    let b = interp.reg_u32(ops.reg(2))? as i32;
    let v = numeric::checked_div_i32(a, b).ok_or(Fault::DivideByZero)?;
    interp.set_reg_u32(ops.reg(0), v as u32)
}

fn divi_i32(interp: &mut Interpreter, ops: Operands) -> Result<(), Fault> {
    let a = interp.reg_u32(ops.reg(1))? as i32;
    let v = numeric::checked_div_i32(a, ops.imm32() as i32).ok_or(Fault::DivideByZero)?;
    interp.set_reg_u32(ops.reg(0), v as u32)
}

fn bin_i64(interp: &mut Interpreter, ops: Operands, f: impl Fn(i64, i64) -> i64) -> Result<(), Fault> {
    let a = interp.reg_u64(ops.reg(1))? as i64;
    let b = interp.reg_u64(ops.reg(2))? as i64;
    interp.set_reg_u64(ops.reg(0), f(a, b) as u64)
}

fn bini_i64(interp: &mut Interpreter, ops: Operands, f: impl Fn(i64, i64) -> i64) -> Result<(), Fault> {
    let a = interp.reg_u64(ops.reg(1))? as i64;
    interp.set_reg_u64(ops.reg(0), f(a, ops.imm64() as i64) as u64)
}

fn div_i64(interp: &mut Interpreter, ops: Operands) -> Result<(), Fault> {
    let a = interp.reg_u64(ops.reg(1))? as i64;
    let b = interp.reg_u64(ops.reg(2))? as i64;
    let v = numeric::checked_div_i64(a, b).ok_or(Fault::DivideByZero)?;
    interp.set_reg_u64(ops.reg(0), v as u64)
}

fn divi_i64(interp: &mut Interpreter, ops: Operands) -> Result<(), Fault> {
    let a = interp.reg_u64(ops.reg(1))? as i64;
    let v = numeric::checked_div_i64(a, ops.imm64() as i64).ok_or(Fault::DivideByZero)?;
    interp.set_reg_u64(ops.reg(0), v as u64)
}

fn bin_f32(interp: &mut Interpreter, ops: Operands, f: impl Fn(f32, f32) -> f32) -> Result<(), Fault> {
    let a = interp.reg_f32(ops.reg(1))?;
    let b = interp.reg_f32(ops.reg(2))?;
    interp.set_reg_f32(ops.reg(0), f(a, b))
}

fn bini_f32(interp: &mut Interpreter, ops: Operands, f: impl Fn(f32, f32) -> f32) -> Result<(), Fault> {
    let a = interp.reg_f32(ops.reg(1))?;
    interp.set_reg_f32(ops.reg(0), f(a, f32::from_bits(ops.imm32())))
}

fn bin_f64(interp: &mut Interpreter, ops: Operands, f: impl Fn(f64, f64) -> f64) -> Result<(), Fault> {
    let a = interp.reg_f64(ops.reg(1))?;
    let b = interp.reg_f64(ops.reg(2))?;
    interp.set_reg_f64(ops.reg(0), f(a, b))
}

fn bini_f64(interp: &mut Interpreter, ops: Operands, f: impl Fn(f64, f64) -> f64) -> Result<(), Fault> {
    let a = interp.reg_f64(ops.reg(1))?;
    interp.set_reg_f64(ops.reg(0), f(a, f64::from_bits(ops.imm64())))
}

fn cmp_i32(interp: &mut Interpreter, ops: Operands, f: impl Fn(i32, i32) -> bool) -> Result<(), Fault> {
    let a = interp.reg_u32(ops.reg(0))? as i32;
    let b = interp.reg_u32(ops.reg(1))? as i32;
    interp.set_cpr(f(a, b));
    Ok(())
}

fn cmp_i64(interp: &mut Interpreter, ops: Operands, f: impl Fn(i64, i64) -> bool) -> Result<(), Fault> {
    let a = interp.reg_u64(ops.reg(0))? as i64;
    let b = interp.reg_u64(ops.reg(1))? as i64;
    interp.set_cpr(f(a, b));
    Ok(())
}

fn cmp_f32(interp: &mut Interpreter, ops: Operands, f: impl Fn(f32, f32) -> bool) -> Result<(), Fault> {
    let a = interp.reg_f32(ops.reg(0))?;
    let b = interp.reg_f32(ops.reg(1))?;
    interp.set_cpr(f(a, b));
    Ok(())
}

fn cmp_f64(interp: &mut Interpreter, ops: Operands, f: impl Fn(f64, f64) -> bool) -> Result<(), Fault> {
    let a = interp.reg_f64(ops.reg(0))?;
    let b = interp.reg_f64(ops.reg(1))?;
    interp.set_cpr(f(a, b));
    Ok(())
}

fn conv(
    interp: &mut Interpreter,
    ops: Operands,
    f: impl FnOnce(&mut Interpreter, tinyvm_isa::RegId, tinyvm_isa::RegId) -> Result<(), Fault>,
) -> Result<(), Fault> {
    f(interp, ops.reg(0), ops.reg(1))
}
