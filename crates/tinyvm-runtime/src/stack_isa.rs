//! Dispatch loop for the stack-machine instruction set. Every opcode
//! that the register ISA expresses with named registers instead pops
//! its operands from, and pushes its result to, the top of the operand
//! stack.

use tinyvm_isa::{ControlOp, Fault, StackOp, CONTROL_OPCODE_CEILING};

use crate::decode::Operands;
use crate::interpreter::{ExitStatus, Interpreter};
use crate::numeric;

/// Execute one instruction under the stack ISA.
pub fn step(interp: &mut Interpreter) -> Result<Option<ExitStatus>, Fault> {
    let byte = interp.opcode_byte()?;
    if byte < CONTROL_OPCODE_CEILING {
        let op = ControlOp::from_u8(byte).ok_or(Fault::UnknownOpcode)?;
        return crate::control::execute(interp, op);
    }
    let op = StackOp::from_u8(byte).ok_or_else(|| {
        tracing::error!(opcode = byte, ip = interp.ip, "unknown stack opcode");
        Fault::UnknownOpcode
    })?;
    let shape = op.shape();
    let body = interp.operand_bytes(shape.operand_len())?.to_vec();
    let operands = Operands::decode(shape, &body);
    interp.ip += shape.instruction_len();
    tracing::trace!(mnemonic = op.mnemonic(), "stack step");
    execute(interp, op, operands)?;
    Ok(None)
}

fn execute(interp: &mut Interpreter, op: StackOp, ops: Operands) -> Result<(), Fault> {
    use StackOp::*;
    match op {
        Ldi => interp.push(ops.imm32()),
        LdiD => interp.push_u64(ops.imm64()),

        Stm => {
            let addr = interp.pop()?;
            let v = interp.pop()?;
            interp.heap.write(addr, &v.to_le_bytes())
        }
        StmD => {
            let addr = interp.pop()?;
            let v = interp.pop_u64()?;
            interp.heap.write(addr, &v.to_le_bytes())
        }
        Stmi => {
            let base = interp.pop()?;
            let v = interp.pop()?;
            interp.heap.write(base + ops.imm32(), &v.to_le_bytes())
        }
        StmiD => {
            let base = interp.pop()?;
            let v = interp.pop_u64()?;
            interp.heap.write(base + ops.imm32(), &v.to_le_bytes())
        }
        Ldm => {
            let addr = interp.pop()?;
            let bytes = interp.heap.read(addr, 4)?;
            interp.push(u32::from_le_bytes(bytes.try_into().unwrap()))
        }
        LdmD => {
            let addr = interp.pop()?;
            let bytes = interp.heap.read(addr, 8)?;
            interp.push_u64(u64::from_le_bytes(bytes.try_into().unwrap()))
        }
        Ldmi => {
            let base = interp.pop()?;
            let bytes = interp.heap.read(base + ops.imm32(), 4)?;
            interp.push(u32::from_le_bytes(bytes.try_into().unwrap()))
        }
        LdmiD => {
            let base = interp.pop()?;
            let bytes = interp.heap.read(base + ops.imm32(), 8)?;
            interp.push_u64(u64::from_le_bytes(bytes.try_into().unwrap()))
        }

        Ldl => {
            let word = interp.local_word(ops.imm32());
            interp.push(interp.stack[word])
        }
        LdlD => {
            let word = interp.local_word(ops.imm32());
            let v = (interp.stack[word] as u64) | ((interp.stack[word + 1] as u64) << 32);
            interp.push_u64(v)
        }
        Stl => {
            let word = interp.local_word(ops.imm32());
            let v = interp.pop()?;
            interp.stack[word] = v;
            Ok(())
        }
        StlD => {
            let word = interp.local_word(ops.imm32());
            let v = interp.pop_u64()?;
            interp.stack[word] = v as u32;
            interp.stack[word + 1] = (v >> 32) as u32;
            Ok(())
        }
        Lda => {
            let word = interp.arg_word(ops.imm32());
            interp.push(interp.stack[word])
        }
        LdaD => {
            let word = interp.arg_word(ops.imm32());
            let v = (interp.stack[word] as u64) | ((interp.stack[word + 1] as u64) << 32);
            interp.push_u64(v)
        }
        Sta => {
            let word = interp.arg_word(ops.imm32());
            let v = interp.pop()?;
            interp.stack[word] = v;
            Ok(())
        }
        StaD => {
            let word = interp.arg_word(ops.imm32());
            let v = interp.pop_u64()?;
            interp.stack[word] = v as u32;
            interp.stack[word + 1] = (v >> 32) as u32;
            Ok(())
        }

        Add => bin_i32(interp, i32::wrapping_add),
        Sub => bin_i32(interp, i32::wrapping_sub),
        Mul => bin_i32(interp, i32::wrapping_mul),
        Div => div_i32(interp),
        AddD => bin_i64(interp, i64::wrapping_add),
        SubD => bin_i64(interp, i64::wrapping_sub),
        MulD => bin_i64(interp, i64::wrapping_mul),
        DivD => div_i64(interp),
        AddF => bin_f32(interp, |a, b| a + b),
        SubF => bin_f32(interp, |a, b| a - b),
        MulF => bin_f32(interp, |a, b| a * b),
        DivF => bin_f32(interp, |a, b| a / b),
        AddF64 => bin_f64(interp, |a, b| a + b),
        SubF64 => bin_f64(interp, |a, b| a - b),
        MulF64 => bin_f64(interp, |a, b| a * b),
        DivF64 => bin_f64(interp, |a, b| a / b),

        Inv => {
            let v = interp.pop()? as i32;
            interp.push((!v) as u32)
        }
        InvD => {
            let v = interp.pop_u64()? as i64;
            interp.push_u64((!v) as u64)
        }
        Neg => {
            let v = interp.pop()? as i32;
            interp.push(v.wrapping_neg() as u32)
        }
        NegD => {
            let v = interp.pop_u64()? as i64;
            interp.push_u64(v.wrapping_neg() as u64)
        }
        NegF => {
            let v = f32::from_bits(interp.pop()?);
            interp.push((-v).to_bits())
        }
        NegF64 => {
            let v = f64::from_bits(interp.pop_u64()?);
            interp.push_u64((-v).to_bits())
        }

        Bor => bin_i32(interp, |a, b| a | b),
        Bxor => bin_i32(interp, |a, b| a ^ b),
        Band => bin_i32(interp, |a, b| a & b),
        BorD => bin_i64(interp, |a, b| a | b),
        BxorD => bin_i64(interp, |a, b| a ^ b),
        BandD => bin_i64(interp, |a, b| a & b),

        Or => {
            let b = interp.pop()?;
            let a = interp.pop()?;
            interp.push(((a != 0) || (b != 0)) as u32)
        }
        And => {
            let b = interp.pop()?;
            let a = interp.pop()?;
            interp.push(((a != 0) && (b != 0)) as u32)
        }

        Cpz => {
            let v = interp.pop()?;
            interp.push((v == 0) as u32)
        }
        CpzD => {
            let v = interp.pop_u64()?;
            interp.push((v == 0) as u32)
        }
        Cpeq => cmp_i32(interp, |a, b| a == b),
        Cpnq => cmp_i32(interp, |a, b| a != b),
        Cpgt => cmp_i32(interp, |a, b| a > b),
        Cplt => cmp_i32(interp, |a, b| a < b),
        Cpgq => cmp_i32(interp, |a, b| a >= b),
        Cplq => cmp_i32(interp, |a, b| a <= b),
        CpeqD => cmp_i64(interp, |a, b| a == b),
        CpnqD => cmp_i64(interp, |a, b| a != b),
        CpgtD => cmp_i64(interp, |a, b| a > b),
        CpltD => cmp_i64(interp, |a, b| a < b),
        CpgqD => cmp_i64(interp, |a, b| a >= b),
        CplqD => cmp_i64(interp, |a, b| a <= b),
        CpeqF => cmp_f32(interp, |a, b| a == b),
        CpnqF => cmp_f32(interp, |a, b| a != b),
        CpgtF => cmp_f32(interp, |a, b| a > b),
        CpltF => cmp_f32(interp, |a, b| a < b),
        CpgqF => cmp_f32(interp, |a, b| a >= b),
        CplqF => cmp_f32(interp, |a, b| a <= b),
        CpeqF64 => cmp_f64(interp, |a, b| a == b),
        CpnqF64 => cmp_f64(interp, |a, b| a != b),
        CpgtF64 => cmp_f64(interp, |a, b| a > b),
        CpltF64 => cmp_f64(interp, |a, b| a < b),
        CpgqF64 => cmp_f64(interp, |a, b| a >= b),
        CplqF64 => cmp_f64(interp, |a, b| a <= b),
        Cpstr => {
            let b = interp.pop()?;
            let a = interp.pop()?;
            let eq = interp.heap_str_eq(a, b)?;
            interp.push(eq as u32)
        }
        Cpchr => {
            let b = interp.pop()?;
            let a = interp.pop()?;
            let ca = interp.heap.read(a, 1)?[0];
            let cb = interp.heap.read(b, 1)?[0];
            interp.push((ca == cb) as u32)
        }

        Brz => {
            let predicate = interp.pop()?;
            branch_if(interp, ops.imm32(), predicate == 0)
        }
        Brnz => {
            let predicate = interp.pop()?;
            branch_if(interp, ops.imm32(), predicate != 0)
        }
        Briz => {
            let target = interp.pop()?;
            let predicate = interp.pop()?;
            branch_if(interp, target, predicate == 0)
        }
        Brinz => {
            let target = interp.pop()?;
            let predicate = interp.pop()?;
            branch_if(interp, target, predicate != 0)
        }
        Jmpi => {
            let target = interp.pop()?;
            interp.ip = target as usize;
            Ok(())
        }

        Itol => {
            let v = interp.pop()? as i32 as i64;
            interp.push_u64(v as u64)
        }
        Itof => {
            let v = interp.pop()? as i32 as f32;
            interp.push(v.to_bits())
        }
        Itod => {
            let v = interp.pop()? as i32 as f64;
            interp.push_u64(v.to_bits())
        }
        Ltoi => {
            let v = interp.pop_u64()? as i64 as i32;
            interp.push(v as u32)
        }
        Ltof => {
            let v = interp.pop_u64()? as i64 as f32;
            interp.push(v.to_bits())
        }
        Ltod => {
            let v = interp.pop_u64()? as i64 as f64;
            interp.push_u64(v.to_bits())
        }
        Ftoi => {
            let v = f32::from_bits(interp.pop()?) as i32;
            interp.push(v as u32)
        }
        Ftol => {
            let v = f32::from_bits(interp.pop()?) as i64;
            interp.push_u64(v as u64)
        }
        Ftod => {
            let v = f32::from_bits(interp.pop()?) as f64;
            interp.push_u64(v.to_bits())
        }
        Dtoi => {
            let v = f64::from_bits(interp.pop_u64()?) as i32;
            interp.push(v as u32)
        }
        Dtol => {
            let v = f64::from_bits(interp.pop_u64()?) as i64;
            interp.push_u64(v as u64)
        }
        Dtof => {
            let v = f64::from_bits(interp.pop_u64()?) as f32;
            interp.push(v.to_bits())
        }
        Itos => {
            let v = interp.pop()? as i32;
            let addr = interp.heap.alloc_string(numeric::itos(v).as_bytes())?;
            interp.push(addr)
        }
        Ltos => {
            let v = interp.pop_u64()? as i64;
            let addr = interp.heap.alloc_string(numeric::ltos(v).as_bytes())?;
            interp.push(addr)
        }
        Ftos => {
            let v = f32::from_bits(interp.pop()?);
            let addr = interp.heap.alloc_string(numeric::ftos(v, ops.imm8()).as_bytes())?;
            interp.push(addr)
        }
        Dtos => {
            let v = f64::from_bits(interp.pop_u64()?);
            let addr = interp.heap.alloc_string(numeric::dtos(v, ops.imm8()).as_bytes())?;
            interp.push(addr)
        }
        Stoi => {
            let addr = interp.pop()?;
            let text = interp.heap_cstring(addr)?;
            interp.push(numeric::stoi(&text, ops.imm32() as i32) as u32)
        }
        Stol => {
            let addr = interp.pop()?;
            let text = interp.heap_cstring(addr)?;
            interp.push_u64(numeric::stol(&text, ops.imm64() as i64) as u64)
        }
        Stof => {
            let addr = interp.pop()?;
            let text = interp.heap_cstring(addr)?;
            interp.push(numeric::stof(&text, f32::from_bits(ops.imm32())).to_bits())
        }
        Stod => {
            let addr = interp.pop()?;
            let text = interp.heap_cstring(addr)?;
            interp.push_u64(numeric::stod(&text, f64::from_bits(ops.imm64())).to_bits())
        }

        New => {
            let size = interp.pop()?;
            let addr = interp.heap.alloc(size)?;
            interp.push(addr)
        }
        Del => {
            let addr = interp.pop()?;
            interp.heap.free(addr)
        }
        Resz => {
            let size = interp.pop()?;
            let addr = interp.pop()?;
            let new_addr = interp.heap.realloc(addr, size)?;
            interp.push(new_addr)
        }
        Size => {
            let addr = interp.pop()?;
            let size = interp.heap.size_of(addr)?;
            interp.push(size)
        }
        Str => {
            let text = interp.program_cstring(ops.imm32())?;
            let addr = interp.heap.alloc_string(&text)?;
            interp.push(addr)
        }
        Strcpy => {
            let src = interp.pop()?;
            let addr = interp.heap.alloc_substring(src, ops.imm32())?;
            interp.push(addr)
        }
        Strcat => {
            let src = interp.pop()?;
            let literal = interp.program_cstring(ops.imm32())?;
            let tail = interp.heap.alloc_string(&literal)?;
            let addr = interp.heap.alloc_combined(src, tail)?;
            interp.heap.free(tail)?;
            interp.push(addr)
        }
        Strcmb => {
            let b = interp.pop()?;
            let a = interp.pop()?;
            let addr = interp.heap.alloc_combined(a, b)?;
            interp.push(addr)
        }
    }
}

fn branch_if(interp: &mut Interpreter, target: u32, take: bool) -> Result<(), Fault> {
    if take {
        interp.ip = target as usize;
    }
    Ok(())
}

fn bin_i32(interp: &mut Interpreter, f: impl Fn(i32, i32) -> i32) -> Result<(), Fault> {
    let b = interp.pop()? as i32;
    let a = interp.pop()? as i32;
    interp.push(f(a, b) as u32)
}

fn div_i32(interp: &mut Interpreter) -> Result<(), Fault> {
    let b = interp.pop()? as i32;
    let a = interp.pop()? as i32;
    let v = numeric::checked_div_i32(a, b).ok_or(Fault::DivideByZero)?;
    interp.push(v as u32)
}

fn bin_i64(interp: &mut Interpreter, f: impl Fn(i64, i64) -> i64) -> Result<(), Fault> {
    let b = interp.pop_u64()? as i64;
    let a = interp.pop_u64()? as i64;
    interp.push_u64(f(a, b) as u64)
}

fn div_i64(interp: &mut Interpreter) -> Result<(), Fault> {
    let b = interp.pop_u64()? as i64;
    let a = interp.pop_u64()? as i64;
    let v = numeric::checked_div_i64(a, b).ok_or(Fault::DivideByZero)?;
    interp.push_u64(v as u64)
}

fn bin_f32(interp: &mut Interpreter, f: impl Fn(f32, f32) -> f32) -> Result<(), Fault> {
    let b = f32::from_bits(interp.pop()?);
    let a = f32::from_bits(interp.pop()?);
    interp.push(f(a, b).to_bits())
}

fn bin_f64(interp: &mut Interpreter, f: impl Fn(f64, f64) -> f64) -> Result<(), Fault> {
    let b = f64::from_bits(interp.pop_u64()?);
    let a = f64::from_bits(interp.pop_u64()?);
    interp.push_u64(f(a, b).to_bits())
}

fn cmp_i32(interp: &mut Interpreter, f: impl Fn(i32, i32) -> bool) -> Result<(), Fault> {
    let b = interp.pop()? as i32;
    let a = interp.pop()? as i32;
    interp.push(f(a, b) as u32)
}

fn cmp_i64(interp: &mut Interpreter, f: impl Fn(i64, i64) -> bool) -> Result<(), Fault> {
    let b = interp.pop_u64()? as i64;
    let a = interp.pop_u64()? as i64;
    interp.push(f(a, b) as u32)
}

fn cmp_f32(interp: &mut Interpreter, f: impl Fn(f32, f32) -> bool) -> Result<(), Fault> {
    let b = f32::from_bits(interp.pop()?);
    let a = f32::from_bits(interp.pop()?);
    interp.push(f(a, b) as u32)
}

fn cmp_f64(interp: &mut Interpreter, f: impl Fn(f64, f64) -> bool) -> Result<(), Fault> {
    let b = f64::from_bits(interp.pop_u64()?);
    let a = f64::from_bits(interp.pop_u64()?);
    interp.push(f(a, b) as u32)
}
