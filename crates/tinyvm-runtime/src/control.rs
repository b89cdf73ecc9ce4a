//! The opcode group shared verbatim between both instruction sets:
//! control flow and host calls.

use tinyvm_isa::{ControlOp, Fault};

use crate::decode::Operands;
use crate::interpreter::{ExitStatus, Interpreter, RetVal};

/// Execute one shared-opcode-space instruction.
pub fn execute(interp: &mut Interpreter, op: ControlOp) -> Result<Option<ExitStatus>, Fault> {
    let shape = op.shape();
    let body = interp.operand_bytes(shape.operand_len())?.to_vec();
    let operands = Operands::decode(shape, &body);
    let next_ip = interp.ip + shape.instruction_len();
    interp.ip = next_ip;

    use ControlOp::*;
    match op {
        Nop => Ok(None),
        Exit => Ok(Some(ExitStatus::Exit)),
        Jmp => {
            interp.ip = operands.imm32() as usize;
            Ok(None)
        }
        Call => {
            interp.call(operands.imm32())?;
            Ok(None)
        }
        Ret => {
            interp.ret(operands.imm8(), None)?;
            Ok(None)
        }
        Ret32 => {
            let v = interp.pop()?;
            interp.ret(operands.imm8(), Some(RetVal::Word(v)))?;
            Ok(None)
        }
        Ret64 => {
            let v = interp.pop_u64()?;
            interp.ret(operands.imm8(), Some(RetVal::DoubleWord(v)))?;
            Ok(None)
        }
        Scall => {
            interp.scall(operands.imm8())?;
            Ok(None)
        }
        Sarg => {
            interp.sarg(operands.imm8())?;
            Ok(None)
        }
    }
}
