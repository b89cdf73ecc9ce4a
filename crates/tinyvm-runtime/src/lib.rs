//! The register and stack interpreters for tinyvm binary images.
//!
//! An [`Interpreter`] owns every piece of run state (registers, stack,
//! heap, loaded program) so a caller never reaches for process-global
//! storage, matching the design note that calls out the reference
//! implementation's top-level state variables for encapsulation.
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod control;
mod decode;
mod hostcall;
mod image;
mod interpreter;
mod numeric;
mod register_isa;
mod stack_isa;

pub use hostcall::HostCallId;
pub use image::Image;
pub use interpreter::{ExitStatus, Interpreter, RetVal, STACK_WORDS};

/// Re-exports convenient for downstream crates.
pub mod prelude {
    pub use crate::{ExitStatus, HostCallId, Image, Interpreter};
    pub use tinyvm_isa::Fault;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyvm_isa::{ControlOp, Header, Mode, RegisterOp, Shape, StackOp};

    fn image_register(program: Vec<u8>, data_start: u32) -> Image {
        Image {
            header: Header {
                mode: Mode::Register,
                heap_initial: 4096,
                heap_max: 4096,
                data_start,
            },
            program,
        }
    }

    fn image_stack(program: Vec<u8>, data_start: u32) -> Image {
        Image {
            header: Header {
                mode: Mode::Stack,
                heap_initial: 4096,
                heap_max: 4096,
                data_start,
            },
            program,
        }
    }

    fn reg_ldi(reg: u8, value: u32) -> Vec<u8> {
        let mut bytes = vec![RegisterOp::Ldi as u8, reg];
        bytes.extend_from_slice(&value.to_le_bytes());
        bytes
    }

    #[test]
    fn register_program_adds_two_literals() {
        // .MODE register; LDI R0,#7; LDI R1,#35; ADD R2,R0,R1; EXIT
        let mut program = Vec::new();
        program.extend(reg_ldi(0, 7));
        program.extend(reg_ldi(1, 35));
        program.push(RegisterOp::Add as u8);
        program.extend_from_slice(&[2, 0, 1]);
        program.push(ControlOp::Exit as u8);
        let len = program.len() as u32;
        let image = image_register(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        let status = interp.run().unwrap();
        assert_eq!(status, ExitStatus::Exit);
        assert_eq!(interp.registers_for_test()[2], 42);
    }

    #[test]
    fn stack_program_adds_two_literals() {
        // .MODE stack; LDI #7; LDI #35; ADD; EXIT
        let mut program = Vec::new();
        program.push(StackOp::Ldi as u8);
        program.extend_from_slice(&7u32.to_le_bytes());
        program.push(StackOp::Ldi as u8);
        program.extend_from_slice(&35u32.to_le_bytes());
        program.push(StackOp::Add as u8);
        program.push(ControlOp::Exit as u8);
        let len = program.len() as u32;
        let image = image_stack(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        let status = interp.run().unwrap();
        assert_eq!(status, ExitStatus::Exit);
        assert_eq!(interp.top_of_stack_for_test(), 42);
    }

    #[test]
    fn unknown_opcode_is_a_fault() {
        let image = image_register(vec![0xff], 1);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run(), Err(tinyvm_isa::Fault::UnknownOpcode));
    }

    #[test]
    fn falling_off_the_program_end_is_a_clean_exit() {
        let image = image_register(Vec::new(), 0);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run(), Ok(ExitStatus::FellOff));
    }

    #[test]
    fn a_deep_call_chain_overflows_the_stack() {
        // A single CALL back to itself, forever.
        let mut program = Vec::new();
        program.push(ControlOp::Call as u8);
        program.extend_from_slice(&0u32.to_le_bytes());
        let len = program.len() as u32;
        let image = image_register(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run(), Err(tinyvm_isa::Fault::StackOverflow));
        assert_eq!(interp.stack_sentinels_for_test(), (0xAC1D, 0xFACE));
    }

    #[test]
    fn shape_table_lengths_match_across_both_isas_for_shared_opcodes() {
        assert_eq!(ControlOp::Exit.shape(), Shape::None);
    }

    #[test]
    fn stm_and_ldm_round_trip_through_the_heap() {
        // NEWI R0,#4; LDI R1,#99; STM R0,R1; LDM R2,R0; EXIT
        let mut program = Vec::new();
        program.push(RegisterOp::Newi as u8);
        program.push(0);
        program.extend_from_slice(&4u32.to_le_bytes());
        program.extend(reg_ldi(1, 99));
        program.push(RegisterOp::Stm as u8);
        program.extend_from_slice(&[0, 1]);
        program.push(RegisterOp::Ldm as u8);
        program.extend_from_slice(&[2, 0]);
        program.push(ControlOp::Exit as u8);
        let len = program.len() as u32;
        let image = image_register(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run().unwrap(), ExitStatus::Exit);
        assert_eq!(interp.registers_for_test()[2], 99);
    }

    #[test]
    fn stl_and_ldl_round_trip_a_local() {
        // LDI R0,#77; STL #0,R0; LDL R1,#0; EXIT
        let mut program = Vec::new();
        program.extend(reg_ldi(0, 77));
        program.push(RegisterOp::Stl as u8);
        program.extend_from_slice(&[0, 0]); // wire order: offset, register
        program.push(RegisterOp::Ldl as u8);
        program.extend_from_slice(&[1, 0]); // wire order: register, offset
        program.push(ControlOp::Exit as u8);
        let len = program.len() as u32;
        let image = image_register(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run().unwrap(), ExitStatus::Exit);
        assert_eq!(interp.registers_for_test()[1], 77);
    }

    #[test]
    fn stack_mode_stl_and_ldl_round_trip_a_local() {
        // LDI #77; STL #0; LDL #0; EXIT
        let mut program = Vec::new();
        program.push(StackOp::Ldi as u8);
        program.extend_from_slice(&77u32.to_le_bytes());
        program.push(StackOp::Stl as u8);
        program.push(0);
        program.push(StackOp::Ldl as u8);
        program.push(0);
        program.push(ControlOp::Exit as u8);
        let len = program.len() as u32;
        let image = image_stack(program, len);
        let mut interp = Interpreter::new(image).unwrap();
        assert_eq!(interp.run().unwrap(), ExitStatus::Exit);
        assert_eq!(interp.top_of_stack_for_test(), 77);
    }
}
