//! Instruction decoder

use sim256_spec::{Arch, Format, Immediate, Instruction};

/// Decode one instruction word for `arch`.
///
/// The opcode picks the format through the semantics table. Opcodes the
/// table does not bind decode as R-format so that the executor, not the
/// decoder, decides what to do with them.
pub fn decode(arch: &Arch, word: u32) -> Instruction {
    let opcode = arch.opcode.extract(word) as u8;

    match arch.format_of(opcode).unwrap_or(Format::R) {
        Format::R => decode_r_type(arch, opcode, word),
        Format::I => decode_i_type(arch, opcode, word),
        Format::J => match arch.j_layout {
            Some(layout) => Instruction::J {
                opcode,
                target: layout.target.extract(word),
            },
            None => decode_r_type(arch, opcode, word),
        },
    }
}

fn decode_r_type(arch: &Arch, opcode: u8, word: u32) -> Instruction {
    let layout = &arch.r_layout;
    Instruction::R {
        opcode,
        reg1: layout.reg1.extract(word) as u8,
        reg2: layout.reg2.extract(word) as u8,
        funct: layout.funct.map(|field| field.extract(word) as u8),
    }
}

fn decode_i_type(arch: &Arch, opcode: u8, word: u32) -> Instruction {
    let layout = &arch.i_layout;
    Instruction::I {
        opcode,
        reg: layout.reg.extract(word) as u8,
        imm: Immediate::new(layout.imm.extract(word), layout.imm.bits),
    }
}
