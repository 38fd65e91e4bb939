//! Instruction formatting to assembly text

use sim256_spec::{Arch, Instruction, Operation};

/// Format a decoded instruction as assembly text for `arch`
pub fn format(arch: &Arch, instr: &Instruction) -> String {
    let Some(entry) = arch.lookup(instr.opcode(), instr.funct()) else {
        return format_unknown(instr);
    };
    let name = entry.mnemonic;

    match (*instr, entry.op) {
        // Compare and jr name a single register; the comparison register is implicit
        (Instruction::R { reg1, .. }, op) if op.uses_comparison_register() || op.is_jump() => {
            format!("{} {}", name, format_reg(reg1))
        }
        (Instruction::R { reg1, reg2, .. }, op) if op.is_memory() => {
            let (data, address) = (format_reg(reg1), format_reg(reg2));
            match op {
                Operation::Store => format!("{} [{}], {}", name, address, data),
                _ => format!("{} {}, [{}]", name, data, address),
            }
        }
        (Instruction::R { reg1, reg2, .. }, _) => {
            format!("{} {}, {}", name, format_reg(reg1), format_reg(reg2))
        }
        (Instruction::I { reg, imm, .. }, op) if op.signed_immediate() => {
            format!("{} {}, {}", name, format_reg(reg), imm.signed())
        }
        (Instruction::I { reg, imm, .. }, _) => {
            format!("{} {}, {:#x}", name, format_reg(reg), imm.unsigned())
        }
        (Instruction::J { target, .. }, _) => format!("{} {:#05x}", name, target),
    }
}

fn format_unknown(instr: &Instruction) -> String {
    match instr.funct() {
        Some(funct) => format!("??? (opcode {:#x}, funct {:#x})", instr.opcode(), funct),
        None => format!("??? (opcode {:#x})", instr.opcode()),
    }
}

/// Format register name
pub fn format_reg(index: u8) -> String {
    format!("r{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    fn fmt_word(arch: &Arch, word: u32) -> String {
        format(arch, &decode(arch, word))
    }

    #[test]
    fn test_format_s20() {
        assert_eq!(fmt_word(&Arch::S20, 0x1005), "seti r0, 5");
        assert_eq!(fmt_word(&Arch::S20, 0x0000), "add r0, r0");
        assert_eq!(fmt_word(&Arch::S20, 0b0000_1000_0000_0110), "cgt r4");
        assert_eq!(fmt_word(&Arch::S20, 0x54FD), "bne r2, -3");
        assert_eq!(fmt_word(&Arch::S20, 0x320F), "rand r1, 0xf");
        // ld r1, [r2] ; ceq r3
        assert_eq!(fmt_word(&Arch::S20, 0b0000_0010_1000_0011), "ld r1, [r2]");
        assert_eq!(fmt_word(&Arch::S20, 0b0000_0110_0000_0101), "ceq r3");
    }

    #[test]
    fn test_format_apple_pi() {
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0x4340), "store [r4], r3");
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0x3340), "load r3, [r4]");
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0x5123), "jal 0x123");
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0x6E00), "jr r14");
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0xA2FF), "seti r2, -1");
    }

    #[test]
    fn test_format_unknown() {
        assert_eq!(fmt_word(&Arch::APPLE_PI, 0xF000), "??? (opcode 0xf)");
        assert_eq!(fmt_word(&Arch::S20, 0x000F), "??? (opcode 0x0, funct 0xf)");
    }
}
