//! Built-in ISA variants
//!
//! Both presets use 16-bit instruction words with a 4-bit opcode in the top
//! nibble.
//!
//! ```text
//! s20 (8-bit):
//!   R-type: [opcode:4][reg1:3][reg2:3][--:2][funct:4]
//!   I-type: [opcode:4][reg:3][-:1][imm:8]
//!
//! applepi (16-bit):
//!   R-type: [opcode:4][reg1:4][reg2:4][----:4]
//!   I-type: [opcode:4][reg:4][imm:8]
//!   J-type: [opcode:4][target:12]
//! ```

use crate::config::Arch;
use crate::encoding::{Field, ILayout, JLayout, RLayout};
use crate::opcode::{OpEntry, Operation};

const S20_OPS: &[OpEntry] = &[
    OpEntry::with_funct(0x0, 0x0, Operation::Add, "add"),
    OpEntry::with_funct(0x0, 0x1, Operation::Sub, "sub"),
    OpEntry::with_funct(0x0, 0x2, Operation::Move, "mov"),
    OpEntry::with_funct(0x0, 0x3, Operation::Load, "ld"),
    OpEntry::with_funct(0x0, 0x4, Operation::Store, "st"),
    OpEntry::with_funct(0x0, 0x5, Operation::CompareEq, "ceq"),
    OpEntry::with_funct(0x0, 0x6, Operation::CompareGt, "cgt"),
    OpEntry::new(0x1, Operation::SetImm, "seti"),
    OpEntry::new(0x2, Operation::AddImm, "addi"),
    OpEntry::new(0x3, Operation::RandMask, "rand"),
    OpEntry::new(0x4, Operation::BranchEq, "beq"),
    OpEntry::new(0x5, Operation::BranchNe, "bne"),
];

const APPLE_PI_OPS: &[OpEntry] = &[
    OpEntry::new(0x0, Operation::Add, "add"),
    OpEntry::new(0x1, Operation::Sub, "sub"),
    OpEntry::new(0x2, Operation::RandRange, "rand"),
    OpEntry::new(0x3, Operation::Load, "load"),
    OpEntry::new(0x4, Operation::Store, "store"),
    OpEntry::new(0x5, Operation::JumpAndLink, "jal"),
    OpEntry::new(0x6, Operation::JumpRegister, "jr"),
    OpEntry::new(0x7, Operation::BranchEq, "beq"),
    OpEntry::new(0x8, Operation::BranchGt, "bgt"),
    OpEntry::new(0x9, Operation::Move, "set"),
    OpEntry::new(0xA, Operation::SetImm, "seti"),
];

impl Arch {
    /// 8-bit teaching CPU: 8 registers, compare results land in r7
    pub const S20: Arch = Arch {
        name: "s20",
        word_bits: 16,
        num_registers: 8,
        register_bits: 8,
        num_buttons: 4,
        matrix_size: 10,
        io_threshold: 0x80,
        comparison_register: 7,
        link_register: None,
        constant_registers: &[],
        opcode: Field::new(12, 4),
        r_layout: RLayout {
            reg1: Field::new(9, 3),
            reg2: Field::new(6, 3),
            funct: Some(Field::new(0, 4)),
        },
        i_layout: ILayout {
            reg: Field::new(9, 3),
            imm: Field::new(0, 8),
        },
        j_layout: None,
        ops: S20_OPS,
    };

    /// 16-bit teaching CPU: r0 = 0, r1 = 1, r15 doubles as link and comparison register
    pub const APPLE_PI: Arch = Arch {
        name: "applepi",
        word_bits: 16,
        num_registers: 16,
        register_bits: 16,
        num_buttons: 4,
        matrix_size: 10,
        io_threshold: 0x100,
        comparison_register: 15,
        link_register: Some(15),
        constant_registers: &[(0, 0), (1, 1)],
        opcode: Field::new(12, 4),
        r_layout: RLayout {
            reg1: Field::new(8, 4),
            reg2: Field::new(4, 4),
            funct: None,
        },
        i_layout: ILayout {
            reg: Field::new(8, 4),
            imm: Field::new(0, 8),
        },
        j_layout: Some(JLayout {
            target: Field::new(0, 12),
        }),
        ops: APPLE_PI_OPS,
    };
}
