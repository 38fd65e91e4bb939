//! # Operations and Opcode Tables
//!
//! ISA variants do not share opcode numbers, so the engine never matches on
//! raw opcodes. Each [`Arch`](crate::Arch) carries a table of [`OpEntry`]
//! rows binding an opcode (and, for register-register operations on some
//! ISAs, a function code) to one of the architecture-independent
//! [`Operation`]s defined here.
//!
//! ## Operation families
//! - Arithmetic: ADD, SUB, ADDI, SETI
//! - Move: MOV
//! - Random: RAND (bitmask), RAND (bounded)
//! - Memory: LOAD, STORE (memory-mapped I/O below the I/O threshold)
//! - Compare: CEQ, CGT (result lands in the comparison register)
//! - Branch: BEQ, BNE, BGT (against the comparison register)
//! - Jump: J, JAL, JR

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// Register-register
    R,
    /// Register-immediate
    I,
    /// Jump target
    J,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::R => write!(f, "R"),
            Format::I => write!(f, "I"),
            Format::J => write!(f, "J"),
        }
    }
}

/// Architecture-independent instruction semantics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    // ========== Arithmetic ==========
    /// ADD: reg1 = reg1 + reg2
    Add,
    /// SUB: reg1 = reg1 - reg2
    Sub,
    /// ADDI: reg = reg + sign_extend(imm)
    AddImm,
    /// SETI: reg = sign_extend(imm)
    SetImm,

    // ========== Move ==========
    /// MOV: reg1 = reg2
    Move,

    // ========== Random ==========
    /// RAND: reg = random & imm (imm read unsigned)
    RandMask,
    /// RAND: reg = uniform in [0, imm] (imm read unsigned)
    RandRange,

    // ========== Memory ==========
    /// LOAD: reg1 = mem[reg2]
    Load,
    /// STORE: mem[reg2] = reg1
    Store,

    // ========== Compare ==========
    /// CEQ: cmp = (reg1 == cmp) ? 1 : 0
    CompareEq,
    /// CGT: cmp = (reg1 > cmp) ? 1 : 0
    CompareGt,

    // ========== Branch ==========
    /// BEQ: if (reg == cmp) PC += imm
    BranchEq,
    /// BNE: if (reg != cmp) PC += imm
    BranchNe,
    /// BGT: if (reg > cmp) PC += imm
    BranchGt,

    // ========== Jump ==========
    /// J: PC = target
    Jump,
    /// JAL: link = PC; PC = target
    JumpAndLink,
    /// JR: PC = reg1
    JumpRegister,
}

impl Operation {
    /// Format the operation is encoded in
    pub const fn format(&self) -> Format {
        match self {
            Operation::Add
            | Operation::Sub
            | Operation::Move
            | Operation::Load
            | Operation::Store
            | Operation::CompareEq
            | Operation::CompareGt
            | Operation::JumpRegister => Format::R,

            Operation::AddImm
            | Operation::SetImm
            | Operation::RandMask
            | Operation::RandRange
            | Operation::BranchEq
            | Operation::BranchNe
            | Operation::BranchGt => Format::I,

            Operation::Jump | Operation::JumpAndLink => Format::J,
        }
    }

    /// Whether the immediate is read as a signed value
    pub const fn signed_immediate(&self) -> bool {
        matches!(
            self,
            Operation::AddImm
                | Operation::SetImm
                | Operation::BranchEq
                | Operation::BranchNe
                | Operation::BranchGt
        )
    }

    pub const fn is_jump(&self) -> bool {
        matches!(
            self,
            Operation::Jump | Operation::JumpAndLink | Operation::JumpRegister
        )
    }

    pub const fn is_memory(&self) -> bool {
        matches!(self, Operation::Load | Operation::Store)
    }

    /// Compares against the comparison register (compare or branch)
    pub const fn uses_comparison_register(&self) -> bool {
        matches!(
            self,
            Operation::CompareEq
                | Operation::CompareGt
                | Operation::BranchEq
                | Operation::BranchNe
                | Operation::BranchGt
        )
    }
}

/// One row of an ISA's semantics table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpEntry {
    pub opcode: u8,
    /// Function code for operations sharing one register-register opcode
    pub funct: Option<u8>,
    pub op: Operation,
    pub mnemonic: &'static str,
}

impl OpEntry {
    pub const fn new(opcode: u8, op: Operation, mnemonic: &'static str) -> Self {
        Self {
            opcode,
            funct: None,
            op,
            mnemonic,
        }
    }

    pub const fn with_funct(opcode: u8, funct: u8, op: Operation, mnemonic: &'static str) -> Self {
        Self {
            opcode,
            funct: Some(funct),
            op,
            mnemonic,
        }
    }

    #[inline]
    pub const fn format(&self) -> Format {
        self.op.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(Operation::Add.format(), Format::R);
        assert_eq!(Operation::Load.format(), Format::R);
        assert_eq!(Operation::JumpRegister.format(), Format::R);
        assert_eq!(Operation::SetImm.format(), Format::I);
        assert_eq!(Operation::BranchGt.format(), Format::I);
        assert_eq!(Operation::JumpAndLink.format(), Format::J);
    }

    #[test]
    fn test_immediate_signedness() {
        assert!(Operation::SetImm.signed_immediate());
        assert!(Operation::BranchEq.signed_immediate());
        assert!(!Operation::RandMask.signed_immediate());
        assert!(!Operation::RandRange.signed_immediate());
    }

    #[test]
    fn test_classification() {
        assert!(!Operation::BranchNe.is_jump());
        assert!(Operation::JumpRegister.is_jump());
        assert!(Operation::Store.is_memory());
        assert!(Operation::CompareGt.uses_comparison_register());
        assert!(!Operation::Add.uses_comparison_register());
    }

    #[test]
    fn test_entry_constructors() {
        let add = OpEntry::with_funct(0, 0, Operation::Add, "add");
        assert_eq!(add.funct, Some(0));
        assert_eq!(add.format(), Format::R);

        let jal = OpEntry::new(5, Operation::JumpAndLink, "jal");
        assert_eq!(jal.funct, None);
        assert_eq!(jal.format(), Format::J);
    }
}
