//! Decoded instructions
//!
//! A decoded word only carries the fields its format defines. Which
//! operation it performs is resolved later against the architecture's
//! semantics table, so decoding never fails on an unknown opcode.

use crate::encoding::{sign_extend, to_field_bits, width_mask};
use crate::opcode::Format;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immediate field contents, kept raw so that it can be read either way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Immediate {
    raw: u32,
    bits: u8,
}

impl Immediate {
    /// Wrap raw field bits (bits above `bits` are dropped)
    pub const fn new(raw: u32, bits: u8) -> Self {
        Self {
            raw: raw & width_mask(bits),
            bits,
        }
    }

    /// Build from a signed value, truncated to `bits`
    pub const fn from_signed(value: i32, bits: u8) -> Self {
        Self {
            raw: to_field_bits(value, bits),
            bits,
        }
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    #[inline]
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Two's-complement reading
    #[inline]
    pub const fn signed(&self) -> i32 {
        sign_extend(self.raw, self.bits)
    }

    /// Plain unsigned reading
    #[inline]
    pub const fn unsigned(&self) -> u32 {
        self.raw
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed())
    }
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Register-register: `funct` is present only on ISAs with a funct field
    R {
        opcode: u8,
        reg1: u8,
        reg2: u8,
        funct: Option<u8>,
    },

    /// Register-immediate
    I { opcode: u8, reg: u8, imm: Immediate },

    /// Jump target (unsigned, absolute)
    J { opcode: u8, target: u32 },
}

impl Instruction {
    #[inline]
    pub const fn opcode(&self) -> u8 {
        match self {
            Instruction::R { opcode, .. }
            | Instruction::I { opcode, .. }
            | Instruction::J { opcode, .. } => *opcode,
        }
    }

    #[inline]
    pub const fn funct(&self) -> Option<u8> {
        match self {
            Instruction::R { funct, .. } => *funct,
            _ => None,
        }
    }

    pub const fn format(&self) -> Format {
        match self {
            Instruction::R { .. } => Format::R,
            Instruction::I { .. } => Format::I,
            Instruction::J { .. } => Format::J,
        }
    }

    /// Registers named by the encoding, in field order
    pub fn registers(&self) -> Vec<u8> {
        match self {
            Instruction::R { reg1, reg2, .. } => vec![*reg1, *reg2],
            Instruction::I { reg, .. } => vec![*reg],
            Instruction::J { .. } => Vec::new(),
        }
    }
}
