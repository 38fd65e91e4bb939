//! # Instruction Field Layouts and Encoding Helpers
//!
//! Every ISA variant describes its instruction formats as a set of bit
//! fields. This module holds the field type, the per-format layouts, the
//! two's-complement helpers shared by branch offsets and immediates, and the
//! encoder used to build instruction words.
//!
//! ## Example layout (16-bit words)
//!
//! ```text
//! R-type: [opcode:4][reg1:4][reg2:4][----:4]
//! I-type: [opcode:4][reg:4][imm:8]
//! J-type: [opcode:4][target:12]
//! ```

use crate::config::Arch;
use crate::error::SpecError;
use crate::instruction::Instruction;

// ============================================================================
// Bit Fields
// ============================================================================

/// A contiguous run of bits inside an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Position of the least significant bit
    pub shift: u8,
    /// Width in bits
    pub bits: u8,
}

impl Field {
    pub const fn new(shift: u8, bits: u8) -> Self {
        Self { shift, bits }
    }

    /// All ones for `bits` (unshifted)
    #[inline]
    pub const fn mask(&self) -> u32 {
        width_mask(self.bits)
    }

    /// First bit position above the field
    #[inline]
    pub const fn end(&self) -> u32 {
        self.shift as u32 + self.bits as u32
    }

    /// Largest value the field can hold
    #[inline]
    pub const fn max_value(&self) -> u32 {
        self.mask()
    }

    /// Read the field out of `word` as an unsigned value
    #[inline]
    pub const fn extract(&self, word: u32) -> u32 {
        if self.bits == 0 {
            return 0;
        }
        (word >> self.shift) & self.mask()
    }

    /// Read the field and sign extend it
    #[inline]
    pub const fn extract_signed(&self, word: u32) -> i32 {
        sign_extend(self.extract(word), self.bits)
    }

    /// Replace the field inside `word` with `value` (extra high bits are dropped)
    #[inline]
    pub const fn insert(&self, word: u32, value: u32) -> u32 {
        if self.bits == 0 {
            return word;
        }
        let mask = self.mask() << self.shift;
        (word & !mask) | ((value & self.mask()) << self.shift)
    }

    /// Whether `value` fits in the field without truncation
    #[inline]
    pub const fn fits(&self, value: u32) -> bool {
        value <= self.max_value()
    }

    /// Mask of the field in word position
    #[inline]
    pub const fn word_mask(&self) -> u32 {
        if self.bits == 0 {
            return 0;
        }
        self.mask() << self.shift
    }

    pub const fn overlaps(&self, other: &Field) -> bool {
        self.word_mask() & other.word_mask() != 0
    }
}

/// All ones for the low `bits` bits (`bits` is clamped to 32)
#[inline]
pub const fn width_mask(bits: u8) -> u32 {
    if bits == 0 {
        0
    } else if bits >= 32 {
        u32::MAX
    } else {
        u32::MAX >> (32 - bits as u32)
    }
}

/// Two's-complement reinterpretation of a `bits`-wide field.
///
/// Values above `2^(bits-1) - 1` become `value - 2^bits`; everything else is
/// returned unchanged.
#[inline]
pub const fn sign_extend(value: u32, bits: u8) -> i32 {
    if bits == 0 {
        return 0;
    }
    let value = value & width_mask(bits);
    let max_positive = (width_mask(bits) >> 1) as i64;
    if value as i64 > max_positive {
        (value as i64 - (1i64 << bits)) as i32
    } else {
        value as i32
    }
}

/// Raw field bits for a signed value (inverse of [`sign_extend`] for in-range values)
#[inline]
pub const fn to_field_bits(value: i32, bits: u8) -> u32 {
    (value as u32) & width_mask(bits)
}

// ============================================================================
// Format Layouts
// ============================================================================

/// Register-register layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RLayout {
    pub reg1: Field,
    pub reg2: Field,
    /// Secondary dispatch key, present only on ISAs that share one opcode
    /// between several register-register operations
    pub funct: Option<Field>,
}

/// Register-immediate layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ILayout {
    pub reg: Field,
    pub imm: Field,
}

/// Jump-target layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JLayout {
    pub target: Field,
}

impl RLayout {
    pub fn fields(&self) -> Vec<(&'static str, Field)> {
        let mut fields = vec![("reg1", self.reg1), ("reg2", self.reg2)];
        if let Some(funct) = self.funct {
            fields.push(("funct", funct));
        }
        fields
    }
}

impl ILayout {
    pub fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("reg", self.reg), ("imm", self.imm)]
    }
}

impl JLayout {
    pub fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("target", self.target)]
    }
}

// ============================================================================
// Encoding
// ============================================================================

fn put(word: u32, name: &'static str, field: Field, value: u32) -> Result<u32, SpecError> {
    if !field.fits(value) {
        return Err(SpecError::FieldOverflow {
            field: name,
            value,
            bits: field.bits,
        });
    }
    Ok(field.insert(word, value))
}

/// Encode a decoded instruction back into a word for `arch`.
///
/// Register-register instructions carrying a function code on an ISA with
/// no funct field, and jump instructions on an ISA without a J layout, are
/// rejected as unsupported formats.
pub fn encode(arch: &Arch, inst: &Instruction) -> Result<u32, SpecError> {
    let word = put(0, "opcode", arch.opcode, inst.opcode() as u32)?;

    match *inst {
        Instruction::R {
            reg1, reg2, funct, ..
        } => {
            let layout = &arch.r_layout;
            let mut word = put(word, "reg1", layout.reg1, reg1 as u32)?;
            word = put(word, "reg2", layout.reg2, reg2 as u32)?;
            match (layout.funct, funct) {
                (Some(field), Some(funct)) => put(word, "funct", field, funct as u32),
                (Some(_), None) | (None, None) => Ok(word),
                (None, Some(_)) => Err(SpecError::UnsupportedFormat {
                    arch: arch.name,
                    format: "R (funct)",
                }),
            }
        }
        Instruction::I { reg, imm, .. } => {
            let layout = &arch.i_layout;
            if imm.bits() != layout.imm.bits {
                return Err(SpecError::FieldOverflow {
                    field: "imm",
                    value: imm.raw(),
                    bits: layout.imm.bits,
                });
            }
            let word = put(word, "reg", layout.reg, reg as u32)?;
            put(word, "imm", layout.imm, imm.raw())
        }
        Instruction::J { target, .. } => {
            let layout = arch.j_layout.ok_or(SpecError::UnsupportedFormat {
                arch: arch.name,
                format: "J",
            })?;
            put(word, "target", layout.target, target)
        }
    }
}
