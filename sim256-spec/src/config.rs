//! # Architecture Descriptors
//!
//! An [`Arch`] captures everything that distinguishes one ISA variant from
//! another: register file shape, memory-mapped I/O sizes, instruction field
//! layouts, and the semantics table. The engine reads these values instead
//! of hard-coding any of them.

use crate::encoding::{width_mask, Field, ILayout, JLayout, RLayout};
use crate::opcode::{Format, OpEntry};
use std::collections::HashMap;
use std::fmt;

/// Widest supported register (and data-memory address) width
pub const MAX_REGISTER_BITS: u8 = 16;

/// Widest supported instruction word
pub const MAX_WORD_BITS: u8 = 32;

/// ISA variant descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arch {
    /// Short identifier (used on the command line and in snapshots)
    pub name: &'static str,
    /// Instruction word width in bits
    pub word_bits: u8,
    /// Number of registers in the register file
    pub num_registers: usize,
    /// Register width in bits (also the data-memory address width)
    pub register_bits: u8,
    /// Number of binary input buttons
    pub num_buttons: usize,
    /// Width and height of the output display grid
    pub matrix_size: usize,
    /// Addresses below this value are memory-mapped I/O
    pub io_threshold: u32,
    /// Implicit right-hand operand of compare and branch instructions
    pub comparison_register: u8,
    /// Register written by jump-and-link
    pub link_register: Option<u8>,
    /// Read-only registers and the constant each one holds
    pub constant_registers: &'static [(u8, u32)],
    pub opcode: Field,
    pub r_layout: RLayout,
    pub i_layout: ILayout,
    pub j_layout: Option<JLayout>,
    /// Semantics table keyed by opcode (and funct where present)
    pub ops: &'static [OpEntry],
}

impl Arch {
    /// Built-in ISA variants
    pub const PRESETS: &'static [Arch] = &[Arch::S20, Arch::APPLE_PI];

    /// Look up a preset by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<Arch> {
        Self::PRESETS
            .iter()
            .find(|arch| arch.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Mask applied to every register and memory write
    #[inline]
    pub const fn register_mask(&self) -> u32 {
        width_mask(self.register_bits)
    }

    /// Data-memory address width in bits
    #[inline]
    pub const fn addr_bits(&self) -> u8 {
        self.register_bits
    }

    /// Number of data-memory cells (2^W)
    #[inline]
    pub const fn data_memory_len(&self) -> usize {
        1usize << self.register_bits
    }

    /// Number of display cells (M*M)
    #[inline]
    pub const fn matrix_cells(&self) -> usize {
        self.matrix_size * self.matrix_size
    }

    /// Mask applied to words loaded into the instruction store
    #[inline]
    pub const fn word_mask(&self) -> u32 {
        width_mask(self.word_bits)
    }

    /// Value held by a read-only register, if `index` is one
    pub fn constant_register(&self, index: usize) -> Option<u32> {
        self.constant_registers
            .iter()
            .find(|(reg, _)| *reg as usize == index)
            .map(|(_, value)| *value)
    }

    #[inline]
    pub fn is_read_only(&self, index: usize) -> bool {
        self.constant_register(index).is_some()
    }

    /// Format that `opcode` decodes as, if the table binds it
    pub fn format_of(&self, opcode: u8) -> Option<Format> {
        self.ops
            .iter()
            .find(|entry| entry.opcode == opcode)
            .map(OpEntry::format)
    }

    /// Resolve an opcode/funct pair against the semantics table
    pub fn lookup(&self, opcode: u8, funct: Option<u8>) -> Option<&'static OpEntry> {
        let ops: &'static [OpEntry] = self.ops;
        ops.iter()
            .find(|entry| entry.opcode == opcode && (entry.funct.is_none() || entry.funct == funct))
    }

    /// Look up a table entry by mnemonic
    pub fn entry_by_mnemonic(&self, mnemonic: &str) -> Option<&'static OpEntry> {
        let ops: &'static [OpEntry] = self.ops;
        ops.iter()
            .find(|entry| entry.mnemonic.eq_ignore_ascii_case(mnemonic))
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_registers == 0 {
            return Err(ConfigError::NoRegisters);
        }
        if self.num_buttons == 0 || self.matrix_size == 0 {
            return Err(ConfigError::EmptyIo);
        }
        if self.register_bits == 0 || self.register_bits > MAX_REGISTER_BITS {
            return Err(ConfigError::InvalidRegisterBits(self.register_bits));
        }
        if self.word_bits == 0 || self.word_bits > MAX_WORD_BITS {
            return Err(ConfigError::InvalidWordBits(self.word_bits));
        }

        // Every field stays inside the word and fields of one format stay apart
        let mut formats: Vec<(Format, Vec<(&'static str, Field)>)> = vec![
            (Format::R, self.r_layout.fields()),
            (Format::I, self.i_layout.fields()),
        ];
        if let Some(j) = self.j_layout {
            formats.push((Format::J, j.fields()));
        }
        for (format, fields) in &mut formats {
            fields.insert(0, ("opcode", self.opcode));
            for (i, (name, field)) in fields.iter().enumerate() {
                if field.bits == 0 || field.end() > self.word_bits as u32 {
                    return Err(ConfigError::FieldOutsideWord {
                        field: *name,
                        word_bits: self.word_bits,
                    });
                }
                for (other_name, other) in &fields[i + 1..] {
                    if field.overlaps(other) {
                        return Err(ConfigError::OverlappingFields {
                            format: *format,
                            first: *name,
                            second: *other_name,
                        });
                    }
                }
            }
        }

        for field in [self.r_layout.reg1, self.r_layout.reg2, self.i_layout.reg] {
            if (field.max_value() as usize) < self.num_registers - 1 {
                return Err(ConfigError::RegisterFieldTooNarrow {
                    bits: field.bits,
                    registers: self.num_registers,
                });
            }
        }

        let mut special: Vec<u8> = vec![self.comparison_register];
        special.extend(self.link_register);
        special.extend(self.constant_registers.iter().map(|(reg, _)| *reg));
        if let Some(reg) = special
            .into_iter()
            .find(|reg| *reg as usize >= self.num_registers)
        {
            return Err(ConfigError::RegisterOutOfRange(reg));
        }

        let io_min = self.num_buttons.max(self.matrix_cells()) as u64;
        if (self.io_threshold as u64) < io_min
            || self.io_threshold as u64 > self.data_memory_len() as u64
        {
            return Err(ConfigError::InvalidIoThreshold {
                threshold: self.io_threshold,
                min: io_min,
                max: self.data_memory_len() as u64,
            });
        }

        let mut opcode_formats: HashMap<u8, Format> = HashMap::new();
        for (i, entry) in self.ops.iter().enumerate() {
            if !self.opcode.fits(entry.opcode as u32) {
                return Err(ConfigError::OpcodeTooWide(entry.opcode));
            }
            if let Some(previous) = opcode_formats.insert(entry.opcode, entry.format()) {
                if previous != entry.format() {
                    return Err(ConfigError::MixedFormats(entry.opcode));
                }
            }
            if self.ops[..i]
                .iter()
                .any(|other| other.opcode == entry.opcode && other.funct == entry.funct)
            {
                return Err(ConfigError::DuplicateEntry {
                    opcode: entry.opcode,
                    funct: entry.funct,
                });
            }
            if let Some(funct) = entry.funct {
                match self.r_layout.funct {
                    Some(field) if entry.format() == Format::R && field.fits(funct as u32) => {}
                    _ => return Err(ConfigError::UnsupportedFunct(entry.opcode)),
                }
            }
            if entry.format() == Format::J && self.j_layout.is_none() {
                return Err(ConfigError::MissingJumpLayout(entry.opcode));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} x {}-bit registers, {}-cell data memory, {}-bit instructions, {} buttons, {}x{} display, I/O below {:#x}",
            self.name,
            self.num_registers,
            self.register_bits,
            self.data_memory_len(),
            self.word_bits,
            self.num_buttons,
            self.matrix_size,
            self.matrix_size,
            self.io_threshold,
        )
    }
}

/// Descriptor validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NoRegisters,
    EmptyIo,
    InvalidRegisterBits(u8),
    InvalidWordBits(u8),
    FieldOutsideWord { field: &'static str, word_bits: u8 },
    OverlappingFields {
        format: Format,
        first: &'static str,
        second: &'static str,
    },
    RegisterFieldTooNarrow { bits: u8, registers: usize },
    RegisterOutOfRange(u8),
    InvalidIoThreshold { threshold: u32, min: u64, max: u64 },
    OpcodeTooWide(u8),
    MixedFormats(u8),
    DuplicateEntry { opcode: u8, funct: Option<u8> },
    UnsupportedFunct(u8),
    MissingJumpLayout(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoRegisters => write!(f, "register file must not be empty"),
            ConfigError::EmptyIo => {
                write!(f, "button count and display size must be non-zero")
            }
            ConfigError::InvalidRegisterBits(bits) => {
                write!(f, "register_bits must be in range [1, {MAX_REGISTER_BITS}], got {bits}")
            }
            ConfigError::InvalidWordBits(bits) => {
                write!(f, "word_bits must be in range [1, {MAX_WORD_BITS}], got {bits}")
            }
            ConfigError::FieldOutsideWord { field, word_bits } => {
                write!(f, "field {field} does not fit in a {word_bits}-bit word")
            }
            ConfigError::OverlappingFields {
                format,
                first,
                second,
            } => write!(f, "{format}-format fields {first} and {second} overlap"),
            ConfigError::RegisterFieldTooNarrow { bits, registers } => {
                write!(f, "{bits}-bit register field cannot name {registers} registers")
            }
            ConfigError::RegisterOutOfRange(reg) => {
                write!(f, "special register r{reg} is outside the register file")
            }
            ConfigError::InvalidIoThreshold {
                threshold,
                min,
                max,
            } => write!(
                f,
                "io_threshold {threshold:#x} must be in range [{min:#x}, {max:#x}]"
            ),
            ConfigError::OpcodeTooWide(opcode) => {
                write!(f, "opcode {opcode:#x} does not fit in the opcode field")
            }
            ConfigError::MixedFormats(opcode) => {
                write!(f, "opcode {opcode:#x} is bound to more than one format")
            }
            ConfigError::DuplicateEntry { opcode, funct } => {
                write!(f, "duplicate table entry for opcode {opcode:#x}, funct {funct:?}")
            }
            ConfigError::UnsupportedFunct(opcode) => write!(
                f,
                "opcode {opcode:#x} uses a function code the R-format layout cannot hold"
            ),
            ConfigError::MissingJumpLayout(opcode) => {
                write!(f, "opcode {opcode:#x} is J-format but the ISA has no J layout")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
