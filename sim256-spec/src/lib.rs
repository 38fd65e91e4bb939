//! # sim256 ISA Specification
//!
//! Architecture descriptors for small teaching CPUs and the instruction
//! encoding rules they share.
//!
//! ## Key Features
//! - Data-driven field layouts (R, I and J formats)
//! - Two's-complement immediates of any width
//! - Semantics tables keyed by opcode, plus function code where an ISA shares
//!   one opcode between register-register operations
//! - Memory-mapped I/O sizes (buttons, display grid) per architecture
//! - Two presets: `s20` (8-bit) and `applepi` (16-bit)

pub mod encoding;
pub mod opcode;
pub mod instruction;
pub mod config;
pub mod archs;
pub mod error;

pub use config::{Arch, ConfigError};
pub use encoding::{encode, sign_extend, Field, ILayout, JLayout, RLayout};
pub use opcode::{Format, OpEntry, Operation};
pub use instruction::{Immediate, Instruction};
pub use error::SpecError;

/// Resolve a preset architecture by name
pub fn arch_by_name(name: &str) -> Result<Arch, SpecError> {
    Arch::by_name(name).ok_or_else(|| SpecError::UnknownArch(name.to_string()))
}
