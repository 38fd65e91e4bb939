//! # Error Types for the sim256 ISA specification

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Invalid architecture: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Value {value:#x} does not fit in the {bits}-bit {field} field")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        bits: u8,
    },

    #[error("Architecture {arch} has no {format}-format encoding")]
    UnsupportedFormat {
        arch: &'static str,
        format: &'static str,
    },

    #[error("Unknown architecture: {0}")]
    UnknownArch(String),
}

pub type Result<T> = std::result::Result<T, SpecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpecError::FieldOverflow {
            field: "imm",
            value: 0x100,
            bits: 8,
        };
        assert_eq!(err.to_string(), "Value 0x100 does not fit in the 8-bit imm field");

        let err = SpecError::UnsupportedFormat {
            arch: "s20",
            format: "J",
        };
        assert_eq!(err.to_string(), "Architecture s20 has no J-format encoding");
    }

    #[test]
    fn test_config_error_from() {
        let err: SpecError = ConfigError::NoRegisters.into();
        assert_eq!(
            err.to_string(),
            "Invalid architecture: register file must not be empty"
        );
    }
}
