//! Runtime error types for the sim256 simulator

use sim256_spec::SpecError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Spec error: {0}")]
    SpecError(#[from] SpecError),

    // ========== Load / validation (state untouched) ==========
    #[error("Cannot read program {path:?}: {source}")]
    LoadIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid hex token {token:?} at word {index}")]
    InvalidHexToken { token: String, index: usize },

    #[error("Word {word:#x} at index {index} is wider than {bits} bits")]
    WordTooWide { word: u32, index: usize, bits: u8 },

    #[error("Expected {expected} button bits, got {found}")]
    ButtonCount { expected: usize, found: usize },

    #[error("Invalid button bit {found:?} at position {index} (expected '0' or '1')")]
    ButtonValue { index: usize, found: char },

    #[error("Snapshot does not match the simulator: {reason}")]
    SnapshotMismatch { reason: String },

    #[error("Snapshot encoding error: {0}")]
    SnapshotEncoding(#[from] bincode::Error),

    // ========== Run faults ==========
    #[error("Address fault: PC {pc:#x} outside instruction store of {len} words")]
    AddressFault { pc: u32, len: usize },

    #[error("Invalid input address {address:#x}: only {buttons} buttons are mapped")]
    InvalidInputAddress { address: u32, buttons: usize },

    #[error("Memory out of bounds: address {address:#x}")]
    OutOfBounds { address: u32 },

    #[error("Unknown instruction at PC {pc:#x}: opcode {opcode:#x}, funct {funct:?}")]
    UnknownInstruction {
        pc: u32,
        opcode: u8,
        funct: Option<u8>,
    },

    #[error("Branch at PC {pc:#x} with offset {offset} leaves the address space")]
    BranchOutOfRange { pc: u32, offset: i32 },

    #[error("Cycle limit exceeded: {limit}")]
    CycleLimitExceeded { limit: u64 },
}

impl RuntimeError {
    /// Load and validation errors leave the simulator untouched, so the
    /// caller can fix the input and retry. Everything else stops a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RuntimeError::LoadIo { .. }
                | RuntimeError::InvalidHexToken { .. }
                | RuntimeError::WordTooWide { .. }
                | RuntimeError::ButtonCount { .. }
                | RuntimeError::ButtonValue { .. }
                | RuntimeError::SnapshotMismatch { .. }
                | RuntimeError::SnapshotEncoding(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_address_fault_display() {
        let err = RuntimeError::AddressFault { pc: 0x10, len: 16 };
        assert_eq!(
            err.to_string(),
            "Address fault: PC 0x10 outside instruction store of 16 words"
        );
    }

    #[test]
    fn test_invalid_hex_token_display() {
        let err = RuntimeError::InvalidHexToken {
            token: "12G4".to_string(),
            index: 3,
        };
        assert_eq!(err.to_string(), "Invalid hex token \"12G4\" at word 3");
    }

    #[test]
    fn test_button_errors_display() {
        let err = RuntimeError::ButtonCount {
            expected: 4,
            found: 2,
        };
        assert_eq!(err.to_string(), "Expected 4 button bits, got 2");

        let err = RuntimeError::ButtonValue {
            index: 1,
            found: 'x',
        };
        assert_eq!(
            err.to_string(),
            "Invalid button bit 'x' at position 1 (expected '0' or '1')"
        );
    }

    #[test]
    fn test_io_address_display() {
        let err = RuntimeError::InvalidInputAddress {
            address: 0x7,
            buttons: 4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid input address 0x7: only 4 buttons are mapped"
        );
    }

    #[test]
    fn test_unknown_instruction_display() {
        let err = RuntimeError::UnknownInstruction {
            pc: 2,
            opcode: 0,
            funct: Some(0xF),
        };
        assert_eq!(
            err.to_string(),
            "Unknown instruction at PC 0x2: opcode 0x0, funct Some(15)"
        );
    }

    #[test]
    fn test_load_io_keeps_source() {
        let err = RuntimeError::LoadIo {
            path: PathBuf::from("missing.hex"),
            source: IoError::new(ErrorKind::NotFound, "file not found"),
        };
        assert!(err.to_string().contains("missing.hex"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_spec_error_from() {
        let spec_err = SpecError::UnknownArch("z80".to_string());
        let runtime_err: RuntimeError = spec_err.into();
        assert!(runtime_err.to_string().contains("z80"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(RuntimeError::ButtonCount {
            expected: 4,
            found: 0
        }
        .is_recoverable());
        assert!(RuntimeError::InvalidHexToken {
            token: String::new(),
            index: 0
        }
        .is_recoverable());
        assert!(!RuntimeError::AddressFault { pc: 0, len: 0 }.is_recoverable());
        assert!(!RuntimeError::CycleLimitExceeded { limit: 1 }.is_recoverable());
        assert!(!RuntimeError::BranchOutOfRange { pc: 0, offset: -2 }.is_recoverable());
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(RuntimeError::CycleLimitExceeded { limit: 10 });
        assert!(result.is_err());
    }
}
