//! Program and button-string parsing
//!
//! Programs are plain text: whitespace-separated hexadecimal words in
//! program order. No header, no alignment, no length limit.

use crate::error::{Result, RuntimeError};
use sim256_spec::Arch;
use std::fs;
use std::path::Path;

/// Parse a hex program. Fails on the first bad token; nothing is returned
/// unless every word parses and fits the instruction width.
pub fn parse_program(arch: &Arch, text: &str) -> Result<Vec<u32>> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_word(arch, token, index))
        .collect()
}

fn parse_word(arch: &Arch, token: &str, index: usize) -> Result<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    let word = u32::from_str_radix(digits, 16).map_err(|_| RuntimeError::InvalidHexToken {
        token: token.to_string(),
        index,
    })?;
    check_word(arch, word, index)
}

/// Reject words with bits above the instruction width
pub fn check_word(arch: &Arch, word: u32, index: usize) -> Result<u32> {
    if word & !arch.word_mask() != 0 {
        return Err(RuntimeError::WordTooWide {
            word,
            index,
            bits: arch.word_bits,
        });
    }
    Ok(word)
}

/// Read and parse a hex program file
pub fn read_program(arch: &Arch, path: &Path) -> Result<Vec<u32>> {
    let text = fs::read_to_string(path).map_err(|source| RuntimeError::LoadIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(arch, &text)
}

/// Parse a button string: exactly `count` characters, each '0' or '1'
pub fn parse_buttons(text: &str, count: usize) -> Result<Vec<u8>> {
    let found = text.chars().count();
    if found != count {
        return Err(RuntimeError::ButtonCount {
            expected: count,
            found,
        });
    }

    text.chars()
        .enumerate()
        .map(|(index, c)| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            found => Err(RuntimeError::ButtonValue { index, found }),
        })
        .collect()
}
