//! Program listing

use crate::decoder::decode;
use crate::formatter::format;
use sim256_spec::Arch;

/// One listing line: address, raw word, assembly text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub address: usize,
    pub word: u32,
    pub text: String,
}

/// Decode and format every word of an instruction store
pub fn listing(arch: &Arch, words: &[u32]) -> Vec<ListingLine> {
    words
        .iter()
        .enumerate()
        .map(|(address, &word)| ListingLine {
            address,
            word,
            text: format(arch, &decode(arch, word)),
        })
        .collect()
}

/// Disassemble an instruction store into text, one instruction per line
pub fn disassemble(arch: &Arch, words: &[u32]) -> String {
    let addr_width = hex_digits(words.len().saturating_sub(1));
    let word_width = (arch.word_bits as usize + 3) / 4;

    let mut output = String::new();
    output.push_str(&format!("; {} program, {} words\n", arch.name, words.len()));
    for line in listing(arch, words) {
        output.push_str(&format!(
            "{:0aw$x}: {:0ww$x}  {}\n",
            line.address,
            line.word,
            line.text,
            aw = addr_width,
            ww = word_width,
        ));
    }
    output
}

fn hex_digits(value: usize) -> usize {
    let mut digits = 1;
    let mut rest = value >> 4;
    while rest > 0 {
        digits += 1;
        rest >>= 4;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_header() {
        let output = disassemble(&Arch::S20, &[]);
        assert_eq!(output, "; s20 program, 0 words\n");
    }

    #[test]
    fn test_disassemble_lines() {
        let output = disassemble(&Arch::S20, &[0x1005, 0x0000]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "0: 1005  seti r0, 5");
        assert_eq!(lines[2], "1: 0000  add r0, r0");
    }

    #[test]
    fn test_address_width_grows() {
        let words = vec![0u32; 17];
        let output = disassemble(&Arch::APPLE_PI, &words);
        assert!(output.contains("10: 0000  add r0, r0"));
        assert!(output.contains("00: 0000  add r0, r0"));
    }

    #[test]
    fn test_hex_digits() {
        assert_eq!(hex_digits(0), 1);
        assert_eq!(hex_digits(15), 1);
        assert_eq!(hex_digits(16), 2);
        assert_eq!(hex_digits(0x1000), 4);
    }
}
