//! # sim256 Disassembler
//!
//! Decode instruction words against an architecture descriptor and render
//! them as assembly text.
//!
//! ## Example
//!
//! ```rust
//! use sim256_spec::Arch;
//! use sim256_disassembler::{decode, disassemble};
//!
//! let words = [0x1005, 0x0000]; // seti r0, 5 ; add r0, r0
//! let inst = decode(&Arch::S20, words[0]);
//! assert_eq!(inst.opcode(), 1);
//! println!("{}", disassemble(&Arch::S20, &words));
//! ```

pub mod decoder;
pub mod formatter;
pub mod disassembler;

pub use decoder::decode;
pub use disassembler::{disassemble, listing, ListingLine};
pub use formatter::format;
