//! Cross-module interaction tests
//!
//! Checks that the encoder, decoder, formatter and runtime agree with each
//! other, and the machine-state properties that must hold for any input.

use proptest::prelude::*;
use sim256_disassembler::{decode, format};
use sim256_runtime::{SimConfig, Simulator};
use sim256_spec::{encode, sign_extend, Arch, Immediate, Instruction};

fn arch_strategy() -> impl Strategy<Value = Arch> {
    prop_oneof![Just(Arch::S20), Just(Arch::APPLE_PI)]
}

fn simulator(arch: Arch, words: &[u32]) -> Simulator {
    let config = SimConfig {
        seed: Some(3),
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(arch, config).unwrap();
    sim.load_words(words).unwrap();
    sim
}

fn i_word(arch: &Arch, mnemonic: &str, reg: u8, imm: i32) -> u32 {
    let entry = arch.entry_by_mnemonic(mnemonic).unwrap();
    encode(
        arch,
        &Instruction::I {
            opcode: entry.opcode,
            reg,
            imm: Immediate::from_signed(imm, arch.i_layout.imm.bits),
        },
    )
    .unwrap()
}

// ============================================================================
// Encoder -> Decoder -> Formatter
// ============================================================================

#[test]
fn test_every_entry_formats_with_its_mnemonic() {
    for arch in Arch::PRESETS {
        for entry in arch.ops {
            let instr = match entry.format() {
                sim256_spec::Format::R => Instruction::R {
                    opcode: entry.opcode,
                    reg1: 1,
                    reg2: 2,
                    funct: entry.funct,
                },
                sim256_spec::Format::I => Instruction::I {
                    opcode: entry.opcode,
                    reg: 3,
                    imm: Immediate::new(4, arch.i_layout.imm.bits),
                },
                sim256_spec::Format::J => Instruction::J {
                    opcode: entry.opcode,
                    target: 5,
                },
            };
            let word = encode(arch, &instr).unwrap();
            let text = format(arch, &decode(arch, word));
            assert!(
                text.starts_with(entry.mnemonic),
                "{}: {:#06x} formatted as {:?}",
                arch.name,
                word,
                text
            );
        }
    }
}

#[test]
fn test_presets_validate() {
    for arch in Arch::PRESETS {
        arch.validate().unwrap();
        assert!(Simulator::new(*arch, SimConfig::default()).is_ok());
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_sign_extension(bits in 1u8..=16, raw in any::<u32>()) {
        let value = raw & ((1u32 << bits) - 1);
        let half = 1u32 << (bits - 1);
        let expected = if value >= half {
            value as i64 - (1i64 << bits)
        } else {
            value as i64
        };
        prop_assert_eq!(sign_extend(value, bits) as i64, expected);
    }

    #[test]
    fn prop_seti_stores_truncated_value(arch in arch_strategy(), reg in 2u8..7, imm in -128i32..=127) {
        let mut sim = simulator(arch, &[i_word(&arch, "seti", reg, imm)]);
        sim.step().unwrap();
        let value = sim.state().read_reg(reg);
        prop_assert!(value <= arch.register_mask());
        prop_assert_eq!(value, (imm as u32) & arch.register_mask());
    }

    #[test]
    fn prop_addi_stays_in_range(start in -128i32..=127, step in -128i32..=127, repeats in 1usize..20) {
        let arch = Arch::S20;
        let mut words = vec![i_word(&arch, "seti", 3, start)];
        words.extend(std::iter::repeat(i_word(&arch, "addi", 3, step)).take(repeats));
        let mut sim = simulator(arch, &words);
        sim.step_n(words.len() as u64).unwrap();

        let expected = (start as i64 + step as i64 * repeats as i64).rem_euclid(256) as u32;
        prop_assert_eq!(sim.state().read_reg(3), expected);
    }

    #[test]
    fn prop_constant_registers_never_change(imm in -128i32..=127, reg in 0u8..2) {
        let arch = Arch::APPLE_PI;
        let mut sim = simulator(arch, &[i_word(&arch, "seti", reg, imm)]);
        sim.step().unwrap();
        prop_assert_eq!(sim.state().read_reg(0), 0);
        prop_assert_eq!(sim.state().read_reg(1), 1);
    }

    #[test]
    fn prop_branch_correction(p in 0u32..64, d in -64i32..=63, taken in any::<bool>()) {
        // Pad with zeros so the branch sits at address p
        let arch = Arch::S20;
        let mut words = vec![0u32; p as usize];
        // beq r2, d is taken when r2 == r7 (both zero); bne r2, d never is
        let mnemonic = if taken { "beq" } else { "bne" };
        words.push(i_word(&arch, mnemonic, 2, d));

        let mut sim = simulator(arch, &words);
        let mut saved = sim.snapshot().to_state();
        saved.pc = p;
        sim.restore(&saved).unwrap();

        let target = p as i64 + 1 + d as i64;
        match sim.step() {
            Ok(()) if taken => prop_assert_eq!(sim.state().pc() as i64, target),
            Ok(()) => prop_assert_eq!(sim.state().pc(), p + 1),
            Err(_) => prop_assert!(taken && target < 0),
        }
    }

    #[test]
    fn prop_reset_keeps_only_instructions(words in prop::collection::vec(0u32..0x10000, 1..16), steps in 0u64..16) {
        let arch = Arch::APPLE_PI;
        let config = SimConfig {
            unknown_instruction: sim256_runtime::UnknownPolicy::Ignore,
            seed: Some(9),
            max_run_cycles: None,
        };
        let mut sim = Simulator::new(arch, config).unwrap();
        sim.load_words(&words).unwrap();
        // Faults are fine here; only the reset afterwards matters
        let _ = sim.step_n(steps);
        sim.reset();

        let snap = sim.snapshot();
        prop_assert_eq!(snap.pc, 0);
        prop_assert_eq!(snap.registers[0], 0);
        prop_assert_eq!(snap.registers[1], 1);
        prop_assert!(snap.registers[2..].iter().all(|&r| r == 0));
        prop_assert!(snap.data_memory.iter().all(|&v| v == 0));
        prop_assert!(snap.buttons.iter().all(|&b| b == 0));
        prop_assert!(snap.matrix.iter().flatten().all(|&c| c == 0));
        prop_assert_eq!(snap.instructions, words.as_slice());
    }

    #[test]
    fn prop_run_until_executes_at_least_once(padding in 1usize..8) {
        // A straight-line run of seti r2, 1 followed by a jump back to 0
        let arch = Arch::APPLE_PI;
        let mut words = vec![i_word(&arch, "seti", 2, 1); padding];
        words.push(0x5000); // jal 0
        let mut sim = simulator(arch, &words);

        let executed = sim.run_until(0).unwrap();
        prop_assert_eq!(executed, padding as u64 + 1);
        prop_assert_eq!(sim.state().pc(), 0);
    }
}
