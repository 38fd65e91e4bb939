//! End-to-end tests for the sim256 toolchain
//!
//! These tests drive the whole pipeline the way the command line does:
//! 1. Load a hex program (text or file)
//! 2. Run it with the run controller
//! 3. Inspect the resulting machine state through snapshots
//! 4. Disassemble the program

use sim256_disassembler::disassemble;
use sim256_runtime::{RuntimeError, SimConfig, Simulator, StateSnapshot};
use sim256_spec::Arch;

fn load(arch: Arch, program: &str) -> Simulator {
    let config = SimConfig {
        seed: Some(256),
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(arch, config).expect("valid architecture");
    sim.load_str(program).expect("valid program");
    sim
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_s20_seti_add() {
    // seti r0, 5 ; add r0, r0
    let mut sim = load(Arch::S20, "1005 0000");
    sim.reset();
    sim.step().unwrap();
    sim.step().unwrap();

    let snap = sim.snapshot();
    assert_eq!(snap.registers[0], 10);
    assert_eq!(snap.pc, 2);
}

#[test]
fn test_button_string() {
    let mut sim = load(Arch::S20, "");
    sim.change_buttons("0101").unwrap();
    assert_eq!(sim.snapshot().buttons, &[0, 1, 0, 1]);

    let err = sim.change_buttons("01").unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ButtonCount {
            expected: 4,
            found: 2
        }
    ));
    assert_eq!(sim.snapshot().buttons, &[0, 1, 0, 1]);
}

#[test]
fn test_store_to_display() {
    // seti r2, 12 ; seti r1, 3 ; st [r2], r1
    let mut sim = load(Arch::S20, "140c 1203 0284");
    sim.step_n(3).unwrap();

    let snap = sim.snapshot();
    assert_eq!(snap.matrix[1][2], 3);
    assert!(snap.data_memory.iter().all(|&v| v == 0));
}

#[test]
fn test_apple_pi_button_echo() {
    // Copy button 2 into display cell 0 until PC reaches 4:
    // 0: seti r2, 2
    // 1: load r3, [r2]
    // 2: store [r0], r3
    // 3: jal 1
    let mut sim = load(Arch::APPLE_PI, "a202 3320 4300 5001");
    sim.change_buttons("0010").unwrap();
    sim.step_n(3).unwrap();
    assert_eq!(sim.snapshot().matrix[0][0], 1);

    sim.change_buttons("0000").unwrap();
    sim.run_until(3).unwrap();
    assert_eq!(sim.snapshot().matrix[0][0], 0);
}

#[test]
fn test_apple_pi_draws_diagonal() {
    // r15 = pixel address, r4 = 11 (one row down, one column right)
    // r5 = 110 (stop once past the last cell)
    // 0: seti r4, 11
    // 1: seti r5, 110
    // 2: store [r15], r1
    // 3: add r15, r4
    // 4: bgt r5, -3     (110 > r15? -> PC 2)
    // 5: jal 5
    let mut sim = load(Arch::APPLE_PI, "a40b a56e 41f0 0f40 85fd 5005");
    sim.run_until(5).unwrap();

    let snap = sim.snapshot();
    for row in 0..10 {
        for col in 0..10 {
            let expected = u32::from(row == col);
            assert_eq!(snap.matrix[row][col], expected, "cell ({row}, {col})");
        }
    }
    assert_eq!(snap.registers[15], 110);
}

// ============================================================================
// Files, Snapshots and Disassembly
// ============================================================================

#[test]
fn test_load_file_and_dump_state() {
    let dir = std::env::temp_dir();
    let program = dir.join(format!("sim256-e2e-{}.hex", std::process::id()));
    std::fs::write(&program, "1005\n0000\n").unwrap();

    let mut sim = Simulator::new(Arch::S20, SimConfig::default()).unwrap();
    sim.load_file(&program).unwrap();
    sim.step_n(2).unwrap();

    let bytes = sim.snapshot().to_state().to_bytes().unwrap();
    let saved = StateSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(saved.arch, "s20");
    assert_eq!(saved.registers[0], 10);
    assert_eq!(saved.pc, 2);
    assert_eq!(saved.instructions, vec![0x1005, 0x0000]);

    let mut fresh = Simulator::new(Arch::S20, SimConfig::default()).unwrap();
    fresh.restore(&saved).unwrap();
    assert_eq!(fresh.snapshot().to_state(), saved);

    std::fs::remove_file(&program).unwrap();
}

#[test]
fn test_disassemble_loaded_program() {
    let sim = load(Arch::APPLE_PI, "a40b a56e 41f0 0f40 85fd 5005");
    let listing = disassemble(sim.arch(), sim.state().instructions());
    assert_eq!(listing, sim.disassemble());

    let lines: Vec<&str> = listing.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "0: a40b  seti r4, 11",
            "1: a56e  seti r5, 110",
            "2: 41f0  store [r15], r1",
            "3: 0f40  add r15, r4",
            "4: 85fd  bgt r5, -3",
            "5: 5005  jal 0x005",
        ]
    );
}

#[test]
fn test_run_off_the_end_is_reported() {
    let mut sim = load(Arch::S20, "1005 0000");
    let err = sim.step_n(3).unwrap_err();
    assert!(matches!(err, RuntimeError::AddressFault { pc: 2, len: 2 }));
    assert_eq!(sim.snapshot().registers[0], 10);
    assert_eq!(sim.cycles(), 2);
}
