//! Run controller for the sim256 CPU
//!
//! Drives fetch -> decode -> execute over one or many cycles and owns the
//! machine state, the random source and the run configuration.

use crate::error::{Result, RuntimeError};
use crate::execute::{execute, UnknownPolicy};
use crate::io::{check_word, parse_buttons, parse_program, read_program};
use crate::snapshot::{Observer, Snapshot, StateSnapshot};
use crate::state::MachineState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sim256_disassembler::{decode, disassemble, format};
use sim256_spec::{Arch, SpecError};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Simulator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Handling of opcode/funct pairs with no semantics
    pub unknown_instruction: UnknownPolicy,

    /// Cycle cap for `run_until` (`None` runs until the target is reached)
    pub max_run_cycles: Option<u64>,

    /// Seed for `rand` instructions (`None` seeds from the OS)
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            unknown_instruction: UnknownPolicy::Fault,
            max_run_cycles: None,
            seed: None,
        }
    }
}

/// Pacing for [`Simulator::watch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Emit a snapshot every `sample_period` cycles (0 is treated as 1)
    pub sample_period: u64,

    /// Pause after each emitted snapshot
    pub delay: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sample_period: 100,
            delay: Duration::from_millis(50),
        }
    }
}

/// Run controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing executing (fresh, reset, or between run calls)
    Idle,
    /// Inside a step/step_n/watch/run_until call
    Running,
}

/// The sim256 simulator
pub struct Simulator {
    state: MachineState,
    config: SimConfig,
    rng: StdRng,

    /// Cycles fetched since the last reset, faulting ones included
    cycles: u64,

    run_state: RunState,

    /// Path of the last program loaded from disk
    program_path: Option<PathBuf>,
}

impl Simulator {
    /// Create a simulator for `arch` with an empty instruction store
    pub fn new(arch: Arch, config: SimConfig) -> Result<Self> {
        arch.validate().map_err(SpecError::from)?;
        debug!(arch = arch.name, "creating simulator");

        Ok(Self {
            state: MachineState::new(arch),
            rng: make_rng(config.seed),
            config,
            cycles: 0,
            run_state: RunState::Idle,
            program_path: None,
        })
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a hex program file, then reset
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let words = read_program(self.state.arch(), path)?;
        debug!(path = %path.display(), words = words.len(), "loaded program file");
        self.install(words);
        self.program_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Reload the last program loaded with [`load_file`](Self::load_file)
    pub fn reload(&mut self) -> Result<Option<PathBuf>> {
        match self.program_path.clone() {
            Some(path) => {
                self.load_file(&path)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Load a hex program from text, then reset
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let words = parse_program(self.state.arch(), text)?;
        self.install(words);
        Ok(())
    }

    /// Load raw words, then reset
    pub fn load_words(&mut self, words: &[u32]) -> Result<()> {
        for (index, &word) in words.iter().enumerate() {
            check_word(self.state.arch(), word, index)?;
        }
        self.install(words.to_vec());
        Ok(())
    }

    fn install(&mut self, words: Vec<u32>) {
        debug!(words = words.len(), "installing instruction store");
        self.state.replace_instructions(words);
        self.reset();
    }

    /// Zero all CPU-owned state; the instruction store is kept
    pub fn reset(&mut self) {
        self.state.reset();
        self.cycles = 0;
        self.run_state = RunState::Idle;
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        debug!(arch = self.state.arch().name, "reset");
    }

    /// Set the button latches from a string of '0'/'1' characters
    pub fn change_buttons(&mut self, text: &str) -> Result<()> {
        let buttons = parse_buttons(text, self.state.arch().num_buttons)?;
        debug!(buttons = text, "buttons changed");
        self.state.set_buttons(buttons);
        Ok(())
    }

    // ========================================================================
    // Running
    // ========================================================================

    /// Execute exactly one cycle
    pub fn step(&mut self) -> Result<()> {
        self.running(|sim| sim.cycle())
    }

    /// Execute `count` cycles; a fault aborts the remaining ones
    pub fn step_n(&mut self, count: u64) -> Result<()> {
        self.running(|sim| {
            for _ in 0..count {
                sim.cycle()?;
            }
            Ok(())
        })
    }

    /// Like [`step_n`](Self::step_n), but every `sample_period` cycles (the
    /// first one included) hand a snapshot to `observer` and pause for
    /// `delay`. Blocks the calling thread while pausing.
    pub fn watch(&mut self, count: u64, watch: &WatchConfig, observer: &mut dyn Observer) -> Result<()> {
        let period = watch.sample_period.max(1);
        self.running(|sim| {
            for i in 0..count {
                sim.cycle()?;
                if i % period == 0 {
                    observer.observe(&sim.snapshot());
                    if !watch.delay.is_zero() {
                        thread::sleep(watch.delay);
                    }
                }
            }
            Ok(())
        })
    }

    /// Execute at least one cycle, then keep going until PC equals
    /// `target`. Returns the number of cycles executed.
    ///
    /// Without `max_run_cycles` this never returns if `target` is never
    /// reached.
    pub fn run_until(&mut self, target: u32) -> Result<u64> {
        let limit = self.config.max_run_cycles;
        self.running(|sim| {
            let mut executed = 0u64;
            loop {
                sim.cycle()?;
                executed += 1;
                if sim.state.pc() == target {
                    return Ok(executed);
                }
                if let Some(limit) = limit {
                    if executed >= limit {
                        return Err(RuntimeError::CycleLimitExceeded { limit });
                    }
                }
            }
        })
    }

    fn running<T>(&mut self, run: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.run_state = RunState::Running;
        let result = run(self);
        self.run_state = RunState::Idle;
        result
    }

    /// One fetch-decode-execute cycle. A cycle counts once its fetch
    /// succeeds, so a fault during execute is included in `cycles`.
    fn cycle(&mut self) -> Result<()> {
        let fetch_pc = self.state.pc();
        let word = self.state.fetch()?;
        let cycle = self.cycles;
        self.cycles += 1;
        let arch = *self.state.arch();
        let instr = decode(&arch, word);

        trace!(
            cycle,
            pc = fetch_pc,
            word,
            "{}",
            format(&arch, &instr)
        );

        execute(
            &instr,
            &mut self.state,
            &mut self.rng,
            self.config.unknown_instruction,
            fetch_pc,
        )
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.state, self.cycles)
    }

    /// Replace the machine state with a saved copy
    pub fn restore(&mut self, saved: &StateSnapshot) -> Result<()> {
        let arch = *self.state.arch();
        if saved.arch != arch.name {
            return Err(mismatch(format!(
                "snapshot is for {}, simulator runs {}",
                saved.arch, arch.name
            )));
        }
        check_len("registers", saved.registers.len(), arch.num_registers)?;
        check_len("data memory", saved.data_memory.len(), arch.data_memory_len())?;
        check_len("buttons", saved.buttons.len(), arch.num_buttons)?;
        check_len("display rows", saved.matrix.len(), arch.matrix_size)?;
        for row in &saved.matrix {
            check_len("display row", row.len(), arch.matrix_size)?;
        }

        let mask = arch.register_mask();
        let cells = saved
            .registers
            .iter()
            .chain(&saved.data_memory)
            .chain(saved.matrix.iter().flatten());
        if let Some(value) = cells.copied().find(|value| value & !mask != 0) {
            return Err(mismatch(format!(
                "value {:#x} is wider than {} bits",
                value, arch.register_bits
            )));
        }
        if saved.buttons.iter().any(|&b| b > 1) {
            return Err(mismatch("button latches must be 0 or 1".to_string()));
        }
        for (index, &word) in saved.instructions.iter().enumerate() {
            check_word(&arch, word, index)?;
        }
        for &(reg, value) in arch.constant_registers {
            if saved.registers[reg as usize] != value {
                return Err(mismatch(format!("read-only register r{} was modified", reg)));
            }
        }

        self.state.overwrite(
            saved.pc,
            saved.registers.clone(),
            saved.data_memory.clone(),
            saved.buttons.clone(),
            saved.matrix.clone(),
            saved.instructions.clone(),
        );
        self.cycles = saved.cycles;
        self.run_state = RunState::Idle;
        debug!(pc = saved.pc, cycles = saved.cycles, "restored snapshot");
        Ok(())
    }

    /// Disassembly of the instruction store
    pub fn disassemble(&self) -> String {
        disassemble(self.state.arch(), self.state.instructions())
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn arch(&self) -> &Arch {
        self.state.arch()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn program_path(&self) -> Option<&Path> {
        self.program_path.as_deref()
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn mismatch(reason: String) -> RuntimeError {
    RuntimeError::SnapshotMismatch { reason }
}

fn check_len(what: &str, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(mismatch(format!(
            "{} has {} entries, expected {}",
            what, found, expected
        )));
    }
    Ok(())
}
