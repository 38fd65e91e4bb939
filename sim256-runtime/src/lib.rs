//! # sim256 Runtime
//!
//! Fetch-decode-execute engine and run controller for the sim256 teaching
//! CPUs. One engine serves every ISA variant; all widths, layouts and
//! opcode semantics come from the [`Arch`](sim256_spec::Arch) descriptor.
//!
//! ## Features
//!
//! - **Run control**: step, step_n, sampled watch, run until a PC
//! - **Memory-mapped I/O**: button latches on load, display grid on store
//! - **Hex loader**: whitespace-separated words, all-or-nothing
//! - **Snapshots**: borrowed views for observers, bincode-serializable copies
//!
//! ## Example
//!
//! ```rust
//! use sim256_runtime::{SimConfig, Simulator};
//! use sim256_spec::Arch;
//!
//! let mut sim = Simulator::new(Arch::S20, SimConfig::default()).unwrap();
//! sim.load_str("1005 0000").unwrap(); // seti r0, 5 ; add r0, r0
//! sim.step_n(2).unwrap();
//! assert_eq!(sim.state().read_reg(0), 10);
//! ```

pub mod error;
pub mod state;
pub mod memory;
pub mod execute;
pub mod io;
pub mod snapshot;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use execute::{execute, UnknownPolicy};
pub use memory::{resolve, Access, Location};
pub use snapshot::{Observer, Snapshot, StateSnapshot};
pub use state::MachineState;
pub use vm::{RunState, SimConfig, Simulator, WatchConfig};

/// Run `count` cycles of a hex program on a fresh simulator
pub fn run(arch: sim256_spec::Arch, program: &str, count: u64) -> Result<StateSnapshot> {
    let mut sim = Simulator::new(arch, SimConfig::default())?;
    sim.load_str(program)?;
    sim.step_n(count)?;
    Ok(sim.snapshot().to_state())
}
