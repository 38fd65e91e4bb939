//! State snapshots
//!
//! [`Snapshot`] is a borrowed, read-only view handed to observers while a
//! run is in progress. [`StateSnapshot`] is an owned copy that can be
//! serialized with bincode and restored into a simulator later.

use crate::error::Result;
use crate::state::MachineState;
use serde::{Deserialize, Serialize};
use sim256_spec::Arch;

/// Read-only view of the machine at one point in time
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub arch: &'a Arch,
    pub pc: u32,
    pub cycles: u64,
    pub instructions: &'a [u32],
    pub registers: &'a [u32],
    pub data_memory: &'a [u32],
    pub buttons: &'a [u8],
    pub matrix: &'a [Vec<u32>],
}

impl<'a> Snapshot<'a> {
    pub fn new(state: &'a MachineState, cycles: u64) -> Self {
        Snapshot {
            arch: state.arch(),
            pc: state.pc(),
            cycles,
            instructions: state.instructions(),
            registers: state.registers(),
            data_memory: state.data_memory(),
            buttons: state.buttons(),
            matrix: state.matrix(),
        }
    }

    /// Word at PC, if PC is inside the instruction store
    pub fn current_word(&self) -> Option<u32> {
        self.instructions.get(self.pc as usize).copied()
    }

    pub fn to_state(&self) -> StateSnapshot {
        StateSnapshot {
            arch: self.arch.name.to_string(),
            pc: self.pc,
            cycles: self.cycles,
            instructions: self.instructions.to_vec(),
            registers: self.registers.to_vec(),
            data_memory: self.data_memory.to_vec(),
            buttons: self.buttons.to_vec(),
            matrix: self.matrix.to_vec(),
        }
    }
}

/// Owned machine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Architecture name the state belongs to
    pub arch: String,
    pub pc: u32,
    pub cycles: u64,
    pub instructions: Vec<u32>,
    pub registers: Vec<u32>,
    pub data_memory: Vec<u32>,
    pub buttons: Vec<u8>,
    pub matrix: Vec<Vec<u32>>,
}

impl StateSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Borrow the owned copy as a view
    pub fn view<'a>(&'a self, arch: &'a Arch) -> Snapshot<'a> {
        Snapshot {
            arch,
            pc: self.pc,
            cycles: self.cycles,
            instructions: &self.instructions,
            registers: &self.registers,
            data_memory: &self.data_memory,
            buttons: &self.buttons,
            matrix: &self.matrix,
        }
    }
}

/// Receives snapshots during a watched run
pub trait Observer {
    fn observe(&mut self, snapshot: &Snapshot<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&Snapshot<'_>),
{
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}
