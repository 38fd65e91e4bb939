//! Machine state for the sim256 CPU
//!
//! Everything here except the instruction store is CPU-owned and cleared by
//! [`MachineState::reset`]. Lengths are fixed by the architecture at
//! construction and never change afterwards.

use crate::error::{Result, RuntimeError};
use crate::memory::{resolve, Access, Location};
use sim256_spec::Arch;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    arch: Arch,

    /// Index of the next instruction to fetch
    pc: u32,

    /// Register file (exactly R entries, each masked to W bits)
    registers: Vec<u32>,

    /// Data memory (exactly 2^W cells)
    data_memory: Vec<u32>,

    /// Button latches (exactly B entries, each 0 or 1)
    buttons: Vec<u8>,

    /// Display grid (M rows of M cells)
    matrix: Vec<Vec<u32>>,

    /// Instruction store (simulator-owned, survives reset)
    instructions: Vec<u32>,
}

impl MachineState {
    pub fn new(arch: Arch) -> Self {
        let mut state = MachineState {
            arch,
            pc: 0,
            registers: vec![0; arch.num_registers],
            data_memory: vec![0; arch.data_memory_len()],
            buttons: vec![0; arch.num_buttons],
            matrix: vec![vec![0; arch.matrix_size]; arch.matrix_size],
            instructions: Vec::new(),
        };
        state.load_constants();
        state
    }

    fn load_constants(&mut self) {
        for &(reg, value) in self.arch.constant_registers {
            self.registers[reg as usize] = value & self.arch.register_mask();
        }
    }

    /// Zero all CPU-owned state; the instruction store is kept
    pub fn reset(&mut self) {
        self.pc = 0;
        self.registers.fill(0);
        self.data_memory.fill(0);
        self.buttons.fill(0);
        for row in &mut self.matrix {
            row.fill(0);
        }
        self.load_constants();
    }

    #[inline]
    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    // ========================================================================
    // Program Counter / Instruction Store
    // ========================================================================

    #[inline]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    #[inline]
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    pub fn instructions(&self) -> &[u32] {
        &self.instructions
    }

    /// Swap in a new instruction store (CPU state is not touched)
    pub fn replace_instructions(&mut self, words: Vec<u32>) {
        self.instructions = words;
    }

    /// Read the word at PC and advance PC past it
    pub fn fetch(&mut self) -> Result<u32> {
        let word = self
            .instructions
            .get(self.pc as usize)
            .copied()
            .ok_or(RuntimeError::AddressFault {
                pc: self.pc,
                len: self.instructions.len(),
            })?;
        self.pc += 1;
        Ok(word)
    }

    // ========================================================================
    // Registers
    // ========================================================================

    pub fn registers(&self) -> &[u32] {
        &self.registers
    }

    /// Read register (indices the encoding can name but the file lacks read 0)
    #[inline]
    pub fn read_reg(&self, index: u8) -> u32 {
        self.registers.get(index as usize).copied().unwrap_or(0)
    }

    /// Write register, truncated to W bits (writes to read-only registers are dropped)
    #[inline]
    pub fn write_reg(&mut self, index: u8, value: u32) {
        let index = index as usize;
        if self.arch.is_read_only(index) {
            return;
        }
        let mask = self.arch.register_mask();
        if let Some(slot) = self.registers.get_mut(index) {
            *slot = value & mask;
        }
    }

    // ========================================================================
    // Memory and Memory-Mapped I/O
    // ========================================================================

    pub fn data_memory(&self) -> &[u32] {
        &self.data_memory
    }

    pub fn buttons(&self) -> &[u8] {
        &self.buttons
    }

    /// Replace the button latches (caller validates the values)
    pub fn set_buttons(&mut self, buttons: Vec<u8>) {
        debug_assert_eq!(buttons.len(), self.arch.num_buttons);
        self.buttons = buttons;
    }

    pub fn matrix(&self) -> &[Vec<u32>] {
        &self.matrix
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<u32> {
        self.matrix.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Load from an effective address
    pub fn load(&self, address: u32) -> Result<u32> {
        Ok(match resolve(&self.arch, address, Access::Load)? {
            Location::Button(index) => self.buttons[index] as u32,
            Location::Data(index) => self.data_memory[index],
            Location::Pixel { row, col } => self.matrix[row][col],
            // loads never resolve to unmapped output addresses
            Location::Unmapped(_) => 0,
        })
    }

    /// Store to an effective address (value truncated to W bits)
    pub fn store(&mut self, address: u32, value: u32) -> Result<Location> {
        let value = value & self.arch.register_mask();
        let location = resolve(&self.arch, address, Access::Store)?;
        match location {
            Location::Pixel { row, col } => self.matrix[row][col] = value,
            Location::Data(index) => self.data_memory[index] = value,
            Location::Unmapped(address) => {
                warn!(address, value, "store to unmapped output address dropped");
            }
            // stores never resolve to button latches
            Location::Button(_) => {}
        }
        Ok(location)
    }

    /// Overwrite every CPU-owned element at once (used by snapshot restore)
    pub(crate) fn overwrite(
        &mut self,
        pc: u32,
        registers: Vec<u32>,
        data_memory: Vec<u32>,
        buttons: Vec<u8>,
        matrix: Vec<Vec<u32>>,
        instructions: Vec<u32>,
    ) {
        self.pc = pc;
        self.registers = registers;
        self.data_memory = data_memory;
        self.buttons = buttons;
        self.matrix = matrix;
        self.instructions = instructions;
    }
}
