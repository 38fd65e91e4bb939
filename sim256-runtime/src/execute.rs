//! Instruction execution
//!
//! The executor never matches on raw opcodes. It resolves the decoded
//! opcode (and funct, where the ISA has one) against the architecture's
//! semantics table and applies the resulting [`Operation`]. PC has already
//! been advanced past the instruction by fetch when this runs.

use crate::error::{Result, RuntimeError};
use crate::state::MachineState;
use rand::Rng;
use sim256_spec::{Immediate, Instruction, Operation};
use tracing::warn;

/// What to do with an opcode/funct pair the semantics table does not bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Stop with [`RuntimeError::UnknownInstruction`]
    Fault,
    /// Complete the cycle without effect (PC still advances)
    Ignore,
}

/// Execute one decoded instruction fetched from `fetch_pc`
pub fn execute<R: Rng>(
    instr: &Instruction,
    state: &mut MachineState,
    rng: &mut R,
    policy: UnknownPolicy,
    fetch_pc: u32,
) -> Result<()> {
    let arch = *state.arch();
    let Some(entry) = arch.lookup(instr.opcode(), instr.funct()) else {
        return unknown(instr, policy, fetch_pc);
    };
    let cmp = arch.comparison_register;

    match (entry.op, *instr) {
        // ========== Arithmetic ==========
        (Operation::Add, Instruction::R { reg1, reg2, .. }) => {
            let result = state.read_reg(reg1).wrapping_add(state.read_reg(reg2));
            state.write_reg(reg1, result);
        }

        (Operation::Sub, Instruction::R { reg1, reg2, .. }) => {
            let result = state.read_reg(reg1).wrapping_sub(state.read_reg(reg2));
            state.write_reg(reg1, result);
        }

        (Operation::AddImm, Instruction::I { reg, imm, .. }) => {
            let result = (state.read_reg(reg) as i64 + imm.signed() as i64) as u32;
            state.write_reg(reg, result);
        }

        (Operation::SetImm, Instruction::I { reg, imm, .. }) => {
            state.write_reg(reg, imm.signed() as u32);
        }

        // ========== Move ==========
        (Operation::Move, Instruction::R { reg1, reg2, .. }) => {
            let value = state.read_reg(reg2);
            state.write_reg(reg1, value);
        }

        // ========== Random ==========
        (Operation::RandMask, Instruction::I { reg, imm, .. }) => {
            let value = rng.gen::<u32>() & arch.register_mask() & imm.unsigned();
            state.write_reg(reg, value);
        }

        (Operation::RandRange, Instruction::I { reg, imm, .. }) => {
            let value = rng.gen_range(0..=imm.unsigned());
            state.write_reg(reg, value);
        }

        // ========== Memory ==========
        (Operation::Load, Instruction::R { reg1, reg2, .. }) => {
            let address = state.read_reg(reg2);
            let value = state.load(address)?;
            state.write_reg(reg1, value);
        }

        (Operation::Store, Instruction::R { reg1, reg2, .. }) => {
            let address = state.read_reg(reg2);
            let value = state.read_reg(reg1);
            state.store(address, value)?;
        }

        // ========== Compare ==========
        (Operation::CompareEq, Instruction::R { reg1, .. }) => {
            let result = state.read_reg(reg1) == state.read_reg(cmp);
            state.write_reg(cmp, result as u32);
        }

        (Operation::CompareGt, Instruction::R { reg1, .. }) => {
            let result = state.read_reg(reg1) > state.read_reg(cmp);
            state.write_reg(cmp, result as u32);
        }

        // ========== Branch ==========
        (Operation::BranchEq, Instruction::I { reg, imm, .. }) => {
            let taken = state.read_reg(reg) == state.read_reg(cmp);
            branch(state, taken, imm, fetch_pc)?;
        }

        (Operation::BranchNe, Instruction::I { reg, imm, .. }) => {
            let taken = state.read_reg(reg) != state.read_reg(cmp);
            branch(state, taken, imm, fetch_pc)?;
        }

        (Operation::BranchGt, Instruction::I { reg, imm, .. }) => {
            let taken = state.read_reg(reg) > state.read_reg(cmp);
            branch(state, taken, imm, fetch_pc)?;
        }

        // ========== Jump ==========
        (Operation::Jump, Instruction::J { target, .. }) => {
            state.set_pc(target);
        }

        (Operation::JumpAndLink, Instruction::J { target, .. }) => {
            if let Some(link) = arch.link_register {
                let return_pc = state.pc();
                state.write_reg(link, return_pc);
            }
            state.set_pc(target);
        }

        (Operation::JumpRegister, Instruction::R { reg1, .. }) => {
            let target = state.read_reg(reg1);
            state.set_pc(target);
        }

        // Table entry and decoded format disagree
        _ => return unknown(instr, policy, fetch_pc),
    }

    Ok(())
}

/// Taken branches land at `fetch_pc + 1 + offset`; PC already points past the branch
fn branch(state: &mut MachineState, taken: bool, imm: Immediate, fetch_pc: u32) -> Result<()> {
    if !taken {
        return Ok(());
    }
    let offset = imm.signed();
    let target = state.pc() as i64 + offset as i64;
    if target < 0 || target > u32::MAX as i64 {
        return Err(RuntimeError::BranchOutOfRange {
            pc: fetch_pc,
            offset,
        });
    }
    state.set_pc(target as u32);
    Ok(())
}

fn unknown(instr: &Instruction, policy: UnknownPolicy, fetch_pc: u32) -> Result<()> {
    match policy {
        UnknownPolicy::Fault => Err(RuntimeError::UnknownInstruction {
            pc: fetch_pc,
            opcode: instr.opcode(),
            funct: instr.funct(),
        }),
        UnknownPolicy::Ignore => {
            warn!(
                pc = fetch_pc,
                opcode = instr.opcode(),
                funct = ?instr.funct(),
                "ignoring unknown instruction"
            );
            Ok(())
        }
    }
}
