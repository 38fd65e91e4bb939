//! sim256 command-line simulator

mod render;
mod repl;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use render::TextRenderer;
use sim256_runtime::{SimConfig, Simulator, UnknownPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sim256")]
#[command(about = "Simulator for the sim256 teaching CPUs", long_about = None)]
struct Args {
    /// Hex program to load at startup
    program: Option<PathBuf>,

    /// ISA variant (s20 or applepi)
    #[arg(long, default_value = "s20")]
    arch: String,

    /// Seed for rand instructions
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on run-until after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Treat unknown instructions as no-ops instead of stopping
    #[arg(long, action = ArgAction::SetTrue)]
    ignore_unknown: bool,

    /// Run this many cycles without the REPL and print the final state
    #[arg(long)]
    steps: Option<u64>,

    /// Write the final state as a bincode snapshot (with --steps)
    #[arg(long, requires = "steps")]
    dump_state: Option<PathBuf>,

    /// Plain output without ANSI colors
    #[arg(long, action = ArgAction::SetTrue)]
    no_color: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let arch = sim256_spec::arch_by_name(&args.arch)?;
    let config = SimConfig {
        unknown_instruction: if args.ignore_unknown {
            UnknownPolicy::Ignore
        } else {
            UnknownPolicy::Fault
        },
        max_run_cycles: args.max_cycles,
        seed: args.seed,
    };
    let mut sim = Simulator::new(arch, config)?;
    info!(%arch, "simulator ready");

    if let Some(path) = &args.program {
        sim.load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }

    let mut renderer = TextRenderer::new(80, !args.no_color).with_clear_on_observe(true);

    match args.steps {
        Some(steps) => batch(&mut sim, &mut renderer, steps, args.dump_state.as_deref()),
        None => repl::repl(&mut sim, &mut renderer),
    }
}

/// Run a fixed number of cycles, print the final state, optionally save it
fn batch(
    sim: &mut Simulator,
    renderer: &mut TextRenderer,
    steps: u64,
    dump: Option<&Path>,
) -> Result<()> {
    if sim.program_path().is_none() {
        bail!("--steps needs a PROGRAM to run");
    }

    let run = sim.step_n(steps);
    print!("{}", renderer.render(&sim.snapshot()));

    if let Some(path) = dump {
        let bytes = sim.snapshot().to_state().to_bytes()?;
        fs::write(path, bytes)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "wrote snapshot");
    }

    run.with_context(|| format!("run stopped after {} cycles", sim.cycles()))
}
