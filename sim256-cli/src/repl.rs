//! Interactive command loop
//!
//! Commands are matched on their first letter, case-insensitively. An empty
//! line steps once.

use crate::render::TextRenderer;
use anyhow::{bail, Context, Result};
use sim256_runtime::{Simulator, WatchConfig};
use std::io::{BufRead, Write};
use tracing::debug;

/// Cycles run by `w` when no count is given
pub const DEFAULT_WATCH_CYCLES: u64 = 1000;

pub const PROMPT: &str =
    "\x1b[1;32mCommand\x1b[0;32m (H)elp | (L)oad | (B)uttons | (S)tep | (W)atch | R(u)n until | (R)eset | (D)isassemble | (Q)uit\x1b[1;32m:\x1b[m ";

pub const HELP: &str = "
Commands:
    (H)elp        -- Print this help message.
    (L)oad [file] -- Load machine code (whitespace-separated hex words) into
                     instruction memory and reset. Without a file name the
                     last loaded file is reloaded, or you are prompted for one.
    (B)uttons [bits]
                  -- Set the button latches, one 0 or 1 per button
                     (e.g. \"b 0010\" presses just the third button).
    (S)tep [n]    -- Execute one instruction, or n instructions.
                     An empty line also steps once.
    (W)atch [n]   -- Execute n instructions (default 1000), redrawing the
                     state every 100 cycles.
    R(u)n until <pc>
                  -- Execute at least one instruction, then continue until PC
                     reaches <pc> (decimal or 0x-prefixed hex).
    (R)eset       -- Clear all CPU state except instruction memory.
    (D)isassemble -- List the loaded program.
    (Q)uit        -- Exit the simulator.

    Commands are case insensitive.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Load(Option<String>),
    Buttons(Option<String>),
    Step(u64),
    Watch(u64),
    Until(u32),
    Reset,
    Disassemble,
    Quit,
}

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Print the machine state
    Render,
    /// Go straight back to the prompt
    Prompt,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Command::Step(1));
    };
    let arg = parts.next();
    if let Some(extra) = parts.next() {
        bail!("unexpected argument {extra:?}");
    }

    let first = word.chars().next().map(|c| c.to_ascii_lowercase());
    Ok(match first {
        Some('h') => Command::Help,
        Some('l') => Command::Load(arg.map(str::to_string)),
        Some('b') => Command::Buttons(arg.map(str::to_string)),
        Some('s') => Command::Step(parse_count(arg, 1)?),
        Some('w') => Command::Watch(parse_count(arg, DEFAULT_WATCH_CYCLES)?),
        Some('u') => {
            let pc = arg.context("run until needs a PC (e.g. \"u 12\")")?;
            Command::Until(parse_number(pc)?)
        }
        Some('r') => Command::Reset,
        Some('d') => Command::Disassemble,
        Some('q') => Command::Quit,
        _ => bail!("unknown command {word:?} (h for help)"),
    })
}

fn parse_count(arg: Option<&str>, default: u64) -> Result<u64> {
    match arg {
        Some(text) => text
            .parse()
            .with_context(|| format!("invalid count {text:?}")),
        None => Ok(default),
    }
}

/// Decimal, or hex with a 0x prefix
pub fn parse_number(text: &str) -> Result<u32> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid number {text:?}"))
}

/// Run one command against the simulator.
///
/// `ask` is used when a command needs input it was not given on the line.
/// Simulator errors are reported to stderr and do not end the session.
pub fn run_command(
    sim: &mut Simulator,
    renderer: &mut TextRenderer,
    command: Command,
    ask: &mut dyn FnMut(&str) -> Result<String>,
) -> Result<Outcome> {
    debug!(?command, "running command");
    let result = match command {
        Command::Help => {
            println!("{HELP}");
            return Ok(Outcome::Prompt);
        }
        Command::Quit => return Ok(Outcome::Quit),
        Command::Load(Some(path)) => sim.load_file(&path),
        Command::Load(None) => {
            if sim.program_path().is_some() {
                sim.reload().map(|_| ())
            } else {
                let path = ask("\x1b[1;32mBinary file:\x1b[m ")?;
                sim.load_file(path.trim())
            }
        }
        Command::Buttons(bits) => {
            let bits = match bits {
                Some(bits) => bits,
                None => ask(&format!(
                    "\x1b[1;32mNew state\x1b[0;32m ({} buttons; 0 or 1 each)\x1b[1;32m:\x1b[m ",
                    sim.arch().num_buttons
                ))?,
            };
            sim.change_buttons(bits.trim())
        }
        Command::Step(count) => sim.step_n(count),
        Command::Watch(count) => sim.watch(count, &WatchConfig::default(), renderer),
        Command::Until(pc) => sim.run_until(pc).map(|_| ()),
        Command::Reset => {
            sim.reset();
            Ok(())
        }
        Command::Disassemble => {
            print!("{}", sim.disassemble());
            return Ok(Outcome::Prompt);
        }
    };

    match result {
        Ok(()) => Ok(Outcome::Render),
        Err(err) if err.is_recoverable() => {
            eprintln!("\x1b[1;31mError:\x1b[m {err}");
            Ok(Outcome::Prompt)
        }
        Err(err) => {
            // Show where the run stopped
            eprintln!("\x1b[1;31mStopped:\x1b[m {err}");
            Ok(Outcome::Render)
        }
    }
}

/// Read-eval-print until `q` or end of input
pub fn repl(sim: &mut Simulator, renderer: &mut TextRenderer) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    print!("{}", renderer.render(&sim.snapshot()));
    loop {
        println!();
        let Some(text) = prompt(&mut input, &mut line, PROMPT)? else {
            break;
        };
        let command = match parse_command(&text) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("\x1b[1;31mError:\x1b[m {err:#}");
                continue;
            }
        };

        let mut ask = |question: &str| -> Result<String> {
            let mut answer = String::new();
            prompt(&mut input, &mut answer, question)?.context("unexpected end of input")
        };
        match run_command(sim, renderer, command, &mut ask)? {
            Outcome::Render => print!("{}", renderer.render(&sim.snapshot())),
            Outcome::Prompt => {}
            Outcome::Quit => break,
        }
    }
    Ok(())
}

/// Print `question` and read one line; `None` at end of input
fn prompt(input: &mut impl BufRead, line: &mut String, question: &str) -> Result<Option<String>> {
    print!("{question}");
    std::io::stdout().flush()?;
    line.clear();
    if input.read_line(line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
