//! Text rendering of machine snapshots
//!
//! The renderer keeps the last rendered copy of every memory section so it
//! can highlight cells that changed since the previous render. That cache
//! lives here, not in the engine; resetting the simulator does not clear it.

use sim256_runtime::{Observer, Snapshot};
use std::collections::HashMap;
use std::fmt::{self, Write};

const HEAD: &str = "\x1b[1;4;33m";
const MARK: &str = "\x1b[34;1;4m";
const LIT: &str = "\x1b[31m";
const DARK: &str = "\x1b[30m";
const RESET: &str = "\x1b[m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How a memory section is laid out
#[derive(Debug, Clone, Copy)]
struct Section {
    name: &'static str,
    value_bits: u8,
    /// One value per row, each labelled with its index
    label_all: bool,
    /// Hide rows whose cells are all zero
    skip_zero_rows: bool,
    highlight: Option<usize>,
}

pub struct TextRenderer {
    /// Last rendered copy of each section, keyed by section name
    previous: HashMap<&'static str, Vec<u32>>,
    columns: usize,
    color: bool,
    /// Clear the terminal before each observed snapshot
    clear_on_observe: bool,
}

impl TextRenderer {
    pub fn new(columns: usize, color: bool) -> Self {
        Self {
            previous: HashMap::new(),
            columns,
            color,
            clear_on_observe: false,
        }
    }

    pub fn with_clear_on_observe(mut self, clear: bool) -> Self {
        self.clear_on_observe = clear;
        self
    }

    /// Drop the change-highlight cache
    pub fn forget(&mut self) {
        self.previous.clear();
    }

    pub fn render(&mut self, snap: &Snapshot<'_>) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.render_into(&mut out, snap);
        out
    }

    fn render_into(&mut self, out: &mut String, snap: &Snapshot<'_>) -> fmt::Result {
        let arch = snap.arch;

        self.head(out, "PC")?;
        writeln!(out, "{} (cycle {})", snap.pc, snap.cycles)?;

        self.memory(
            out,
            snap.instructions,
            Section {
                name: "IMEM",
                value_bits: arch.word_bits,
                label_all: false,
                skip_zero_rows: false,
                highlight: Some(snap.pc as usize),
            },
        )?;
        self.memory(
            out,
            snap.registers,
            Section {
                name: "Regfile",
                value_bits: arch.register_bits,
                label_all: true,
                skip_zero_rows: false,
                highlight: None,
            },
        )?;
        self.memory(
            out,
            snap.data_memory,
            Section {
                name: "DMEM",
                value_bits: arch.register_bits,
                label_all: false,
                skip_zero_rows: true,
                highlight: None,
            },
        )?;
        self.buttons(out, snap.buttons)?;
        self.matrix(out, snap.matrix)
    }

    fn head(&self, out: &mut String, name: &str) -> fmt::Result {
        if self.color {
            writeln!(out, "{HEAD}{name}{RESET}")
        } else {
            writeln!(out, "== {name} ==")
        }
    }

    fn memory(&mut self, out: &mut String, values: &[u32], section: Section) -> fmt::Result {
        self.head(out, section.name)?;

        let addr_width = hex_width(values.len().saturating_sub(1));
        let value_width = (section.value_bits as usize + 3) / 4;
        let row_len = if section.label_all {
            1
        } else {
            (self.columns.saturating_sub(4) / (value_width + 1)).max(1)
        };

        let previous = self
            .previous
            .get(section.name)
            .filter(|prev| prev.len() == values.len())
            .map(Vec::as_slice)
            .unwrap_or(values);

        let mut shown = 0;
        for (row, chunk) in values.chunks(row_len).enumerate() {
            let offset = row * row_len;
            if section.skip_zero_rows && chunk.iter().all(|&v| v == 0) {
                continue;
            }
            shown += 1;

            write!(out, "{:0aw$x}:", offset, aw = addr_width)?;
            for (i, &value) in chunk.iter().enumerate() {
                let address = offset + i;
                let marked = value != previous[address] || section.highlight == Some(address);
                out.push(' ');
                self.cell(out, value, value_width, marked)?;
            }
            out.push('\n');
        }
        if shown == 0 && !values.is_empty() {
            writeln!(out, "(all zero)")?;
        }

        self.previous.insert(section.name, values.to_vec());
        Ok(())
    }

    fn cell(&self, out: &mut String, value: u32, width: usize, marked: bool) -> fmt::Result {
        match (marked, self.color) {
            (false, _) => write!(out, "{:0w$x}", value, w = width),
            (true, true) => write!(out, "{MARK}{:0w$x}{RESET}", value, w = width),
            (true, false) => write!(out, "[{:0w$x}]", value, w = width),
        }
    }

    fn buttons(&self, out: &mut String, buttons: &[u8]) -> fmt::Result {
        self.head(out, "Input")?;
        let n = buttons.len();
        writeln!(out, "┌─{}┐", "┬─".repeat(n.saturating_sub(1)))?;
        let cells: Vec<String> = buttons.iter().map(|b| b.to_string()).collect();
        writeln!(out, "│{}│", cells.join("│"))?;
        writeln!(out, "└─{}┘", "┴─".repeat(n.saturating_sub(1)))
    }

    fn matrix(&self, out: &mut String, matrix: &[Vec<u32>]) -> fmt::Result {
        self.head(out, "Output")?;
        for row in matrix {
            for &cell in row {
                match (cell != 0, self.color) {
                    (true, true) => write!(out, "{LIT}█{RESET}")?,
                    (false, true) => write!(out, "{DARK}█{RESET}")?,
                    (true, false) => out.push('#'),
                    (false, false) => out.push('.'),
                }
            }
            out.push('\n');
        }
        Ok(())
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(80, true)
    }
}

impl Observer for TextRenderer {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        let text = self.render(snapshot);
        if self.clear_on_observe && self.color {
            print!("{CLEAR_SCREEN}");
        }
        print!("{text}");
    }
}

/// Hex digits needed to print `value`
fn hex_width(value: usize) -> usize {
    let mut width = 1;
    let mut rest = value >> 4;
    while rest > 0 {
        width += 1;
        rest >>= 4;
    }
    width
}
