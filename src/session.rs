//! Session: runs a configured machine over a stream of lines.
//!
//! Lines starting with `*` are settings lines and (re)configure the
//! machine. Every other line is a message: whitespace is dropped, the
//! symbols are converted and written back in groups of five.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{MachineConfig, Settings};
use crate::error::EnigmaError;
use crate::machine::Machine;

/// Symbols per output group.
pub const GROUP_WIDTH: usize = 5;

/// A machine plus the bookkeeping to drive it from text.
#[derive(Debug)]
pub struct Session {
    machine: Machine,
    configured: bool,
    messages: usize,
}

impl Session {
    /// Builds the session's machine from `config`.
    ///
    /// # Errors
    /// As [`MachineConfig::build`].
    pub fn new(config: &MachineConfig) -> Result<Self> {
        Ok(Session {
            machine: config.build()?,
            configured: false,
            messages: 0,
        })
    }

    /// Returns the machine being driven.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Processes every line of `input`, writing one output line per message
    /// line.
    ///
    /// # Errors
    /// Fails on I/O errors, on a message line before the first settings
    /// line, on an invalid settings line and on symbols outside the
    /// alphabet. Errors carry the 1-based line number.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{MachineConfig, Session};
    ///
    /// let config = MachineConfig::parse(
    ///     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 4 3 \
    ///      B R (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW) \
    ///      I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S) \
    ///      II ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q) \
    ///      III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)",
    /// )
    /// .unwrap();
    /// let mut session = Session::new(&config).unwrap();
    ///
    /// let mut output = Vec::new();
    /// session
    ///     .run("* B I II III AAA\nAAAAA AAAAA\n".as_bytes(), &mut output)
    ///     .unwrap();
    /// assert_eq!(String::from_utf8(output).unwrap(), "BDZGO WCXLT\n");
    /// ```
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for (n, line) in input.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read input line {}", n + 1))?;
            if let Some(converted) = self
                .process_line(&line)
                .with_context(|| format!("line {}", n + 1))?
            {
                writeln!(output, "{}", converted).context("failed to write output")?;
            }
        }
        output.flush().context("failed to flush output")?;
        info!(messages = self.messages, "session finished");
        Ok(())
    }

    /// Handles one input line; returns the text to print for message lines.
    fn process_line(&mut self, line: &str) -> std::result::Result<Option<String>, EnigmaError> {
        if line.trim_start().starts_with('*') {
            let settings = Settings::parse(line, self.machine.num_rotors())?;
            settings.apply(&mut self.machine)?;
            self.configured = true;
            debug!(settings = line.trim(), "machine configured");
            return Ok(None);
        }

        let msg: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if !self.configured {
            if msg.is_empty() {
                return Ok(None);
            }
            return Err(EnigmaError::config("input must start with a settings line"));
        }

        let converted = self.machine.convert_message(&msg)?;
        self.messages += 1;
        Ok(Some(group_symbols(&converted, GROUP_WIDTH)))
    }
}

/// Splits `msg` into groups of `width` symbols separated by single spaces.
/// The last group may be shorter. A `width` of 0 leaves `msg` unchanged.
///
/// # Parameters
/// - `msg`: Converted symbols, without whitespace.
/// - `width`: Symbols per group.
///
/// # Examples
///
/// ```
/// use enigma::group_symbols;
///
/// assert_eq!(group_symbols("QVPQSOKOILPUBKJ", 5), "QVPQS OKOIL PUBKJ");
/// assert_eq!(group_symbols("ABCDEFG", 5), "ABCDE FG");
/// ```
pub fn group_symbols(msg: &str, width: usize) -> String {
    if width == 0 {
        return msg.to_string();
    }
    let mut grouped = String::with_capacity(msg.len() + msg.len() / width);
    for (i, ch) in msg.chars().enumerate() {
        if i > 0 && i % width == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}
