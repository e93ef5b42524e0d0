//! Machine description and settings-line parsing.
//!
//! A machine description lists the alphabet, the slot and pawl counts and
//! the rotor catalog:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//! I     MQ  (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta  N   (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B     R   (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
//! ```
//!
//! Rotor types: `M<notches>` moving, `N` fixed, `R` reflector. Line breaks
//! carry no meaning; tokens are whitespace separated.
//!
//! A settings line picks rotors, positions, optional ring settings and the
//! plugboard:
//!
//! ```text
//! * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)
//! * B Beta III IV I AXLE AAAB (HQ) (EX)
//! ```

use std::iter::Peekable;
use std::str::SplitWhitespace;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Characters reserved by the description and settings grammars.
const RESERVED: [char; 3] = ['(', ')', '*'];

/// A parsed machine description.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    num_pawls: usize,
    rotors: Vec<Rotor>,
}

impl MachineConfig {
    /// Parses a machine description.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] on a truncated or malformed
    /// description, and [`EnigmaError::SymbolNotFound`] if a wiring or notch
    /// uses a symbol outside the alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::MachineConfig;
    ///
    /// let config = MachineConfig::parse(
    ///     "ABCD 2 1\n\
    ///      R1 R (AC) (BD)\n\
    ///      M1 MA (ABCD)\n",
    /// )
    /// .unwrap();
    /// assert_eq!(config.num_rotors(), 2);
    /// assert_eq!(config.rotors().len(), 2);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace().peekable();

        let alpha_token = tokens
            .next()
            .ok_or_else(|| EnigmaError::config("configuration file truncated"))?;
        if alpha_token.contains(&RESERVED[..]) {
            return Err(EnigmaError::config(format!(
                "invalid alphabet \"{}\"",
                alpha_token
            )));
        }
        let alphabet = Arc::new(Alphabet::new(alpha_token)?);

        let num_rotors = next_count(&mut tokens, "rotor slot count")?;
        let num_pawls = next_count(&mut tokens, "pawl count")?;
        if num_rotors == 0 || num_pawls >= num_rotors {
            return Err(EnigmaError::config(format!(
                "{} rotor slots with {} pawls is not a valid machine",
                num_rotors, num_pawls
            )));
        }

        let mut rotors: Vec<Rotor> = Vec::new();
        while tokens.peek().is_some() {
            let rotor = read_rotor(&mut tokens, &alphabet)?;
            if rotors.iter().any(|r| r.name() == rotor.name()) {
                warn!(name = rotor.name(), "duplicate rotor name, first entry wins");
            }
            rotors.push(rotor);
        }

        debug!(
            alphabet = %alphabet,
            num_rotors,
            num_pawls,
            catalog = rotors.len(),
            "configuration read"
        );
        Ok(MachineConfig {
            alphabet,
            num_rotors,
            num_pawls,
            rotors,
        })
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls.
    pub fn num_pawls(&self) -> usize {
        self.num_pawls
    }

    /// Returns the rotor catalog, in description order.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    /// Builds a fresh machine from this description. No rotor is inserted.
    ///
    /// # Errors
    /// As [`Machine::new`].
    pub fn build(&self) -> Result<Machine> {
        Machine::new(
            self.alphabet.clone(),
            self.num_rotors,
            self.num_pawls,
            self.rotors.clone(),
        )
    }
}

fn next_count(tokens: &mut Peekable<SplitWhitespace<'_>>, what: &str) -> Result<usize> {
    let token = tokens
        .next()
        .ok_or_else(|| EnigmaError::config("configuration file truncated"))?;
    token
        .parse()
        .map_err(|_| EnigmaError::config(format!("expected {}, found \"{}\"", what, token)))
}

/// Reads one `<name> <type> <cycle>*` rotor description.
fn read_rotor(
    tokens: &mut Peekable<SplitWhitespace<'_>>,
    alphabet: &Arc<Alphabet>,
) -> Result<Rotor> {
    let name = tokens
        .next()
        .ok_or_else(|| EnigmaError::config("bad rotor description"))?;
    if name.contains(&RESERVED[..]) {
        return Err(EnigmaError::config(format!(
            "bad rotor description: invalid rotor name \"{}\"",
            name
        )));
    }
    let kind = tokens.next().ok_or_else(|| {
        EnigmaError::config(format!("bad rotor description: {} has no type", name))
    })?;

    let mut cycles = Vec::new();
    while let Some(token) = tokens.next_if(|t| t.starts_with('(')) {
        cycles.push(token);
    }
    let wiring = Permutation::new(&cycles.join(" "), alphabet.clone())?;

    let mut kind_chars = kind.chars();
    match (kind_chars.next(), kind_chars.as_str()) {
        (Some('M'), notches) => Rotor::moving(name, wiring, notches),
        (Some('N'), "") => Ok(Rotor::fixed(name, wiring)),
        (Some('R'), "") => Ok(Rotor::reflector(name, wiring)),
        _ => Err(EnigmaError::config(format!(
            "bad rotor description: {} has invalid type \"{}\"",
            name, kind
        ))),
    }
}

/// A parsed settings line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    rotors: Vec<String>,
    setting: String,
    rings: Option<String>,
    plugboard: String,
}

impl Settings {
    /// Parses a settings line for a machine with `num_rotors` slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the line does not start with `*`,
    /// names fewer than `num_rotors` rotors, or lacks the position string.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Settings;
    ///
    /// let settings = Settings::parse("* B Beta III IV I AXLE (HQ) (EX)", 5).unwrap();
    /// assert_eq!(settings.rotors(), ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(settings.setting(), "AXLE");
    /// assert_eq!(settings.rings(), None);
    /// assert_eq!(settings.plugboard(), "(HQ) (EX)");
    /// ```
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some("*") {
            return Err(EnigmaError::config(format!(
                "invalid settings line \"{}\"",
                line
            )));
        }

        let rotors: Vec<String> = tokens
            .by_ref()
            .take(num_rotors)
            .map(str::to_string)
            .collect();
        if rotors.len() != num_rotors || rotors.iter().any(|r| r.starts_with('(')) {
            return Err(EnigmaError::config(format!(
                "settings line must name {} rotors: \"{}\"",
                num_rotors, line
            )));
        }

        let setting = tokens
            .next_if(|t| !t.starts_with('('))
            .ok_or_else(|| {
                EnigmaError::config(format!("settings line has no rotor setting: \"{}\"", line))
            })?
            .to_string();
        let rings = tokens.next_if(|t| !t.starts_with('(')).map(str::to_string);
        let plugboard = tokens.collect::<Vec<_>>().join(" ");

        Ok(Settings {
            rotors,
            setting,
            rings,
            plugboard,
        })
    }

    /// Rotor names, reflector first.
    pub fn rotors(&self) -> &[String] {
        &self.rotors
    }

    /// Initial positions, one symbol per non-reflector slot.
    pub fn setting(&self) -> &str {
        &self.setting
    }

    /// Ring settings, if given.
    pub fn rings(&self) -> Option<&str> {
        self.rings.as_deref()
    }

    /// Plugboard cycles.
    pub fn plugboard(&self) -> &str {
        &self.plugboard
    }

    /// Configures `machine`: inserts the rotors, sets positions and rings and
    /// replaces the plugboard.
    ///
    /// The steps run on a copy of `machine`, which replaces it only once all
    /// of them succeed. A failed line leaves rotors, positions, rings and
    /// plugboard exactly as they were.
    ///
    /// # Parameters
    /// - `machine`: A machine built from the description these settings
    ///   were parsed for.
    ///
    /// # Errors
    /// Any error of [`Machine::insert_rotors`], [`Machine::set_rotors`],
    /// [`Machine::set_rings`] or of parsing the plugboard cycles.
    pub fn apply(&self, machine: &mut Machine) -> Result<()> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet().clone())?;
        let mut staged = machine.clone();
        staged.insert_rotors(&self.rotors[..])?;
        staged.set_rotors(&self.setting)?;
        if let Some(rings) = &self.rings {
            staged.set_rings(rings)?;
        }
        staged.set_plugboard(plugboard);
        *machine = staged;
        Ok(())
    }
}
