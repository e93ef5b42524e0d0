//! Machine: rotor slots, plugboard and the per-symbol stepping protocol.
//!
//! Slot 0 holds the reflector, the last slot holds the fast rotor. Each
//! conversion first advances the rotors, then threads the symbol through
//! plugboard, rotors right to left, reflector, rotors left to right and the
//! plugboard again.
//!
//! Rotors are cloned out of the catalog when inserted, so every machine owns
//! its rotor positions and only shares the immutable wiring.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace, Level};

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// A complete rotor machine.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    num_pawls: usize,
    catalog: Vec<Rotor>,
    slots: Vec<Rotor>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots, of which the rightmost
    /// `num_pawls` are rotating, choosing rotors from `all_rotors`.
    ///
    /// The plugboard starts as the identity. No rotor is inserted yet.
    ///
    /// # Parameters
    /// - `alphabet`: Alphabet shared by every rotor and the plugboard.
    /// - `num_rotors`: Slot count, reflector included (at least 1).
    /// - `num_pawls`: Rotating slots, counted from the right (`< num_rotors`).
    /// - `all_rotors`: Catalog that settings pick rotors from by name.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if `num_rotors` is 0, if
    /// `num_pawls >= num_rotors`, or if a catalog rotor was built against a
    /// different alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Machine, Permutation, Rotor};
    ///
    /// let alpha = Arc::new(Alphabet::default());
    /// let wiring = |c: &str| Permutation::new(c, alpha.clone()).unwrap();
    /// let catalog = vec![
    ///     Rotor::reflector("B", wiring("(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)")),
    ///     Rotor::moving("I", wiring("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"), "Q").unwrap(),
    ///     Rotor::moving("II", wiring("(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)"), "E").unwrap(),
    ///     Rotor::moving("III", wiring("(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)"), "V").unwrap(),
    /// ];
    ///
    /// let mut machine = Machine::new(alpha.clone(), 4, 3, catalog).unwrap();
    /// machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
    /// machine.set_rotors("AAA").unwrap();
    /// assert_eq!(machine.convert_message("AAAAA").unwrap(), "BDZGO");
    /// ```
    pub fn new(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        num_pawls: usize,
        all_rotors: Vec<Rotor>,
    ) -> Result<Self> {
        if num_rotors == 0 {
            return Err(EnigmaError::config("a machine needs at least one rotor slot"));
        }
        if num_pawls >= num_rotors {
            return Err(EnigmaError::config(format!(
                "{} pawls do not fit {} rotor slots",
                num_pawls, num_rotors
            )));
        }
        if let Some(rotor) = all_rotors.iter().find(|r| **r.alphabet() != *alphabet) {
            return Err(EnigmaError::config(format!(
                "rotor {} is wired over a different alphabet",
                rotor.name()
            )));
        }

        Ok(Machine {
            plugboard: Permutation::identity(alphabet.clone()),
            alphabet,
            num_rotors,
            num_pawls,
            catalog: all_rotors,
            slots: Vec::with_capacity(num_rotors),
        })
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls, i.e. of rotating slots.
    pub fn num_pawls(&self) -> usize {
        self.num_pawls
    }

    /// Returns the machine's alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the rotors available for insertion.
    pub fn catalog(&self) -> &[Rotor] {
        &self.catalog
    }

    /// Returns the rotor in slot `k` (0 is the reflector), if inserted.
    pub fn rotor(&self, k: usize) -> Option<&Rotor> {
        self.slots.get(k)
    }

    /// Fills the slots with the catalog rotors named `rotors`, left to right;
    /// `rotors[0]` names the reflector. Inserted rotors start at position 0
    /// with ring 0. Lookup is by name, first catalog match wins.
    ///
    /// On error the current slots are left untouched.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the name count differs from
    /// [`num_rotors`](Self::num_rotors), a name is unknown or repeated, or
    /// the placement is illegal: slot 0 must be a reflector, the rightmost
    /// [`num_pawls`](Self::num_pawls) slots must hold moving rotors and the
    /// slots between must hold fixed rotors.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, rotors: &[S]) -> Result<()> {
        if rotors.len() != self.num_rotors {
            return Err(EnigmaError::config(format!(
                "invalid rotors: expected {} rotor names, got {}",
                self.num_rotors,
                rotors.len()
            )));
        }

        let first_moving = self.num_rotors - self.num_pawls;
        let mut seen = HashSet::with_capacity(rotors.len());
        let mut slots = Vec::with_capacity(self.num_rotors);

        for (slot, name) in rotors.iter().enumerate() {
            let name: &str = name.as_ref();
            if !seen.insert(name) {
                return Err(EnigmaError::config(format!(
                    "rotor {} is listed more than once",
                    name
                )));
            }
            let mut rotor = self
                .catalog
                .iter()
                .find(|r| r.name() == name)
                .cloned()
                .ok_or_else(|| EnigmaError::config(format!("unknown rotor {}", name)))?;

            if slot == 0 {
                if !rotor.reflecting() {
                    return Err(EnigmaError::config(format!(
                        "first rotor should be a reflector, {} is not",
                        name
                    )));
                }
            } else if rotor.reflecting() {
                return Err(EnigmaError::config(format!(
                    "reflector {} in slot {}",
                    name, slot
                )));
            } else if slot >= first_moving && !rotor.rotates() {
                return Err(EnigmaError::config(format!(
                    "slot {} needs a moving rotor, {} does not rotate",
                    slot, name
                )));
            } else if slot < first_moving && rotor.rotates() {
                return Err(EnigmaError::config(format!(
                    "moving rotor {} in wrong place (slot {})",
                    name, slot
                )));
            }

            rotor.reset();
            slots.push(rotor);
        }

        self.slots = slots;
        debug!(rotors = %self.rotor_names(), "rotors inserted");
        Ok(())
    }

    /// Sets the positions of slots `1..num_rotors` from `setting`, one symbol
    /// per slot, leftmost first.
    ///
    /// # Errors
    /// - [`EnigmaError::Config`] if no rotors are inserted or `setting` does
    ///   not have `num_rotors - 1` symbols.
    /// - [`EnigmaError::SymbolNotFound`] if a symbol is outside the alphabet.
    pub fn set_rotors(&mut self, setting: &str) -> Result<()> {
        let positions = self.slot_indices(setting, "setting")?;
        for (rotor, posn) in self.slots.iter_mut().skip(1).zip(positions) {
            rotor.set_index(posn)?;
        }
        debug!(window = %self.window(), "rotors set");
        Ok(())
    }

    /// Sets the ring offsets of slots `1..num_rotors` from `rings`, with the
    /// same shape as [`set_rotors`](Self::set_rotors).
    ///
    /// # Parameters
    /// - `rings`: One symbol per non-reflector slot, leftmost first. The
    ///   symbol at index 0 means no offset.
    ///
    /// # Errors
    /// Same as [`set_rotors`](Self::set_rotors).
    pub fn set_rings(&mut self, rings: &str) -> Result<()> {
        self.slot_indices(rings, "ring setting")?;
        for (rotor, ring) in self.slots.iter_mut().skip(1).zip(rings.chars()) {
            rotor.set_ring(ring)?;
        }
        debug!(rings, "rings set");
        Ok(())
    }

    /// Validates a per-slot symbol string and returns its indices.
    fn slot_indices(&self, symbols: &str, what: &str) -> Result<Vec<usize>> {
        if self.slots.is_empty() {
            return Err(EnigmaError::config("rotors have not been inserted"));
        }
        let count = symbols.chars().count();
        if count != self.num_rotors - 1 {
            return Err(EnigmaError::config(format!(
                "incorrect {} length: expected {} symbols, got {}",
                what,
                self.num_rotors - 1,
                count
            )));
        }
        symbols.chars().map(|ch| self.alphabet.to_int(ch)).collect()
    }

    /// Returns the current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Replaces the plugboard.
    pub fn set_plugboard(&mut self, plugboard: Permutation) {
        debug!(plugboard = %plugboard, "plugboard set");
        self.plugboard = plugboard;
    }

    /// Returns the positions of slots `1..num_rotors` as symbols, the way
    /// they read through the machine's windows.
    pub fn window(&self) -> String {
        self.slots
            .iter()
            .skip(1)
            .filter_map(|r| self.alphabet.to_char(r.setting()).ok())
            .collect()
    }

    fn rotor_names(&self) -> String {
        self.slots
            .iter()
            .map(Rotor::name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Advances the machine, then converts index `c`.
    ///
    /// # Parameters
    /// - `c`: Index (0..alphabet size) of the pressed key.
    ///
    /// # Returns
    /// Index of the lit lamp.
    ///
    /// # Errors
    /// - [`EnigmaError::Config`] if no rotors are inserted.
    /// - [`EnigmaError::IndexOutOfRange`] if `c` is not a valid index.
    pub fn convert(&mut self, c: usize) -> Result<usize> {
        if self.slots.is_empty() {
            return Err(EnigmaError::config("rotors have not been inserted"));
        }
        if c >= self.alphabet.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: c,
                size: self.alphabet.size(),
            });
        }

        self.advance_rotors();
        let plugged = self.plugboard.permute(c as isize);
        let through = self.apply_rotors(plugged);
        let out = self.plugboard.permute(through as isize);

        if tracing::enabled!(Level::TRACE) {
            let symbol = |i: usize| self.alphabet.to_char(i).unwrap_or('?');
            trace!(
                window = %self.window(),
                input = %symbol(c),
                plugged = %symbol(plugged),
                rotors = %symbol(through),
                output = %symbol(out),
                "converted"
            );
        }
        Ok(out)
    }

    /// Converts every symbol of `msg` in order. Rotor state carries over
    /// from previous calls and into the next one.
    ///
    /// The whole message is checked against the alphabet before any rotor
    /// moves.
    ///
    /// # Errors
    /// - [`EnigmaError::SymbolNotFound`] if `msg` holds a symbol outside the
    ///   alphabet.
    /// - [`EnigmaError::Config`] if no rotors are inserted.
    pub fn convert_message(&mut self, msg: &str) -> Result<String> {
        let indices = msg
            .chars()
            .map(|ch| self.alphabet.to_int(ch))
            .collect::<Result<Vec<usize>>>()?;

        let mut converted = String::with_capacity(msg.len());
        for c in indices {
            let out = self.convert(c)?;
            converted.push(self.alphabet.to_char(out)?);
        }
        Ok(converted)
    }

    /// Steps the rotors for one keypress.
    ///
    /// Which slots step is decided from the notch state before any rotor
    /// moves; the advances are applied afterwards. The fast rotor always
    /// steps. A rotating slot steps when its right neighbor sits at a notch,
    /// and drags that neighbor along, which yields the double step of the
    /// middle rotor.
    fn advance_rotors(&mut self) {
        let n = self.slots.len();
        let mut advance = vec![false; n];
        for i in 0..n {
            if i == n - 1 {
                advance[i] = true;
            } else if self.slots[i].rotates() && self.slots[i + 1].at_notch() {
                advance[i] = true;
                advance[i + 1] = true;
            }
        }
        for (rotor, step) in self.slots.iter_mut().zip(advance) {
            if step {
                rotor.advance();
            }
        }
    }

    /// Passes index `c` right to left through every slot, then left to right
    /// through every slot but the reflector.
    fn apply_rotors(&self, c: usize) -> usize {
        let reflected = self
            .slots
            .iter()
            .rev()
            .fold(c, |p, rotor| rotor.convert_forward(p));
        self.slots
            .iter()
            .skip(1)
            .fold(reflected, |e, rotor| rotor.convert_backward(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UKW_B: &str = "(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)";
    const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const ROTOR_II: &str = "(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)";
    const ROTOR_III: &str = "(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)";
    const BETA: &str = "(ALBEVFCYODJWUGNMQTZSKPR) (HIX)";

    fn catalog(alpha: &Arc<Alphabet>) -> Vec<Rotor> {
        let wiring = |c: &str| Permutation::new(c, alpha.clone()).unwrap();
        vec![
            Rotor::reflector("B", wiring(UKW_B)),
            Rotor::fixed("Beta", wiring(BETA)),
            Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap(),
            Rotor::moving("II", wiring(ROTOR_II), "E").unwrap(),
            Rotor::moving("III", wiring(ROTOR_III), "V").unwrap(),
        ]
    }

    fn three_rotor_machine() -> Machine {
        let alpha = Arc::new(Alphabet::default());
        let mut machine = Machine::new(alpha.clone(), 4, 3, catalog(&alpha)).unwrap();
        machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        machine.set_rotors("AAA").unwrap();
        machine
    }

    #[test]
    fn test_construction_checks() {
        let alpha = Arc::new(Alphabet::default());
        assert!(Machine::new(alpha.clone(), 0, 0, vec![]).is_err());
        assert!(Machine::new(alpha.clone(), 3, 3, vec![]).is_err());

        let other = Arc::new(Alphabet::new("ABCD").unwrap());
        let foreign = Rotor::fixed("X", Permutation::identity(other));
        assert!(matches!(
            Machine::new(alpha, 3, 1, vec![foreign]),
            Err(EnigmaError::Config(_))
        ));
    }

    #[test]
    fn test_known_message() {
        let mut machine = three_rotor_machine();
        assert_eq!(machine.convert_message("AAAAA").unwrap(), "BDZGO");
        assert_eq!(machine.window(), "AAF");
    }

    #[test]
    fn test_reciprocity() {
        let mut machine = three_rotor_machine();
        let cipher = machine.convert_message("HELLOWORLD").unwrap();
        machine.set_rotors("AAA").unwrap();
        assert_eq!(machine.convert_message(&cipher).unwrap(), "HELLOWORLD");
    }

    #[test]
    fn test_state_carries_across_calls() {
        let mut machine = three_rotor_machine();
        let whole = machine.convert_message("ABCDEF").unwrap();
        machine.set_rotors("AAA").unwrap();
        let first = machine.convert_message("ABC").unwrap();
        let second = machine.convert_message("DEF").unwrap();
        assert_eq!(format!("{}{}", first, second), whole);
    }

    #[test]
    fn test_double_step() {
        let mut machine = three_rotor_machine();
        machine.set_rotors("ADU").unwrap();
        let mut windows = vec![machine.window()];
        for _ in 0..3 {
            machine.convert(0).unwrap();
            windows.push(machine.window());
        }
        assert_eq!(windows, ["ADU", "ADV", "AEW", "BFX"]);
    }

    #[test]
    fn test_insert_wrong_count() {
        let mut machine = three_rotor_machine();
        let err = machine.insert_rotors(&["B", "I", "II"]).unwrap_err();
        assert!(matches!(err, EnigmaError::Config(_)));
        assert_eq!(machine.rotor(3).map(Rotor::name), Some("III"));
    }

    #[test]
    fn test_insert_unknown_or_repeated() {
        let mut machine = three_rotor_machine();
        assert!(machine.insert_rotors(&["B", "I", "II", "IX"]).is_err());
        assert!(machine.insert_rotors(&["B", "I", "I", "III"]).is_err());
    }

    #[test]
    fn test_placement_legality() {
        let alpha = Arc::new(Alphabet::default());
        let mut machine = Machine::new(alpha.clone(), 5, 3, catalog(&alpha)).unwrap();
        // Reflector first.
        assert!(machine.insert_rotors(&["Beta", "B", "I", "II", "III"]).is_err());
        // Moving rotor left of the rotating block.
        assert!(machine.insert_rotors(&["B", "I", "Beta", "II", "III"]).is_err());
        // Fixed rotor inside the rotating block.
        assert!(machine.insert_rotors(&["B", "I", "II", "Beta", "III"]).is_err());
        // Reflector in a rotor slot.
        assert!(machine.insert_rotors(&["B", "B", "I", "II", "III"]).is_err());
        assert!(machine.insert_rotors(&["B", "Beta", "I", "II", "III"]).is_ok());
    }

    #[test]
    fn test_set_rotors_checks() {
        let mut machine = three_rotor_machine();
        assert!(matches!(machine.set_rotors("AA"), Err(EnigmaError::Config(_))));
        assert_eq!(
            machine.set_rotors("AA1"),
            Err(EnigmaError::SymbolNotFound('1'))
        );
        machine.set_rotors("XYZ").unwrap();
        assert_eq!(machine.window(), "XYZ");
    }

    #[test]
    fn test_convert_before_setup() {
        let alpha = Arc::new(Alphabet::default());
        let mut machine = Machine::new(alpha.clone(), 4, 3, catalog(&alpha)).unwrap();
        assert!(matches!(machine.convert(0), Err(EnigmaError::Config(_))));
        assert!(matches!(machine.set_rotors("AAA"), Err(EnigmaError::Config(_))));
    }

    #[test]
    fn test_convert_index_out_of_range() {
        let mut machine = three_rotor_machine();
        assert_eq!(
            machine.convert(26),
            Err(EnigmaError::IndexOutOfRange { index: 26, size: 26 })
        );
        assert_eq!(machine.window(), "AAA");
    }

    #[test]
    fn test_bad_symbol_leaves_state() {
        let mut machine = three_rotor_machine();
        assert_eq!(
            machine.convert_message("ABc"),
            Err(EnigmaError::SymbolNotFound('c'))
        );
        assert_eq!(machine.window(), "AAA");
    }

    #[test]
    fn test_ring_settings() {
        let mut machine = three_rotor_machine();
        machine.set_rings("BBB").unwrap();
        assert_eq!(machine.convert_message("AAAAA").unwrap(), "EWTYX");
    }

    #[test]
    fn test_catalog_untouched_by_runs() {
        let mut machine = three_rotor_machine();
        machine.convert_message("ABCDEFGHIJ").unwrap();
        assert!(machine.catalog().iter().all(|r| r.setting() == 0));
        assert_eq!(machine.rotor(3).unwrap().setting(), 10);
    }

    #[test]
    fn test_plugboard_applied_both_ways() {
        let mut plain = three_rotor_machine();
        let mut plugged = three_rotor_machine();
        let alpha = plugged.alphabet().clone();
        plugged.set_plugboard(Permutation::new("(AB)", alpha).unwrap());

        // With A<->B swapped, converting B matches converting A unplugged,
        // and the output is swapped back if it is A or B.
        let expected = plain.convert(0).unwrap();
        let expected = match expected {
            0 => 1,
            1 => 0,
            other => other,
        };
        assert_eq!(plugged.convert(1).unwrap(), expected);
    }
}
