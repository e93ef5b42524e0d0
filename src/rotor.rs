//! Rotor: a wired permutation with rotational state.
//!
//! Three variants share one interface:
//!
//! - **Reflector**: leftmost slot, pinned at position 0, never advances.
//! - **Fixed**: non-rotating rotor, position chosen at setup only.
//! - **Moving**: advances during a run and carries notches that drive the
//!   rotor to its left.
//!
//! The wiring lives behind an [`Arc`] so a [`Rotor`] cloned out of a catalog
//! shares the immutable permutation and owns its own position.

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;

/// Variant-specific rotor behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Pinned at position 0; no return leg in the machine's backward pass.
    Reflector,
    /// Never advances once placed.
    Fixed,
    /// Advances; `notches` are the positions at which the rotor to the
    /// left is driven.
    Moving {
        /// Notch positions as alphabet indices.
        notches: Vec<usize>,
    },
}

/// A rotor: name, wiring, variant, position (`setting`) and ring offset.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    wiring: Arc<Permutation>,
    kind: RotorKind,
    setting: usize,
    ring: usize,
}

impl Rotor {
    fn build(name: &str, wiring: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name: name.to_string(),
            wiring: Arc::new(wiring),
            kind,
            setting: 0,
            ring: 0,
        }
    }

    /// Creates a reflector named `name` wired by `wiring`.
    pub fn reflector(name: &str, wiring: Permutation) -> Self {
        Self::build(name, wiring, RotorKind::Reflector)
    }

    /// Creates a non-rotating rotor named `name` wired by `wiring`.
    pub fn fixed(name: &str, wiring: Permutation) -> Self {
        Self::build(name, wiring, RotorKind::Fixed)
    }

    /// Creates a rotating rotor with notches at each symbol of `notches`.
    ///
    /// # Parameters
    /// - `name`: Catalog name, used by settings lines.
    /// - `wiring`: Permutation applied at position 0 with ring 0.
    /// - `notches`: Positions, as symbols, at which the rotor to the left is
    ///   driven. May be empty.
    ///
    /// # Errors
    /// Returns [`EnigmaError::SymbolNotFound`] if a notch symbol is not in
    /// the wiring's alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation, Rotor};
    ///
    /// let alpha = Arc::new(Alphabet::default());
    /// let wiring = Permutation::new(
    ///     "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)",
    ///     alpha,
    /// )
    /// .unwrap();
    /// let mut rotor = Rotor::moving("I", wiring, "Q").unwrap();
    /// assert_eq!(rotor.convert_forward(0), 4);
    ///
    /// rotor.set('Q').unwrap();
    /// assert!(rotor.at_notch());
    /// ```
    pub fn moving(name: &str, wiring: Permutation, notches: &str) -> Result<Self> {
        let notches = notches
            .chars()
            .map(|ch| wiring.alphabet().to_int(ch))
            .collect::<Result<Vec<usize>>>()?;
        Ok(Self::build(name, wiring, RotorKind::Moving { notches }))
    }

    /// Returns the rotor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rotor's variant.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns the wiring permutation.
    pub fn wiring(&self) -> &Permutation {
        &self.wiring
    }

    /// Returns the alphabet the wiring is built against.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.wiring.alphabet()
    }

    /// Returns the size of the rotor's alphabet.
    pub fn size(&self) -> usize {
        self.wiring.size()
    }

    /// True only for moving rotors.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// True only for reflectors.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// True iff this is a moving rotor positioned at one of its notches.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&self.setting),
            _ => false,
        }
    }

    /// Returns the current position as an alphabet index.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Sets the position to index `posn`.
    ///
    /// # Parameters
    /// - `posn`: New position (0..size).
    ///
    /// # Errors
    /// - [`EnigmaError::IndexOutOfRange`] if `posn` is not a valid index.
    /// - [`EnigmaError::Config`] if a reflector is asked for a position
    ///   other than 0.
    pub fn set_index(&mut self, posn: usize) -> Result<()> {
        if posn >= self.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: posn,
                size: self.size(),
            });
        }
        if self.reflecting() && posn != 0 {
            return Err(EnigmaError::config(format!(
                "reflector {} has only one position",
                self.name
            )));
        }
        self.setting = posn;
        Ok(())
    }

    /// Sets the position to the alphabet index of `cposn`.
    ///
    /// # Errors
    /// [`EnigmaError::SymbolNotFound`] if `cposn` is not in the alphabet,
    /// otherwise as [`set_index`](Self::set_index).
    pub fn set(&mut self, cposn: char) -> Result<()> {
        let posn = self.alphabet().to_int(cposn)?;
        self.set_index(posn)
    }

    /// Returns the ring offset as an alphabet index.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Sets the ring offset to the alphabet index of `cring`.
    ///
    /// The ring turns the wiring against the lettered ring, so conversion
    /// uses `setting - ring` while notches still follow `setting`.
    ///
    /// # Errors
    /// - [`EnigmaError::SymbolNotFound`] if `cring` is not in the alphabet.
    /// - [`EnigmaError::Config`] if a reflector is given a non-zero ring.
    pub fn set_ring(&mut self, cring: char) -> Result<()> {
        let ring = self.alphabet().to_int(cring)?;
        if self.reflecting() && ring != 0 {
            return Err(EnigmaError::config(format!(
                "reflector {} has no ring setting",
                self.name
            )));
        }
        self.ring = ring;
        Ok(())
    }

    /// Returns the rotor to position 0 and ring 0.
    pub(crate) fn reset(&mut self) {
        self.setting = 0;
        self.ring = 0;
    }

    /// Advances a moving rotor by one position. No-op for reflectors and
    /// fixed rotors.
    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    /// Offset applied around the wiring: position corrected by ring.
    fn shift(&self) -> isize {
        self.setting as isize - self.ring as isize
    }

    /// Converts index `p` entering from the right, through the wiring.
    ///
    /// # Parameters
    /// - `p`: Contact index (0..size) on the right-hand side.
    ///
    /// # Returns
    /// The contact index on the left-hand side, corrected for position and
    /// ring.
    pub fn convert_forward(&self, p: usize) -> usize {
        let shift = self.shift();
        let out = self.wiring.permute(p as isize + shift);
        self.wiring.wrap(out as isize - shift)
    }

    /// Converts index `e` entering from the left, through the inverse wiring.
    pub fn convert_backward(&self, e: usize) -> usize {
        let shift = self.shift();
        let out = self.wiring.invert(e as isize + shift);
        self.wiring.wrap(out as isize - shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::UPPER;

    const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const REFLECTOR_B: &str = "(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)";

    fn wiring(cycles: &str) -> Permutation {
        Permutation::new(cycles, Arc::new(Alphabet::default())).unwrap()
    }

    fn idx(ch: char) -> usize {
        UPPER.find(ch).unwrap()
    }

    #[test]
    fn test_capabilities() {
        let r = Rotor::reflector("B", wiring(REFLECTOR_B));
        assert!(r.reflecting());
        assert!(!r.rotates());
        assert!(!r.at_notch());

        let f = Rotor::fixed("Beta", wiring("(ALBEVFCYODJWUGNMQTZSKPR) (HIX)"));
        assert!(!f.reflecting());
        assert!(!f.rotates());

        let m = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        assert!(m.rotates());
        assert!(!m.reflecting());
        assert_eq!(m.name(), "I");
    }

    #[test]
    fn test_rotor_i_forward_at_a() {
        let rotor = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        assert_eq!(rotor.convert_forward(idx('A')), idx('E'));
        assert_eq!(rotor.convert_forward(idx('B')), idx('K'));
        assert_eq!(rotor.convert_forward(idx('Z')), idx('J'));
        assert_eq!(rotor.convert_backward(idx('E')), idx('A'));
    }

    #[test]
    fn test_forward_with_setting() {
        let mut rotor = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        rotor.set('B').unwrap();
        // Contact A meets wiring B -> K, shifted back by one: J.
        assert_eq!(rotor.convert_forward(idx('A')), idx('J'));
        assert_eq!(rotor.convert_backward(idx('J')), idx('A'));
    }

    #[test]
    fn test_ring_offsets_wiring() {
        let mut rotor = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        rotor.set_ring('B').unwrap();
        // Ring B at position A: contact A meets wiring Z -> J, shifted: K.
        assert_eq!(rotor.convert_forward(idx('A')), idx('K'));
        assert_eq!(rotor.ring(), 1);
        assert_eq!(rotor.setting(), 0);
    }

    #[test]
    fn test_advance_wraps() {
        let mut rotor = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        rotor.set('Z').unwrap();
        rotor.advance();
        assert_eq!(rotor.setting(), 0);
    }

    #[test]
    fn test_advance_single_symbol_alphabet() {
        // The smallest alphabet that can be built: one position, always at
        // the notch.
        let alpha = Arc::new(Alphabet::new("X").unwrap());
        let mut rotor = Rotor::moving("X", Permutation::identity(alpha), "X").unwrap();
        rotor.advance();
        assert_eq!(rotor.setting(), 0);
        assert!(rotor.at_notch());
        assert_eq!(rotor.convert_forward(0), 0);
    }

    #[test]
    fn test_non_moving_never_advance() {
        let mut f = Rotor::fixed("Beta", wiring("(ALBEVFCYODJWUGNMQTZSKPR) (HIX)"));
        f.set('C').unwrap();
        f.advance();
        assert_eq!(f.setting(), 2);

        let mut r = Rotor::reflector("B", wiring(REFLECTOR_B));
        r.advance();
        assert_eq!(r.setting(), 0);
    }

    #[test]
    fn test_at_notch() {
        let mut rotor = Rotor::moving("VI", wiring(ROTOR_I), "ZM").unwrap();
        rotor.set('M').unwrap();
        assert!(rotor.at_notch());
        rotor.set('Z').unwrap();
        assert!(rotor.at_notch());
        rotor.set('A').unwrap();
        assert!(!rotor.at_notch());
    }

    #[test]
    fn test_reflector_pinned_at_zero() {
        let mut r = Rotor::reflector("B", wiring(REFLECTOR_B));
        assert!(r.set('A').is_ok());
        assert!(matches!(r.set('C'), Err(EnigmaError::Config(_))));
        assert!(matches!(r.set_ring('C'), Err(EnigmaError::Config(_))));
        assert_eq!(r.setting(), 0);
    }

    #[test]
    fn test_set_invalid_symbol() {
        let mut rotor = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        assert_eq!(rotor.set('a'), Err(EnigmaError::SymbolNotFound('a')));
        assert_eq!(
            rotor.set_index(26),
            Err(EnigmaError::IndexOutOfRange { index: 26, size: 26 })
        );
    }

    #[test]
    fn test_invalid_notch() {
        assert_eq!(
            Rotor::moving("I", wiring(ROTOR_I), "Q1").err(),
            Some(EnigmaError::SymbolNotFound('1'))
        );
    }

    #[test]
    fn test_clone_shares_wiring_not_position() {
        let original = Rotor::moving("I", wiring(ROTOR_I), "Q").unwrap();
        let mut copy = original.clone();
        copy.set('K').unwrap();
        assert_eq!(original.setting(), 0);
        assert_eq!(copy.setting(), 10);
        assert!(Arc::ptr_eq(&original.wiring, &copy.wiring));
    }
}
