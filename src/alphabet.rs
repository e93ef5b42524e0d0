//! Alphabet: ordered, duplicate-free symbol set.
//!
//! Every other engine unit works on alphabet indices; the alphabet is the
//! only place where symbols and indices are translated into each other.

use std::fmt;

use crate::error::{EnigmaError, Result};

/// The 26 upper-case Latin letters, the default machine alphabet.
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered set of distinct symbols. The K-th symbol has index K.
///
/// Immutable once built. Permutations, rotors and machines share it
/// through an [`Arc`](std::sync::Arc).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet {
            symbols: UPPER.chars().collect(),
        }
    }
}

impl Alphabet {
    /// Creates an alphabet from the characters of `chars`, in order.
    ///
    /// # Parameters
    /// - `chars`: The symbols, index 0 first. Must be non-empty.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if `chars` is empty or a character
    /// appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Alphabet;
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// assert_eq!(alpha.size(), 4);
    /// assert!(Alphabet::new("ABCA").is_err());
    /// assert!(Alphabet::new("").is_err());
    /// ```
    pub fn new(chars: &str) -> Result<Self> {
        if chars.is_empty() {
            return Err(EnigmaError::config("alphabet must not be empty"));
        }
        let mut symbols: Vec<char> = Vec::with_capacity(chars.len());
        for ch in chars.chars() {
            if symbols.contains(&ch) {
                return Err(EnigmaError::config(format!(
                    "duplicate symbol '{}' in alphabet",
                    ch
                )));
            }
            symbols.push(ch);
        }
        Ok(Alphabet { symbols })
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if `ch` is in this alphabet.
    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(&ch)
    }

    /// Returns the symbol at `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] unless `index < size()`.
    pub fn to_char(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Returns the index of `ch`. Inverse of [`to_char`](Self::to_char).
    ///
    /// # Errors
    /// Returns [`EnigmaError::SymbolNotFound`] if `ch` is absent.
    pub fn to_int(&self, ch: char) -> Result<usize> {
        self.symbols
            .iter()
            .position(|&c| c == ch)
            .ok_or(EnigmaError::SymbolNotFound(ch))
    }

    /// Iterates over the symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.symbols {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}
