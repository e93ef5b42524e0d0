//! Permutation: a bijection over an alphabet written in cycle notation.
//!
//! A permutation is given as disjoint cycles such as `"(AELTPHQXRU) (BKNW)"`.
//! Each symbol maps to the next one in its cycle, the last wrapping to the
//! first. Symbols in no cycle, and cycles of length one, are fixed points.
//!
//! Forward and inverse lookup tables are built once at construction, so
//! [`permute`](Permutation::permute) and [`invert`](Permutation::invert) are
//! O(1) and pure.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};

/// A permutation of the indices `0..alphabet.size()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    cycles: Vec<Vec<usize>>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Parses `cycles`, a string of the form `"(cccc) (cc) ..."` whose
    /// characters belong to `alphabet`. Whitespace between cycles is
    /// ignored; adjacent cycles need no separator.
    ///
    /// # Errors
    /// - [`EnigmaError::SymbolNotFound`] if a cycle holds a symbol outside
    ///   the alphabet.
    /// - [`EnigmaError::Config`] on unbalanced parentheses, stray characters
    ///   outside a cycle, or a symbol listed in more than one place.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
    /// let perm = Permutation::new("(ABCD)", alpha).unwrap();
    /// assert_eq!(perm.permute_char('A').unwrap(), 'B');
    /// assert_eq!(perm.permute_char('D').unwrap(), 'A');
    /// assert_eq!(perm.invert_char('B').unwrap(), 'A');
    /// assert!(perm.derangement());
    /// ```
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self> {
        let mut parsed: Vec<String> = Vec::new();
        let mut current: Option<String> = None;

        for ch in cycles.chars() {
            match ch {
                '(' => {
                    if current.is_some() {
                        return Err(EnigmaError::config(format!(
                            "nested '(' in cycles \"{}\"",
                            cycles
                        )));
                    }
                    current = Some(String::new());
                }
                ')' => match current.take() {
                    Some(cycle) => parsed.push(cycle),
                    None => {
                        return Err(EnigmaError::config(format!(
                            "unbalanced ')' in cycles \"{}\"",
                            cycles
                        )))
                    }
                },
                c if c.is_whitespace() => {
                    if current.is_some() {
                        return Err(EnigmaError::config(format!(
                            "whitespace inside a cycle in \"{}\"",
                            cycles
                        )));
                    }
                }
                c => match current.as_mut() {
                    Some(cycle) => cycle.push(c),
                    None => {
                        return Err(EnigmaError::config(format!(
                            "symbol '{}' outside of a cycle in \"{}\"",
                            c, cycles
                        )))
                    }
                },
            }
        }
        if current.is_some() {
            return Err(EnigmaError::config(format!(
                "unclosed '(' in cycles \"{}\"",
                cycles
            )));
        }

        Self::from_cycles(&parsed, alphabet)
    }

    /// Builds a permutation from already-split cycles, one string per cycle.
    ///
    /// Empty cycles are ignored.
    ///
    /// # Errors
    /// Same symbol and disjointness checks as [`new`](Self::new).
    pub fn from_cycles<S: AsRef<str>>(cycles: &[S], alphabet: Arc<Alphabet>) -> Result<Self> {
        let size = alphabet.size();
        let mut seen = vec![false; size];
        let mut index_cycles: Vec<Vec<usize>> = Vec::with_capacity(cycles.len());

        for cycle in cycles {
            let mut indices = Vec::new();
            for ch in cycle.as_ref().chars() {
                let index = alphabet.to_int(ch)?;
                if seen[index] {
                    return Err(EnigmaError::config(format!(
                        "symbol '{}' appears in more than one place in the cycles",
                        ch
                    )));
                }
                seen[index] = true;
                indices.push(index);
            }
            if !indices.is_empty() {
                index_cycles.push(indices);
            }
        }

        let mut forward: Vec<usize> = (0..size).collect();
        let mut inverse: Vec<usize> = (0..size).collect();
        for cycle in &index_cycles {
            let len = cycle.len();
            for (pos, &from) in cycle.iter().enumerate() {
                let to = cycle[(pos + 1) % len];
                forward[from] = to;
                inverse[to] = from;
            }
        }

        Ok(Permutation {
            alphabet,
            cycles: index_cycles,
            forward,
            inverse,
        })
    }

    /// Returns the identity permutation over `alphabet`.
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let size = alphabet.size();
        Permutation {
            alphabet,
            cycles: Vec::new(),
            forward: (0..size).collect(),
            inverse: (0..size).collect(),
        }
    }

    /// Returns the size of the alphabet this permutation acts on.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns `p` reduced into `0..size()` with floored modulo, so negative
    /// values wrap from the top.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let perm = Permutation::identity(Arc::new(Alphabet::default()));
    /// assert_eq!(perm.wrap(-1), 25);
    /// assert_eq!(perm.wrap(27), 1);
    /// ```
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    /// Returns the image of `wrap(p)` under this permutation.
    ///
    /// # Parameters
    /// - `p`: Any index; reduced with [`wrap`](Self::wrap) first.
    ///
    /// # Returns
    /// An index in `0..size()`. Fixed points return `wrap(p)` itself.
    pub fn permute(&self, p: isize) -> usize {
        let index = self.wrap(p);
        self.forward.get(index).copied().unwrap_or(index)
    }

    /// Returns the preimage of `wrap(c)` under this permutation.
    pub fn invert(&self, c: isize) -> usize {
        let index = self.wrap(c);
        self.inverse.get(index).copied().unwrap_or(index)
    }

    /// Symbol form of [`permute`](Self::permute).
    ///
    /// # Errors
    /// Returns [`EnigmaError::SymbolNotFound`] if `p` is not in the alphabet.
    pub fn permute_char(&self, p: char) -> Result<char> {
        let index = self.alphabet.to_int(p)?;
        self.alphabet.to_char(self.forward[index])
    }

    /// Symbol form of [`invert`](Self::invert).
    ///
    /// # Errors
    /// Returns [`EnigmaError::SymbolNotFound`] if `c` is not in the alphabet.
    pub fn invert_char(&self, c: char) -> Result<char> {
        let index = self.alphabet.to_int(c)?;
        self.alphabet.to_char(self.inverse[index])
    }

    /// Returns the alphabet this permutation was built against.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns true iff no index maps to itself.
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &to)| i != to)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, cycle) in self.cycles.iter().enumerate() {
            if n > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for &index in cycle {
                // Indices were validated against the alphabet at construction.
                if let Ok(ch) = self.alphabet.to_char(index) {
                    write!(f, "{}", ch)?;
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
