//! Enigma rotor cipher machine simulator.
//!
//! Simulates an electromechanical rotor machine over a configurable
//! alphabet: a stack of wired rotors with notch-driven stepping, a reflector
//! and a plugboard. The resulting substitution is reciprocal, so the same
//! machine in the same initial state both encrypts and decrypts.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbol <-> index table, shared by everything below)
//!     ↓
//! Permutation  (cycle-notation bijection; plugboard and rotor wirings)
//!     ↓
//! Rotor        (wiring + position + ring; Reflector / Fixed / Moving)
//!     ↓ slots 0..N, reflector leftmost, fast rotor rightmost
//! Machine      (stepping with double step + plugboard → rotors → reflector → rotors → plugboard)
//!
//! MachineConfig / Settings / Session   (text front end: descriptions, settings lines, messages)
//! ```
//!
//! # Examples
//!
//! Encrypt with an M4-style machine and decrypt by resetting it:
//!
//! ```
//! use enigma::{MachineConfig, Settings};
//!
//! let config = MachineConfig::parse(
//!     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 5 3 \
//!      I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S) \
//!      III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N) \
//!      IV MJ (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU) \
//!      Beta N (ALBEVFCYODJWUGNMQTZSKPR) (HIX) \
//!      B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)",
//! )
//! .unwrap();
//! let settings = Settings::parse("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)", 5).unwrap();
//!
//! let mut machine = config.build().unwrap();
//! settings.apply(&mut machine).unwrap();
//! let cipher = machine.convert_message("FROMHISSHOULDERHIAWATHA").unwrap();
//! assert_eq!(cipher, "QVPQSOKOILPUBKJZPISFXDW");
//!
//! settings.apply(&mut machine).unwrap();
//! assert_eq!(machine.convert_message(&cipher).unwrap(), "FROMHISSHOULDERHIAWATHA");
//! ```
//!
//! Per-symbol conversions are reported as `tracing` events at `TRACE`
//! level; setup steps at `DEBUG`.

#![deny(clippy::all)]

pub mod error;

mod alphabet;
mod config;
mod machine;
mod permutation;
mod rotor;
mod session;

pub use alphabet::{Alphabet, UPPER};
pub use config::{MachineConfig, Settings};
pub use error::{EnigmaError, Result};
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};
pub use session::{group_symbols, Session, GROUP_WIDTH};
