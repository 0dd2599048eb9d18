//! Validation and commitment engine for the Privacy-Preserving Clinical Study Ledger.
//!
//! This crate contains:
//! - The eligibility rule set applied to a hospital's private study statistics.
//! - Poseidon-based commitments binding those statistics without revealing them.
//! - The ledger state machine: study records keyed by study id plus two counters.
//!
//! Everything here is pure and synchronous. Persistence and transport live in the
//! backend, which replays the same operations against SQLite.

pub mod commitment;
pub mod constants;
pub mod ledger;
pub mod types;
pub mod validate;
