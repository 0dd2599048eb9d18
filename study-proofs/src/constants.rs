//! Crate-wide constants: eligibility thresholds, hash domain tags, and the
//! Poseidon sponge configuration shared by all commitment computations.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;

/// Minimum number of enrolled patients for a study to be eligible.
pub const MIN_PATIENT_COUNT: u64 = 50;

/// Maximum scaled p-value. P-values are carried as integers scaled by 1000,
/// so 50 means p <= 0.050. Callers MUST preserve this scaling.
pub const MAX_P_VALUE_SCALED: u64 = 50;

/// Minimum size of the control group.
pub const MIN_CONTROL_COUNT: u64 = 20;

/// Minimum data-quality score on the 0-100 scale.
pub const MIN_DATA_QUALITY: u64 = 80;

/// Scale factor used by the integer rate comparisons below.
pub const PCT_SCALE: u128 = 100;

/// The cross-multiplied improvement must be at least this many percent of the
/// control's scaled success rate.
pub const MIN_RELATIVE_IMPROVEMENT_PCT: u128 = 10;

/// Adverse events may not exceed this many percent of the patient population.
pub const MAX_ADVERSE_EVENT_PCT: u128 = 10;

/// Zero-pad an ASCII tag to the fixed 32-byte domain-separator width.
///
/// Indexing past 32 bytes fails at compile time, so tags cannot silently
/// truncate.
const fn domain_tag(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Domain separator for hospital identity commitments.
pub const HOSPITAL_COMMITMENT_DOMAIN: [u8; 32] = domain_tag(b"study-proofs.hospital.commitment");

/// Domain separator for study data commitments.
pub const DATA_COMMITMENT_DOMAIN: [u8; 32] = domain_tag(b"study-proofs.data.commitment");

/// Domain separator for the proof identifier hash.
pub const PROOF_HASH_DOMAIN: [u8; 32] = domain_tag(b"study-proofs.proof.id");

// Poseidon sponge configuration.
//
// Width-3 sponge (rate=2, capacity=1) over BN254::Fr. Round counts follow the
// widely used width-3 instantiation; all three commitment hashes share this
// one configuration and differ only in their domain tag.
pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;
pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Poseidon S-box exponent (alpha).
pub const POSEIDON_ALPHA: u64 = 5;

/// Deterministically derive the Poseidon parameters for BN254::Fr.
///
/// Every party recomputing a commitment must end up with the same constants,
/// so the ARK and MDS matrices come from arkworks' deterministic derivation
/// rather than from local randomness.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let prime_bits = Fr::MODULUS_BIT_SIZE as u64;

    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        prime_bits,
        POSEIDON_RATE,
        POSEIDON_FULL_ROUNDS as u64,
        POSEIDON_PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(
        POSEIDON_FULL_ROUNDS,
        POSEIDON_PARTIAL_ROUNDS,
        POSEIDON_ALPHA,
        mds,
        ark,
        POSEIDON_RATE,
        POSEIDON_CAPACITY,
    )
}
