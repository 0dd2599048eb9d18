//! Domain-separated Poseidon commitments over BN254 field elements.
//!
//! Three fixed-arity vector hashes are derived here:
//! - the hospital commitment (identity + secret key + study id),
//! - the data commitment (the seven private statistics),
//! - the proof hash (the public submission identifier).
//!
//! Each hash absorbs its 32-byte domain tag first, so values committed for
//! one purpose can never collide with values committed for another.

use crate::constants::{
    poseidon_config, DATA_COMMITMENT_DOMAIN, HOSPITAL_COMMITMENT_DOMAIN, PROOF_HASH_DOMAIN,
};
use crate::types::{Bytes32, StudyWitness};
use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonSponge;
use ark_crypto_primitives::sponge::CryptographicSponge;
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;

/// Map a 32-byte value into the field from fixed-width big-endian bytes.
///
/// Reduction modulo the field order is deterministic, which is all the
/// commitment scheme needs; the raw bytes are never recovered from the
/// field element.
pub fn fr_from_bytes(bytes: &Bytes32) -> Fr {
    Fr::from_be_bytes_mod_order(&bytes.0)
}

/// Map an unsigned integer to its exact field-element representation.
pub fn fr_from_u64(value: u64) -> Fr {
    Fr::from(value)
}

fn fr_to_bytes32(x: &Fr) -> Bytes32 {
    let mut out = [0u8; 32];
    x.serialize_compressed(&mut out[..])
        .expect("in-memory serialization");
    Bytes32(out)
}

/// Hash a fixed-arity list of field elements under a domain tag.
///
/// The tag is absorbed before the elements, then one element is squeezed
/// and serialized in arkworks' canonical compressed form. All parties
/// recomputing a commitment must agree on this byte layout.
pub fn vector_hash(domain: &[u8; 32], elems: &[Fr]) -> Bytes32 {
    let cfg = poseidon_config();
    let mut sponge = PoseidonSponge::<Fr>::new(&cfg);

    sponge.absorb(&Fr::from_be_bytes_mod_order(domain));
    sponge.absorb(&elems.to_vec());

    fr_to_bytes32(&sponge.squeeze_field_elements(1)[0])
}

/// Commitment binding hospital identity, its secret key, and the study id.
///
/// Publishing this value reveals nothing about the key; the hospital can
/// later prove authorship by reproducing the preimage.
pub fn hospital_commitment(
    hospital_id: &Bytes32,
    hospital_secret_key: &Bytes32,
    study_id: &Bytes32,
) -> Bytes32 {
    vector_hash(
        &HOSPITAL_COMMITMENT_DOMAIN,
        &[
            fr_from_bytes(hospital_id),
            fr_from_bytes(hospital_secret_key),
            fr_from_bytes(study_id),
        ],
    )
}

/// Commitment binding all seven private statistical inputs.
pub fn data_commitment(witness: &StudyWitness) -> Bytes32 {
    vector_hash(
        &DATA_COMMITMENT_DOMAIN,
        &[
            fr_from_u64(witness.patient_count),
            fr_from_u64(witness.treatment_success),
            fr_from_u64(witness.control_success),
            fr_from_u64(witness.control_count),
            fr_from_u64(witness.p_value_scaled),
            fr_from_u64(witness.adverse_events),
            fr_from_u64(witness.data_quality),
        ],
    )
}

/// Public identifier of one submission event.
///
/// Derived from both commitments plus the caller-visible metadata, under its
/// own domain, so a proof hash can never be mistaken for a commitment.
pub fn proof_hash(
    study_id: &Bytes32,
    hospital_id: &Bytes32,
    data_commitment: &Bytes32,
    hospital_commitment: &Bytes32,
    privacy_level: u8,
    timestamp: u64,
) -> Bytes32 {
    vector_hash(
        &PROOF_HASH_DOMAIN,
        &[
            fr_from_bytes(study_id),
            fr_from_bytes(hospital_id),
            fr_from_bytes(data_commitment),
            fr_from_bytes(hospital_commitment),
            fr_from_u64(privacy_level as u64),
            fr_from_u64(timestamp),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn rand_bytes32(rng: &mut ChaCha20Rng) -> Bytes32 {
        let mut out = [0u8; 32];
        rng.fill(&mut out[..]);
        Bytes32(out)
    }

    fn witness(rng: &mut ChaCha20Rng) -> StudyWitness {
        StudyWitness {
            hospital_secret_key: rand_bytes32(rng),
            patient_count: rng.gen_range(50..10_000),
            treatment_success: rng.gen_range(0..5_000),
            control_success: rng.gen_range(0..5_000),
            control_count: rng.gen_range(20..10_000),
            p_value_scaled: rng.gen_range(0..=50),
            adverse_events: rng.gen_range(0..100),
            data_quality: rng.gen_range(80..=100),
        }
    }

    #[test]
    fn commitments_are_deterministic() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let study_id = rand_bytes32(&mut rng);
        let hospital_id = rand_bytes32(&mut rng);
        let w = witness(&mut rng);

        let hc1 = hospital_commitment(&hospital_id, &w.hospital_secret_key, &study_id);
        let hc2 = hospital_commitment(&hospital_id, &w.hospital_secret_key, &study_id);
        assert_eq!(hc1, hc2);

        let dc1 = data_commitment(&w);
        let dc2 = data_commitment(&w);
        assert_eq!(dc1, dc2);

        let ph1 = proof_hash(&study_id, &hospital_id, &dc1, &hc1, 3, 42);
        let ph2 = proof_hash(&study_id, &hospital_id, &dc2, &hc2, 3, 42);
        assert_eq!(ph1, ph2);
    }

    #[test]
    fn hospital_commitment_depends_on_every_input() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let study_id = rand_bytes32(&mut rng);
        let hospital_id = rand_bytes32(&mut rng);
        let key = rand_bytes32(&mut rng);

        let base = hospital_commitment(&hospital_id, &key, &study_id);

        let mut other_key = key;
        other_key.0[7] ^= 0x01;
        assert_ne!(base, hospital_commitment(&hospital_id, &other_key, &study_id));

        let mut other_hospital = hospital_id;
        other_hospital.0[0] ^= 0x01;
        assert_ne!(base, hospital_commitment(&other_hospital, &key, &study_id));

        let mut other_study = study_id;
        other_study.0[31] ^= 0x80;
        assert_ne!(base, hospital_commitment(&hospital_id, &key, &other_study));
    }

    #[test]
    fn data_commitment_depends_on_every_statistic() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let w = witness(&mut rng);
        let base = data_commitment(&w);

        let tweaks: [fn(&mut StudyWitness); 7] = [
            |w| w.patient_count += 1,
            |w| w.treatment_success += 1,
            |w| w.control_success += 1,
            |w| w.control_count += 1,
            |w| w.p_value_scaled += 1,
            |w| w.adverse_events += 1,
            |w| w.data_quality += 1,
        ];

        for tweak in tweaks {
            let mut changed = w.clone();
            tweak(&mut changed);
            assert_ne!(base, data_commitment(&changed));
        }
    }

    #[test]
    fn proof_hash_depends_on_metadata() {
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let study_id = rand_bytes32(&mut rng);
        let hospital_id = rand_bytes32(&mut rng);
        let dc = rand_bytes32(&mut rng);
        let hc = rand_bytes32(&mut rng);

        let base = proof_hash(&study_id, &hospital_id, &dc, &hc, 1, 0);
        assert_ne!(base, proof_hash(&study_id, &hospital_id, &dc, &hc, 2, 0));
        assert_ne!(base, proof_hash(&study_id, &hospital_id, &dc, &hc, 1, 1));
    }

    #[test]
    fn domain_tags_separate_hash_purposes() {
        let elems = [fr_from_u64(1), fr_from_u64(2), fr_from_u64(3)];
        let a = vector_hash(&HOSPITAL_COMMITMENT_DOMAIN, &elems);
        let b = vector_hash(&DATA_COMMITMENT_DOMAIN, &elems);
        let c = vector_hash(&PROOF_HASH_DOMAIN, &elems);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
