//! Ledger state machine: proof records keyed by study id plus two counters.
//!
//! Every operation is transactional in the simplest sense: validation runs
//! before any mutation, so a rejected submission leaves the ledger exactly as
//! it was. The host environment is expected to serialize conflicting
//! operations; there is no interior locking here.

use crate::commitment::{data_commitment, hospital_commitment, proof_hash};
use crate::types::{Bytes32, ProofRecord, StudyWitness};
use crate::validate::{regulatory_compliant, validate_submission, ValidationError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid authorization")]
    InvalidAuthorization,

    #[error("Study not found")]
    StudyNotFound,
}

/// Assemble the public record for one submission.
///
/// Pure: validates the witnesses, derives both commitments and the proof
/// hash, and recomputes the regulatory predicates. `timestamp` is the
/// pre-increment study counter supplied by whichever substrate holds the
/// counters. The in-memory [`Ledger`] and the SQLite backend both go through
/// this function so their records are byte-identical for identical inputs.
pub fn build_proof_record(
    study_id: Bytes32,
    hospital_id: Bytes32,
    privacy_level: u8,
    witness: &StudyWitness,
    timestamp: u64,
) -> Result<ProofRecord, ValidationError> {
    validate_submission(witness)?;

    let data_commitment = data_commitment(witness);
    let hospital_commitment =
        hospital_commitment(&hospital_id, &witness.hospital_secret_key, &study_id);

    let proof_hash = proof_hash(
        &study_id,
        &hospital_id,
        &data_commitment,
        &hospital_commitment,
        privacy_level,
        timestamp,
    );

    // The regulatory flag is recomputed from its four predicates; the other
    // flags are fixed to true on every successful insert and carry no
    // information beyond "validation passed".
    Ok(ProofRecord {
        study_id,
        hospital_commitment,
        data_commitment,
        proof_hash,
        privacy_level,
        statistical_significance: true,
        minimum_sample_met: true,
        treatment_effective: true,
        regulatory_compliant: regulatory_compliant(witness),
        verified: true,
        timestamp,
    })
}

/// In-memory ledger state.
///
/// Counters are monotone: nothing ever decrements them, and records are never
/// deleted. Resubmitting a study id overwrites the old record wholesale.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    total_studies: u64,
    verified_hospitals: u64,
    records: HashMap<Bytes32, ProofRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a submission and, on success, record it.
    ///
    /// The record's `timestamp` is the study counter *before* the increment,
    /// so the first accepted study is stamped 0. Returns the proof hash.
    pub fn submit_medical_proof(
        &mut self,
        study_id: Bytes32,
        hospital_id: Bytes32,
        privacy_level: u8,
        witness: &StudyWitness,
    ) -> Result<Bytes32, LedgerError> {
        let record =
            build_proof_record(study_id, hospital_id, privacy_level, witness, self.total_studies)?;
        let proof_hash = record.proof_hash;

        self.records.insert(study_id, record);
        self.total_studies += 1;

        Ok(proof_hash)
    }

    /// Count a hospital authorization.
    ///
    /// The all-zero token is the "no proof" sentinel and is rejected. No
    /// per-hospital authorization state is kept; the id is accepted for
    /// interface compatibility only.
    pub fn authorize_hospital(
        &mut self,
        _hospital_id: Bytes32,
        authorization_proof: Bytes32,
    ) -> Result<(), LedgerError> {
        if authorization_proof.is_zero() {
            return Err(LedgerError::InvalidAuthorization);
        }

        self.verified_hospitals += 1;
        Ok(())
    }

    /// Whether the study exists and was verified. Absent studies read as
    /// unverified rather than failing.
    pub fn get_study_status(&self, study_id: &Bytes32) -> bool {
        self.records.get(study_id).map(|r| r.verified).unwrap_or(false)
    }

    /// Regulatory compliance of a recorded study. Unlike
    /// [`get_study_status`], an absent study is an error here.
    pub fn get_study_compliance(&self, study_id: &Bytes32) -> Result<bool, LedgerError> {
        self.records
            .get(study_id)
            .map(|r| r.regulatory_compliant)
            .ok_or(LedgerError::StudyNotFound)
    }

    pub fn get_record(&self, study_id: &Bytes32) -> Option<&ProofRecord> {
        self.records.get(study_id)
    }

    pub fn get_total_studies(&self) -> u64 {
        self.total_studies
    }

    pub fn get_verified_hospitals(&self) -> u64 {
        self.verified_hospitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;

    fn passing_witness() -> StudyWitness {
        StudyWitness {
            hospital_secret_key: Bytes32([9u8; 32]),
            patient_count: 500,
            treatment_success: 400,
            control_success: 300,
            control_count: 500,
            p_value_scaled: 20,
            adverse_events: 10,
            data_quality: 90,
        }
    }

    fn ids() -> (Bytes32, Bytes32) {
        (Bytes32([1u8; 32]), Bytes32([2u8; 32]))
    }

    #[test]
    fn successful_submission_records_and_counts() {
        let (study_id, hospital_id) = ids();
        let mut ledger = Ledger::new();

        let proof = ledger
            .submit_medical_proof(study_id, hospital_id, 2, &passing_witness())
            .unwrap();

        assert_eq!(ledger.get_total_studies(), 1);

        let record = ledger.get_record(&study_id).unwrap();
        assert_eq!(record.proof_hash, proof);
        assert_eq!(record.timestamp, 0);
        assert_eq!(record.privacy_level, 2);
        assert!(record.verified);
        assert!(record.statistical_significance);
        assert!(record.minimum_sample_met);
        assert!(record.treatment_effective);
        assert!(record.regulatory_compliant);
    }

    #[test]
    fn failed_submission_leaves_no_trace() {
        let (study_id, hospital_id) = ids();
        let mut ledger = Ledger::new();

        let w = StudyWitness { patient_count: 30, ..passing_witness() };
        let err = ledger
            .submit_medical_proof(study_id, hospital_id, 2, &w)
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::Validation(ValidationError::InsufficientSampleSize)
        );
        assert_eq!(err.to_string(), "Insufficient sample size");
        assert_eq!(ledger.get_total_studies(), 0);
        assert!(ledger.get_record(&study_id).is_none());
        assert!(!ledger.get_study_status(&study_id));
    }

    #[test]
    fn timestamps_follow_the_study_counter() {
        let (_, hospital_id) = ids();
        let mut ledger = Ledger::new();

        for i in 0..3u8 {
            let study_id = Bytes32([i + 10; 32]);
            ledger
                .submit_medical_proof(study_id, hospital_id, 0, &passing_witness())
                .unwrap();
            assert_eq!(ledger.get_record(&study_id).unwrap().timestamp, i as u64);
        }

        assert_eq!(ledger.get_total_studies(), 3);
    }

    #[test]
    fn resubmission_overwrites_the_prior_record() {
        let (study_id, hospital_id) = ids();
        let mut ledger = Ledger::new();

        let first = ledger
            .submit_medical_proof(study_id, hospital_id, 1, &passing_witness())
            .unwrap();

        let second_witness = StudyWitness { patient_count: 600, ..passing_witness() };
        let second = ledger
            .submit_medical_proof(study_id, hospital_id, 1, &second_witness)
            .unwrap();

        // Last write wins: the old proof hash is no longer reachable and the
        // counter still advanced.
        assert_ne!(first, second);
        assert_eq!(ledger.get_record(&study_id).unwrap().proof_hash, second);
        assert_eq!(ledger.get_total_studies(), 2);
    }

    #[test]
    fn status_and_compliance_queries_differ_on_absence() {
        let (study_id, hospital_id) = ids();
        let mut ledger = Ledger::new();

        assert!(!ledger.get_study_status(&study_id));
        let err = ledger.get_study_compliance(&study_id).unwrap_err();
        assert_eq!(err, LedgerError::StudyNotFound);
        assert_eq!(err.to_string(), "Study not found");

        ledger
            .submit_medical_proof(study_id, hospital_id, 0, &passing_witness())
            .unwrap();

        assert!(ledger.get_study_status(&study_id));
        assert_eq!(ledger.get_study_compliance(&study_id), Ok(true));
    }

    #[test]
    fn authorization_counts_nonzero_tokens() {
        let (_, hospital_id) = ids();
        let mut ledger = Ledger::new();

        let err = ledger
            .authorize_hospital(hospital_id, Bytes32::ZERO)
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidAuthorization);
        assert_eq!(err.to_string(), "Invalid authorization");
        assert_eq!(ledger.get_verified_hospitals(), 0);

        // No deduplication: every successful call counts.
        let token = Bytes32([7u8; 32]);
        ledger.authorize_hospital(hospital_id, token).unwrap();
        ledger.authorize_hospital(hospital_id, token).unwrap();
        assert_eq!(ledger.get_verified_hospitals(), 2);
    }

    #[test]
    fn identical_submissions_produce_identical_records() {
        let (study_id, hospital_id) = ids();
        let mut a = Ledger::new();
        let mut b = Ledger::new();

        let pa = a
            .submit_medical_proof(study_id, hospital_id, 5, &passing_witness())
            .unwrap();
        let pb = b
            .submit_medical_proof(study_id, hospital_id, 5, &passing_witness())
            .unwrap();

        assert_eq!(pa, pb);
        let ra = a.get_record(&study_id).unwrap();
        let rb = b.get_record(&study_id).unwrap();
        assert_eq!(ra.hospital_commitment, rb.hospital_commitment);
        assert_eq!(ra.data_commitment, rb.data_commitment);
    }
}
