use serde::{Deserialize, Serialize};
use study_proofs::types::{Bytes32, StudyWitness};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitProofRequest {
    pub study_id: Bytes32,
    pub hospital_id: Bytes32,

    /// Opaque to validation; bound into the proof hash.
    pub privacy_level: u8,

    /// The private inputs. Sent by the hospital's own submission client and
    /// never persisted; only commitments derived from them are stored.
    pub witness: StudyWitness,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitProofResponse {
    pub study_id: Bytes32,
    pub proof_hash: Bytes32,
    pub regulatory_compliant: bool,
    pub timestamp: u64,
    pub total_studies: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeHospitalRequest {
    pub hospital_id: Bytes32,

    /// Any non-zero 32-byte token. The all-zero value is rejected.
    pub authorization_proof: Bytes32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeHospitalResponse {
    pub verified_hospitals: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyStatusResponse {
    pub study_id: Bytes32,

    /// False for unknown studies; absence is not an error on this endpoint.
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyComplianceResponse {
    pub study_id: Bytes32,
    pub regulatory_compliant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_studies: u64,
    pub verified_hospitals: u64,
}
