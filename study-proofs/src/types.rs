//! Types shared between the engine and the host-side substrate.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A fixed 32-byte value: study ids, hospital ids, secret keys, commitments,
/// proof hashes and authorization tokens are all carried in this shape.
///
/// JSON representation is a lowercase hex string to avoid ambiguities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| format!("invalid hex: {e}"))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))?;
        Ok(Self(bytes))
    }

    /// The all-zero value is reserved as the "no proof" sentinel.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Bytes32::from_hex(&s).map_err(D::Error::custom)
    }
}

/// The private inputs backing one submission.
///
/// These are witnesses in the commitment sense: they feed validation and
/// hashing but are never persisted or disclosed. The engine trusts their
/// types and checks only their values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StudyWitness {
    /// Hospital secret key, bound into the hospital commitment.
    pub hospital_secret_key: Bytes32,
    /// Total enrolled patients.
    pub patient_count: u64,
    /// Successful outcomes in the treatment arm.
    pub treatment_success: u64,
    /// Successful outcomes in the control arm.
    pub control_success: u64,
    /// Size of the control arm.
    pub control_count: u64,
    /// P-value scaled by 1000 (50 means p <= 0.050).
    pub p_value_scaled: u64,
    /// Observed adverse events across the study.
    pub adverse_events: u64,
    /// Data-quality score on the 0-100 scale.
    pub data_quality: u64,
}

/// The public record persisted per study id.
///
/// Field names follow the external reporting contract, so the serde names
/// are part of the interface and must not change.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    /// Primary key of the ledger map.
    pub study_id: Bytes32,
    /// Binds hospital identity + secret key + study id.
    pub hospital_commitment: Bytes32,
    /// Binds all seven private statistical inputs.
    pub data_commitment: Bytes32,
    /// Identifier of the submission event.
    pub proof_hash: Bytes32,
    /// Caller-supplied privacy level, opaque to validation.
    pub privacy_level: u8,
    pub statistical_significance: bool,
    pub minimum_sample_met: bool,
    pub treatment_effective: bool,
    /// Conjunction of the four regulatory sub-checks, recomputed at insert
    /// time rather than copied from `verified`.
    pub regulatory_compliant: bool,
    pub verified: bool,
    /// Pre-increment study counter at insert time. A monotone sequence
    /// number, not a wall clock.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let mut raw = [0u8; 32];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = i as u8;
        }
        let v = Bytes32(raw);
        assert_eq!(Bytes32::from_hex(&v.to_hex()).unwrap(), v);
    }

    #[test]
    fn rejects_wrong_length_hex() {
        assert!(Bytes32::from_hex("deadbeef").is_err());
        assert!(Bytes32::from_hex("zz").is_err());
    }

    #[test]
    fn zero_sentinel() {
        assert!(Bytes32::ZERO.is_zero());
        assert!(!Bytes32([1u8; 32]).is_zero());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let v = Bytes32([0xab; 32]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: Bytes32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn proof_record_serializes_with_reporting_field_names() {
        let record = ProofRecord {
            study_id: Bytes32([1u8; 32]),
            hospital_commitment: Bytes32([2u8; 32]),
            data_commitment: Bytes32([3u8; 32]),
            proof_hash: Bytes32([4u8; 32]),
            privacy_level: 2,
            statistical_significance: true,
            minimum_sample_met: true,
            treatment_effective: true,
            regulatory_compliant: true,
            verified: true,
            timestamp: 7,
        };

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        for key in [
            "studyId",
            "hospitalCommitment",
            "dataCommitment",
            "proofHash",
            "privacyLevel",
            "statisticalSignificance",
            "minimumSampleMet",
            "treatmentEffective",
            "regulatoryCompliant",
            "verified",
            "timestamp",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }
}
