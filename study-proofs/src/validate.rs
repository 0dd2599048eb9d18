//! The eligibility rule set applied to a study's private statistics.
//!
//! Checks run in a fixed order and fail fast: the first unsatisfied rule is
//! the reported reason and nothing after it is evaluated. Rate comparisons
//! are done by integer cross-multiplication in 128-bit arithmetic, never by
//! division, so the results are exact and products of two u64 counts cannot
//! overflow.

use crate::constants::{
    MAX_ADVERSE_EVENT_PCT, MAX_P_VALUE_SCALED, MIN_CONTROL_COUNT, MIN_DATA_QUALITY,
    MIN_PATIENT_COUNT, MIN_RELATIVE_IMPROVEMENT_PCT, PCT_SCALE,
};
use crate::types::StudyWitness;
use thiserror::Error;

/// One reason string per rule. External callers match on these verbatim, so
/// the wording is part of the interface.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Insufficient sample size")]
    InsufficientSampleSize,

    #[error("Results not statistically significant")]
    NotStatisticallySignificant,

    #[error("Control group too small")]
    ControlGroupTooSmall,

    #[error("Data quality below threshold")]
    DataQualityBelowThreshold,

    #[error("Treatment not superior to control")]
    TreatmentNotSuperior,

    #[error("Insufficient clinical improvement")]
    InsufficientClinicalImprovement,

    #[error("Adverse event rate too high")]
    AdverseEventRateTooHigh,
}

/// Run all seven eligibility checks against a submission's witnesses.
///
/// The superiority check compares success *rates* via cross-multiplication:
/// `treatment_success / patient_count > control_success / control_count`
/// becomes `treatment_success * control_count > control_success *
/// patient_count`. The equivalence holds only for positive counts; a zero
/// `control_count` is already rejected by the control-group rule, and a zero
/// `patient_count` by the sample-size rule, before this comparison runs.
pub fn validate_submission(witness: &StudyWitness) -> Result<(), ValidationError> {
    if witness.patient_count < MIN_PATIENT_COUNT {
        return Err(ValidationError::InsufficientSampleSize);
    }

    if witness.p_value_scaled > MAX_P_VALUE_SCALED {
        return Err(ValidationError::NotStatisticallySignificant);
    }

    if witness.control_count < MIN_CONTROL_COUNT {
        return Err(ValidationError::ControlGroupTooSmall);
    }

    if witness.data_quality < MIN_DATA_QUALITY {
        return Err(ValidationError::DataQualityBelowThreshold);
    }

    let treatment_scaled = witness.treatment_success as u128 * witness.control_count as u128;
    let control_scaled = witness.control_success as u128 * witness.patient_count as u128;

    if treatment_scaled <= control_scaled {
        return Err(ValidationError::TreatmentNotSuperior);
    }

    // Absolute rate improvement must be at least 10% of the control's scaled
    // value. Both sides stay integral, so the comparison is exact.
    let improvement = treatment_scaled - control_scaled;
    if improvement * PCT_SCALE < control_scaled * MIN_RELATIVE_IMPROVEMENT_PCT {
        return Err(ValidationError::InsufficientClinicalImprovement);
    }

    let adverse_scaled = witness.adverse_events as u128 * PCT_SCALE;
    if adverse_scaled > witness.patient_count as u128 * MAX_ADVERSE_EVENT_PCT {
        return Err(ValidationError::AdverseEventRateTooHigh);
    }

    Ok(())
}

/// The four regulatory sub-predicates: sample size, significance, data
/// quality, and safety.
///
/// Deliberately recomputed from the witnesses instead of reusing
/// [`validate_submission`]'s outcome; the persisted `regulatoryCompliant`
/// flag must stay derivable from these predicates alone even if the full
/// rule set diverges from them.
pub fn regulatory_compliant(witness: &StudyWitness) -> bool {
    let sample_ok = witness.patient_count >= MIN_PATIENT_COUNT;
    let significance_ok = witness.p_value_scaled <= MAX_P_VALUE_SCALED;
    let quality_ok = witness.data_quality >= MIN_DATA_QUALITY;
    let safety_ok = witness.adverse_events as u128 * PCT_SCALE
        <= witness.patient_count as u128 * MAX_ADVERSE_EVENT_PCT;

    sample_ok && significance_ok && quality_ok && safety_ok
}
