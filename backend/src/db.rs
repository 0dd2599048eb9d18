use crate::errors::ApiError;
use chrono::Utc;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use study_proofs::ledger::build_proof_record;
use study_proofs::types::{Bytes32, ProofRecord, StudyWitness};
use uuid::Uuid;

pub type Db = Pool<Sqlite>;

pub const TOTAL_STUDIES: &str = "total_studies";
pub const VERIFIED_HOSPITALS: &str = "verified_hospitals";

pub async fn connect(db_url: &str) -> Result<Db, ApiError> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|_| ApiError::Internal)
}

pub async fn init_schema(db: &Db) -> Result<(), ApiError> {
    // NOTE: Records are only ever inserted or wholesale-replaced, never
    // updated in place; counters only ever grow.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS proof_records (
  study_id TEXT PRIMARY KEY,
  hospital_commitment TEXT NOT NULL,
  data_commitment TEXT NOT NULL,
  proof_hash TEXT NOT NULL,
  privacy_level INTEGER NOT NULL,
  statistical_significance INTEGER NOT NULL,
  minimum_sample_met INTEGER NOT NULL,
  treatment_effective INTEGER NOT NULL,
  regulatory_compliant INTEGER NOT NULL,
  verified INTEGER NOT NULL,
  timestamp INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS counters (
  name TEXT PRIMARY KEY,
  value INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS submissions (
  id TEXT PRIMARY KEY,
  study_id TEXT NOT NULL,
  proof_hash TEXT NOT NULL,
  created_at TEXT NOT NULL
);

INSERT OR IGNORE INTO counters (name, value) VALUES ('total_studies', 0);
INSERT OR IGNORE INTO counters (name, value) VALUES ('verified_hospitals', 0);
"#,
    )
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn counter_value(db: &Db, name: &str) -> Result<u64, ApiError> {
    let row = sqlx::query(r#"SELECT value FROM counters WHERE name = ?"#)
        .bind(name)
        .fetch_one(db)
        .await
        .map_err(|_| ApiError::Internal)?;

    let value: i64 = row.get(0);
    Ok(value as u64)
}

/// Validate and record one submission.
///
/// Runs as a single transaction: the pre-increment study counter supplies the
/// record's timestamp, the record replaces any prior one under the same study
/// id, the counter advances, and an audit row is appended. A validation
/// failure returns before the first write, so a rejected submission changes
/// nothing.
pub async fn submit_proof(
    db: &Db,
    study_id: Bytes32,
    hospital_id: Bytes32,
    privacy_level: u8,
    witness: &StudyWitness,
) -> Result<ProofRecord, ApiError> {
    let mut tx = db.begin().await.map_err(|_| ApiError::Internal)?;

    let row = sqlx::query(r#"SELECT value FROM counters WHERE name = ?"#)
        .bind(TOTAL_STUDIES)
        .fetch_one(&mut *tx)
        .await
        .map_err(|_| ApiError::Internal)?;
    let total_studies: i64 = row.get(0);

    let record = build_proof_record(study_id, hospital_id, privacy_level, witness, total_studies as u64)
        .map_err(|e| ApiError::ValidationFailed(e.to_string()))?;

    sqlx::query(
        r#"INSERT OR REPLACE INTO proof_records
           (study_id, hospital_commitment, data_commitment, proof_hash, privacy_level,
            statistical_significance, minimum_sample_met, treatment_effective,
            regulatory_compliant, verified, timestamp)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(record.study_id.to_hex())
    .bind(record.hospital_commitment.to_hex())
    .bind(record.data_commitment.to_hex())
    .bind(record.proof_hash.to_hex())
    .bind(record.privacy_level as i64)
    .bind(record.statistical_significance as i64)
    .bind(record.minimum_sample_met as i64)
    .bind(record.treatment_effective as i64)
    .bind(record.regulatory_compliant as i64)
    .bind(record.verified as i64)
    .bind(record.timestamp as i64)
    .execute(&mut *tx)
    .await
    .map_err(|_| ApiError::Internal)?;

    sqlx::query(r#"UPDATE counters SET value = value + 1 WHERE name = ?"#)
        .bind(TOTAL_STUDIES)
        .execute(&mut *tx)
        .await
        .map_err(|_| ApiError::Internal)?;

    sqlx::query(
        r#"INSERT INTO submissions (id, study_id, proof_hash, created_at)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(record.study_id.to_hex())
    .bind(record.proof_hash.to_hex())
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await
    .map_err(|_| ApiError::Internal)?;

    tx.commit().await.map_err(|_| ApiError::Internal)?;

    Ok(record)
}

/// Count one hospital authorization and return the new counter value.
///
/// The token's non-triviality is checked by the caller; this is only the
/// counter bump.
pub async fn bump_verified_hospitals(db: &Db) -> Result<u64, ApiError> {
    let mut tx = db.begin().await.map_err(|_| ApiError::Internal)?;

    sqlx::query(r#"UPDATE counters SET value = value + 1 WHERE name = ?"#)
        .bind(VERIFIED_HOSPITALS)
        .execute(&mut *tx)
        .await
        .map_err(|_| ApiError::Internal)?;

    let row = sqlx::query(r#"SELECT value FROM counters WHERE name = ?"#)
        .bind(VERIFIED_HOSPITALS)
        .fetch_one(&mut *tx)
        .await
        .map_err(|_| ApiError::Internal)?;
    let value: i64 = row.get(0);

    tx.commit().await.map_err(|_| ApiError::Internal)?;

    Ok(value as u64)
}

pub async fn get_record(db: &Db, study_id: &Bytes32) -> Result<Option<ProofRecord>, ApiError> {
    let row = sqlx::query(
        r#"SELECT study_id, hospital_commitment, data_commitment, proof_hash, privacy_level,
                  statistical_significance, minimum_sample_met, treatment_effective,
                  regulatory_compliant, verified, timestamp
           FROM proof_records WHERE study_id = ?"#,
    )
    .bind(study_id.to_hex())
    .fetch_optional(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    let Some(row) = row else { return Ok(None); };

    let parse = |s: String| Bytes32::from_hex(&s).map_err(|_| ApiError::Internal);

    let privacy_level: i64 = row.get(4);
    let timestamp: i64 = row.get(10);

    Ok(Some(ProofRecord {
        study_id: parse(row.get(0))?,
        hospital_commitment: parse(row.get(1))?,
        data_commitment: parse(row.get(2))?,
        proof_hash: parse(row.get(3))?,
        privacy_level: privacy_level as u8,
        statistical_significance: row.get::<i64, _>(5) == 1,
        minimum_sample_met: row.get::<i64, _>(6) == 1,
        treatment_effective: row.get::<i64, _>(7) == 1,
        regulatory_compliant: row.get::<i64, _>(8) == 1,
        verified: row.get::<i64, _>(9) == 1,
        timestamp: timestamp as u64,
    }))
}
