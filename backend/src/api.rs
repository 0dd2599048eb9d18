use crate::db;
use crate::errors::ApiError;
use crate::models::*;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use study_proofs::types::{Bytes32, ProofRecord};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v1/proofs", post(submit_proof))
        .route("/api/v1/hospitals/authorize", post(authorize_hospital))
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/studies/:id", get(get_study))
        .route("/api/v1/studies/:id/status", get(get_study_status))
        .route("/api/v1/studies/:id/compliance", get(get_study_compliance))
        .route("/api/v1/stats", get(get_stats))
        .merge(protected_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // In production, this should be a strong secret from environment.
    let expected_key = std::env::var("API_KEY").unwrap_or_else(|_| "dev-secret-key".to_string());

    if let Some(provided_key) = headers.get("X-API-KEY") {
        if provided_key == expected_key.as_str() {
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!("unauthorized access attempt");
    Err(StatusCode::UNAUTHORIZED)
}

/// Path ids are hex-encoded 32-byte study identifiers. A malformed id is an
/// input contract violation and is rejected before any lookup.
fn parse_study_id(id: &str) -> Result<Bytes32, ApiError> {
    Bytes32::from_hex(id).map_err(|e| ApiError::BadRequest(format!("invalid study id: {e}")))
}

async fn submit_proof(
    State(state): State<AppState>,
    Json(req): Json<SubmitProofRequest>,
) -> Result<Json<SubmitProofResponse>, ApiError> {
    let record = match db::submit_proof(
        &state.db,
        req.study_id,
        req.hospital_id,
        req.privacy_level,
        &req.witness,
    )
    .await
    {
        Ok(record) => record,
        Err(e) => {
            if let ApiError::ValidationFailed(reason) = &e {
                tracing::warn!(study_id = %req.study_id.to_hex(), %reason, "submission rejected");
            }
            return Err(e);
        }
    };

    let total_studies = db::counter_value(&state.db, db::TOTAL_STUDIES).await?;

    tracing::info!(
        study_id = %record.study_id.to_hex(),
        proof_hash = %record.proof_hash.to_hex(),
        regulatory_compliant = record.regulatory_compliant,
        "submission accepted"
    );

    Ok(Json(SubmitProofResponse {
        study_id: record.study_id,
        proof_hash: record.proof_hash,
        regulatory_compliant: record.regulatory_compliant,
        timestamp: record.timestamp,
        total_studies,
    }))
}

async fn authorize_hospital(
    State(state): State<AppState>,
    Json(req): Json<AuthorizeHospitalRequest>,
) -> Result<Json<AuthorizeHospitalResponse>, ApiError> {
    // The all-zero token is the "no proof" sentinel. No per-hospital
    // authorization state is kept; this endpoint only counts.
    if req.authorization_proof.is_zero() {
        tracing::warn!(hospital_id = %req.hospital_id.to_hex(), "authorization rejected");
        return Err(ApiError::Unauthorized("Invalid authorization".to_string()));
    }

    let verified_hospitals = db::bump_verified_hospitals(&state.db).await?;

    tracing::info!(hospital_id = %req.hospital_id.to_hex(), verified_hospitals, "hospital authorized");

    Ok(Json(AuthorizeHospitalResponse { verified_hospitals }))
}

async fn get_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProofRecord>, ApiError> {
    let study_id = parse_study_id(&id)?;

    let Some(record) = db::get_record(&state.db, &study_id).await? else {
        return Err(ApiError::NotFound("Study not found".to_string()));
    };

    Ok(Json(record))
}

async fn get_study_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudyStatusResponse>, ApiError> {
    let study_id = parse_study_id(&id)?;

    // Unknown studies read as unverified; this endpoint never 404s.
    let verified = db::get_record(&state.db, &study_id)
        .await?
        .map(|r| r.verified)
        .unwrap_or(false);

    Ok(Json(StudyStatusResponse { study_id, verified }))
}

async fn get_study_compliance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudyComplianceResponse>, ApiError> {
    let study_id = parse_study_id(&id)?;

    let Some(record) = db::get_record(&state.db, &study_id).await? else {
        return Err(ApiError::NotFound("Study not found".to_string()));
    };

    Ok(Json(StudyComplianceResponse {
        study_id,
        regulatory_compliant: record.regulatory_compliant,
    }))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total_studies = db::counter_value(&state.db, db::TOTAL_STUDIES).await?;
    let verified_hospitals = db::counter_value(&state.db, db::VERIFIED_HOSPITALS).await?;

    Ok(Json(StatsResponse {
        total_studies,
        verified_hospitals,
    }))
}
