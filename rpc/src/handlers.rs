//! RPC request handlers and wire DTOs.
//!
//! The JSON field names mirror what the original web clients expect
//! (`pensionerID`, `walletAddress`, camelCase everywhere), so existing
//! frontends keep working unchanged.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use pension_store::{AccountStore, AttemptStore, VerificationAttempt};
use pension_types::{BeneficiaryId, Role, WalletAddress};
use pension_utils::format_duration;
use pension_verification::{EvidenceUpload, LiveSubmission, SyncPayload};

use crate::error::RpcError;
use crate::state::AppState;

// ── Wire DTOs ────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDto {
    pub id: u64,
    #[serde(rename = "pensionerID")]
    pub pensioner_id: u64,
    pub wallet_address: String,
    pub id_photo_path: Option<String>,
    pub face_photo_path: Option<String>,
    pub status: String,
    pub created_at: String,
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub last_verified_at: Option<String>,
    pub next_verification_date: Option<String>,
}

impl From<&VerificationAttempt> for AttemptDto {
    fn from(a: &VerificationAttempt) -> Self {
        Self {
            id: a.id.as_u64(),
            pensioner_id: a.beneficiary_id.as_u64(),
            wallet_address: a.wallet.as_str().to_string(),
            id_photo_path: a.document_evidence.as_ref().map(|r| r.as_str().to_string()),
            face_photo_path: a.live_evidence.as_ref().map(|r| r.as_str().to_string()),
            status: a.status.as_str().to_string(),
            created_at: a.created_at.to_rfc3339(),
            user_id: a.account_id.as_u64(),
            last_verified_at: a.last_verified_at.map(|t| t.to_rfc3339()),
            next_verification_date: a.next_due.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub verification: AttemptDto,
    #[serde(rename = "nextVerificationDate", skip_serializing_if = "Option::is_none")]
    pub next_verification_date: Option<String>,
}

/// 200 for a successful outcome, 400 for a rejected one — either way the
/// committed attempt rides along in the body.
fn submission_response(attempt: &VerificationAttempt, ok: &str, rejected: &str) -> Response {
    let success = attempt.status.is_success();
    let body = SubmissionResponse {
        success,
        message: if success { ok } else { rejected }.to_string(),
        verification: AttemptDto::from(attempt),
        next_verification_date: attempt.next_due.map(|t| t.to_rfc3339()),
    };
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(body)).into_response()
}

// ── Live submission ──────────────────────────────────────────────────────

async fn read_photo(field: Field<'_>) -> Result<Option<EvidenceUpload>, RpcError> {
    let has_file_name = field.file_name().is_some_and(|f| !f.is_empty());
    let mime = field.content_type().unwrap_or("image/jpeg").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| RpcError::Validation(format!("failed to read uploaded file: {e}")))?;
    // An empty file part means the client submitted the form without a photo
    // in this slot.
    if !has_file_name || bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(EvidenceUpload {
        bytes: bytes.to_vec(),
        mime,
    }))
}

pub async fn verify_pensioner(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, RpcError> {
    let account_id = state.authenticate(&headers)?;

    let mut beneficiary_hint = BeneficiaryId::UNSET;
    let mut wallet: Option<WalletAddress> = None;
    let mut document_photo = None;
    let mut live_photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RpcError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pensionerID" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| RpcError::Validation(format!("unreadable pensionerID: {e}")))?;
                beneficiary_hint = BeneficiaryId::parse(&text)
                    .ok_or_else(|| RpcError::Validation("Invalid pensionerID".into()))?;
            }
            "walletAddress" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| RpcError::Validation(format!("unreadable walletAddress: {e}")))?;
                if !text.is_empty() {
                    wallet = Some(WalletAddress::new(text));
                }
            }
            "idPhoto" => document_photo = read_photo(field).await?,
            "facePhoto" => live_photo = read_photo(field).await?,
            _ => {}
        }
    }

    let wallet = wallet.ok_or_else(|| RpcError::Validation("Missing wallet address".into()))?;

    let attempt = state.engine.submit(
        account_id,
        LiveSubmission {
            beneficiary_hint,
            wallet,
            document_photo,
            live_photo,
        },
    )?;

    Ok(submission_response(
        &attempt,
        "Verification successful",
        "Verification failed",
    ))
}

// ── Offline sync ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncVerificationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub national_id: Option<String>,
    pub wallet_address: Option<String>,
    pub id_photo: Option<String>,
    pub face_photo: Option<String>,
}

pub async fn sync_verification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SyncVerificationRequest>,
) -> Result<Response, RpcError> {
    let account_id = state.authenticate(&headers)?;

    let payload = SyncPayload {
        first_name: req.first_name,
        last_name: req.last_name,
        date_of_birth: req.date_of_birth,
        national_id: req.national_id,
        wallet: req
            .wallet_address
            .filter(|w| !w.is_empty())
            .map(WalletAddress::new),
        id_photo: req.id_photo,
        face_photo: req.face_photo,
    };

    let attempt = state.reconciler.reconcile(account_id, payload)?;

    Ok(submission_response(
        &attempt,
        "Verification synced successfully",
        "Verification sync carried no usable evidence",
    ))
}

// ── Beneficiary data query ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionerData {
    pub id: Option<u64>,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub wallet: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    /// Mock disbursement amount; passes through for the frontend unchanged.
    pub pension_amount: String,
    pub last_verification_date: Option<String>,
    pub is_active: bool,
    pub is_deceased: bool,
    pub next_verification_date: Option<String>,
    pub verification_status: String,
    pub verifications: Vec<AttemptDto>,
}

#[derive(Serialize)]
pub struct PensionerDataResponse {
    pub success: bool,
    pub pensioner: PensionerData,
}

pub async fn pensioner_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PensionerDataResponse>, RpcError> {
    let account_id = state.authenticate(&headers)?;
    let account = state.ledger.get_account(account_id)?;

    if account.role != Role::Beneficiary {
        return Err(RpcError::Forbidden("Account is not a beneficiary".into()));
    }
    let wallet = account
        .wallet
        .clone()
        .ok_or_else(|| RpcError::Validation("No wallet address associated with account".into()))?;

    let attempts = state.ledger.attempts_for_account(account_id)?;

    // The current verification window comes from the latest successful
    // attempt.
    let latest_success = attempts.iter().rev().find(|a| a.status.is_success());

    let pensioner = PensionerData {
        id: (!account.beneficiary_id.is_unset()).then(|| account.beneficiary_id.as_u64()),
        name: account.full_name(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        wallet: wallet.as_str().to_string(),
        email: account.email.clone(),
        phone: account.phone.clone(),
        address: account.address.clone(),
        city: account.city.clone(),
        country: account.country.clone(),
        postal_code: account.postal_code.clone(),
        pension_amount: "1.5".to_string(),
        last_verification_date: latest_success
            .and_then(|a| a.last_verified_at)
            .map(|t| t.to_rfc3339()),
        is_active: true,
        is_deceased: false,
        next_verification_date: latest_success
            .and_then(|a| a.next_due)
            .map(|t| t.to_rfc3339()),
        verification_status: "active".to_string(),
        verifications: attempts.iter().map(AttemptDto::from).collect(),
    };

    Ok(Json(PensionerDataResponse {
        success: true,
        pensioner,
    }))
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_duration(state.uptime_secs()),
    })
}
