//! Payment Webhook Handler

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::payment::{PaymentConfirmation, PaymentOutcome, WEBHOOK_SECRET_HEADER};

use crate::core::ServerState;
use crate::security_log;

/// POST /webhooks/payments
///
/// The secret is checked before the body is parsed, so an unauthenticated
/// caller always gets 401.
pub async fn confirm(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<PaymentOutcome>> {
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = state.payments.verify_secret(presented) {
        security_log!("WARN", "webhook_rejected", has_secret = presented.is_some());
        return Err(e);
    }

    let confirmation: PaymentConfirmation = serde_json::from_slice(&body)
        .map_err(|e| AppError::with_message(ErrorCode::PaymentInvalid, e.to_string()))?;
    let outcome = state.payments.apply(confirmation)?;
    Ok(Json(outcome))
}
