//! Payment confirmation payloads (webhook from the payment processor)

use serde::{Deserialize, Serialize};

/// Webhook secret header
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// What a confirmed payment bought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PaymentPurpose {
    /// Escalate an issue to High priority
    Boost { issue_id: String },
    /// Premium subscription (lifts the free issue limit)
    Premium { subject_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    /// Processor-side id; each id is applied at most once
    pub payment_id: String,
    /// Who paid
    pub payer_id: String,
    pub purpose: PaymentPurpose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub payment_id: String,
    /// `false` when the payment was a replay or changed nothing
    pub applied: bool,
}
