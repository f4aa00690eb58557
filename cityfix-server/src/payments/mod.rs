//! Payment webhook processing
//!
//! The payment processor confirms boosts and premium subscriptions through
//! `POST /webhooks/payments`. Each confirmation is applied at most once: the
//! payment id is recorded in the same write transaction as its effect.

use ring::hmac;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::issue::Actor;
use shared::models::Role;
use shared::payment::{PaymentConfirmation, PaymentOutcome, PaymentPurpose};
use shared::util::now_millis;

use crate::directory::RoleDirectory;
use crate::issues::actions::{ActionContext, BoostAction, IssueAction};
use crate::storage::Storage;

/// Key under which presented and configured secrets are compared
const SECRET_MAC_KEY: &[u8] = b"cityfix/payment-webhook/v1";

/// Configured webhook secret, kept only as its HMAC tag
#[derive(Debug, Clone)]
struct WebhookSecret {
    key: hmac::Key,
    tag: hmac::Tag,
}

impl WebhookSecret {
    fn new(secret: &str) -> Self {
        let key = hmac::Key::new(hmac::HMAC_SHA256, SECRET_MAC_KEY);
        let tag = hmac::sign(&key, secret.as_bytes());
        Self { key, tag }
    }

    /// Fixed-length tags are compared, so timing reveals neither the
    /// secret's length nor a matching prefix
    fn matches(&self, presented: &str) -> bool {
        hmac::verify(&self.key, presented.as_bytes(), self.tag.as_ref()).is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    storage: Storage,
    webhook_secret: Option<WebhookSecret>,
}

impl PaymentService {
    pub fn new(storage: Storage, webhook_secret: Option<String>) -> Self {
        Self {
            storage,
            webhook_secret: webhook_secret.as_deref().map(WebhookSecret::new),
        }
    }

    /// Check the shared webhook secret
    ///
    /// Without a configured secret every webhook call is refused.
    pub fn verify_secret(&self, presented: Option<&str>) -> AppResult<()> {
        match (&self.webhook_secret, presented) {
            (Some(secret), Some(presented)) if secret.matches(presented) => Ok(()),
            _ => Err(AppError::new(ErrorCode::WebhookUnauthorized)),
        }
    }

    /// Apply a confirmed payment; replays are a successful no-op
    pub fn apply(&self, confirmation: PaymentConfirmation) -> AppResult<PaymentOutcome> {
        if confirmation.payment_id.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::PaymentInvalid,
                "payment id must not be empty",
            ));
        }

        let applied = self.storage.write(|txn| -> AppResult<bool> {
            if Storage::is_payment_processed_txn(txn, &confirmation.payment_id)? {
                return Ok(false);
            }

            let changed = match &confirmation.purpose {
                PaymentPurpose::Boost { issue_id } => {
                    let mut issue = Storage::read_issue(txn, issue_id)?.ok_or_else(|| {
                        AppError::new(ErrorCode::IssueNotFound)
                            .with_detail("issueId", issue_id.as_str())
                    })?;
                    let ctx = ActionContext::new(
                        Actor::new(confirmation.payer_id.as_str(), Role::Citizen),
                        now_millis(),
                    );
                    let entry = BoostAction.execute(&mut issue, &ctx)?;
                    if entry.is_some() {
                        Storage::write_issue(txn, &issue)?;
                    }
                    entry.is_some()
                }
                PaymentPurpose::Premium { subject_id } => {
                    RoleDirectory::mark_premium(txn, subject_id)?
                }
            };

            Storage::mark_payment_processed(txn, &confirmation.payment_id)?;
            Ok(changed)
        })?;

        tracing::info!(
            payment_id = %confirmation.payment_id,
            payer = %confirmation.payer_id,
            applied,
            "Payment confirmation processed"
        );
        Ok(PaymentOutcome {
            payment_id: confirmation.payment_id,
            applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageResult;
    use shared::issue::{IssueCreate, IssueStatus, Priority, TimelineAction, machine};

    fn setup() -> (Storage, PaymentService) {
        let storage = Storage::open_in_memory().unwrap();
        let directory = RoleDirectory::new(storage.clone());
        directory.register("ana", "Ana").unwrap();

        let issue = machine::report(
            "issue-1",
            "ana",
            IssueCreate {
                title: "Graffiti".into(),
                description: "On the library wall".into(),
                category: "Vandalism".into(),
                location: "Library".into(),
                image_url: None,
            },
            1,
        );
        storage
            .write(|txn| Storage::write_issue(txn, &issue))
            .unwrap();

        let service = PaymentService::new(storage.clone(), Some("whsec_test".into()));
        (storage, service)
    }

    fn boost(payment_id: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            payment_id: payment_id.into(),
            payer_id: "ana".into(),
            purpose: PaymentPurpose::Boost {
                issue_id: "issue-1".into(),
            },
        }
    }

    #[test]
    fn test_verify_secret() {
        let (_, service) = setup();
        assert!(service.verify_secret(Some("whsec_test")).is_ok());
        assert_eq!(
            service.verify_secret(Some("wrong")).unwrap_err().code,
            ErrorCode::WebhookUnauthorized
        );
        assert!(service.verify_secret(None).is_err());
        for near_miss in ["", "whsec_tes", "whsec_test ", "WHSEC_TEST"] {
            assert!(service.verify_secret(Some(near_miss)).is_err(), "{near_miss:?}");
        }

        let open = PaymentService::new(Storage::open_in_memory().unwrap(), None);
        assert!(open.verify_secret(Some("anything")).is_err());
    }

    #[test]
    fn test_boost_applied_once() {
        let (storage, service) = setup();

        let outcome = service.apply(boost("pi_1")).unwrap();
        assert!(outcome.applied);
        let issue = storage.get_issue("issue-1").unwrap().unwrap();
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.timeline.last().unwrap().action, TimelineAction::Boosted);
        let len = issue.timeline.len();

        // Replay of the same payment
        let outcome = service.apply(boost("pi_1")).unwrap();
        assert!(!outcome.applied);

        // A second payment on an already boosted issue changes nothing
        let outcome = service.apply(boost("pi_2")).unwrap();
        assert!(!outcome.applied);
        let issue = storage.get_issue("issue-1").unwrap().unwrap();
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.timeline.len(), len);
    }

    #[test]
    fn test_boost_terminal_issue_is_not_recorded() {
        let (storage, service) = setup();
        storage
            .update_issue("issue-1", |_, issue| -> StorageResult<()> {
                issue.status = IssueStatus::Rejected;
                Ok(())
            })
            .unwrap();

        let err = service.apply(boost("pi_1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyTerminal);
        assert!(!storage.is_payment_processed("pi_1").unwrap());
    }

    #[test]
    fn test_premium() {
        let (storage, service) = setup();
        let outcome = service
            .apply(PaymentConfirmation {
                payment_id: "pi_9".into(),
                payer_id: "ana".into(),
                purpose: PaymentPurpose::Premium {
                    subject_id: "ana".into(),
                },
            })
            .unwrap();
        assert!(outcome.applied);
        assert!(storage.get_identity("ana").unwrap().unwrap().is_premium);
    }

    #[test]
    fn test_unknown_targets() {
        let (_, service) = setup();
        let mut confirmation = boost("pi_1");
        confirmation.purpose = PaymentPurpose::Boost {
            issue_id: "missing".into(),
        };
        assert_eq!(
            service.apply(confirmation).unwrap_err().code,
            ErrorCode::IssueNotFound
        );

        let mut confirmation = boost(" ");
        confirmation.payment_id = " ".into();
        assert_eq!(
            service.apply(confirmation).unwrap_err().code,
            ErrorCode::PaymentInvalid
        );
    }
}
