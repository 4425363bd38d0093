use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::applications::domain::ApplicationId;
use super::domain::UserId;

/// Message classes the program sends out; values match the registry's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    SelectedScholarship,
    SelectedVolunteer,
    Rejected,
    ProjectApproved,
    ProjectRejected,
    RevisionRequested,
    SignatureRecorded,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::SelectedScholarship => "SELECTED_SCHOLARSHIP",
            NotificationKind::SelectedVolunteer => "SELECTED_VOLUNTEER",
            NotificationKind::Rejected => "REJECTED",
            NotificationKind::ProjectApproved => "PROJECT_APPROVED",
            NotificationKind::ProjectRejected => "PROJECT_REJECTED",
            NotificationKind::RevisionRequested => "REVISION_REQUESTED",
            NotificationKind::SignatureRecorded => "SIGNATURE_RECORDED",
        }
    }
}

/// One outbound message, produced as data by the workflows and dispatched separately.
///
/// The core never persists these; a finalization call produces exactly one per
/// affected application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub recipient_email: String,
    pub kind: NotificationKind,
    pub payload: BTreeMap<String, String>,
}

/// Failures reported by a notifier for a single recipient.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("notifier rejected the message: {0}")]
    Rejected(String),
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
}

/// External delivery capability; the core counts failures and never retries.
pub trait Notifier: Send + Sync {
    fn send(&self, event: &NotificationEvent) -> Result<(), DeliveryError>;
}

/// Resolves people to mailable addresses, standing in for the account store.
pub trait RecipientDirectory: Send + Sync {
    fn email_of(&self, user: UserId) -> Option<String>;
    fn admin_emails(&self) -> Vec<String>;
}

/// Outcome tally of a dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sent: u32,
    pub failed: u32,
}

impl DispatchReport {
    pub const fn attempted(self) -> u32 {
        self.sent + self.failed
    }
}

/// Deliver a batch after the owning transaction has committed.
///
/// A failing recipient is logged and counted; the remaining events are still
/// attempted and the batch never propagates an error to the caller.
pub fn dispatch_all<N>(notifier: &N, events: &[NotificationEvent]) -> DispatchReport
where
    N: Notifier + ?Sized,
{
    let mut report = DispatchReport::default();
    for event in events {
        match notifier.send(event) {
            Ok(()) => report.sent += 1,
            Err(err) => {
                report.failed += 1;
                warn!(
                    recipient = %event.recipient_email,
                    kind = event.kind.label(),
                    error = %err,
                    "notification delivery failed"
                );
            }
        }
    }
    report
}

/// Default runtime notifier: logs the message instead of delivering it.
///
/// Real delivery lives outside this crate; the log line carries everything an
/// operator needs to trace what would have gone out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, event: &NotificationEvent) -> Result<(), DeliveryError> {
        info!(
            recipient = %event.recipient_email,
            kind = event.kind.label(),
            application = ?event.application_id,
            "notification queued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakyNotifier {
        reject: String,
        attempts: Mutex<Vec<String>>,
    }

    impl Notifier for FlakyNotifier {
        fn send(&self, event: &NotificationEvent) -> Result<(), DeliveryError> {
            self.attempts
                .lock()
                .expect("attempts mutex poisoned")
                .push(event.recipient_email.clone());
            if event.recipient_email == self.reject {
                Err(DeliveryError::Rejected("mailbox full".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn event_for(recipient: &str) -> NotificationEvent {
        NotificationEvent {
            application_id: Some(ApplicationId(1)),
            recipient_email: recipient.to_string(),
            kind: NotificationKind::Rejected,
            payload: BTreeMap::new(),
        }
    }

    #[test]
    fn dispatch_isolates_individual_failures() {
        let notifier = FlakyNotifier {
            reject: "b@uni.edu".to_string(),
            attempts: Mutex::new(Vec::new()),
        };
        let events = vec![
            event_for("a@uni.edu"),
            event_for("b@uni.edu"),
            event_for("c@uni.edu"),
        ];

        let report = dispatch_all(&notifier, &events);

        assert_eq!(report, DispatchReport { sent: 2, failed: 1 });
        assert_eq!(report.attempted(), 3);
        let attempts = notifier.attempts.lock().expect("attempts mutex poisoned");
        assert_eq!(attempts.len(), 3, "every recipient must be attempted");
    }

    #[test]
    fn dispatch_of_empty_batch_reports_zero() {
        let report = dispatch_all(&TracingNotifier, &[]);
        assert_eq!(report, DispatchReport::default());
    }
}
