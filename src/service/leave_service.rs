//! Leave application submission and review.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::notifier::Notifier;
use super::ports::{ApprovalAuthority, LeaveStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveStatus};
use crate::workflow::{
    LeaveAction, LeaveRequest, NotificationSubject, WorkflowNotification, apply_leave_transition,
    new_leave_application,
};

/// Accepts leave applications and moves them through review.
#[derive(Clone)]
pub struct LeaveService {
    leaves: Arc<dyn LeaveStore>,
    authority: Arc<dyn ApprovalAuthority>,
    notifier: Notifier,
}

impl LeaveService {
    /// Creates a service.
    pub fn new(
        leaves: Arc<dyn LeaveStore>,
        authority: Arc<dyn ApprovalAuthority>,
        notifier: Notifier,
    ) -> Self {
        Self {
            leaves,
            authority,
            notifier,
        }
    }

    /// Fetches an application by id.
    pub fn get_leave(&self, id: Uuid) -> EngineResult<LeaveApplication> {
        self.leaves.get(id)
    }

    /// Files a new pending application.
    pub fn submit_leave(&self, request: LeaveRequest) -> EngineResult<LeaveApplication> {
        let application = new_leave_application(request, Utc::now())?;
        self.leaves.insert(application.clone())?;
        info!(
            leave_id = %application.id,
            officer_id = %application.officer_id,
            start = %application.start_date,
            end = %application.end_date,
            total_days = application.total_days,
            "Leave application submitted"
        );
        Ok(application)
    }

    /// `pending -> approved`.
    pub fn approve_leave(
        &self,
        id: Uuid,
        reviewer_id: &str,
        comments: Option<String>,
    ) -> EngineResult<LeaveApplication> {
        self.transition(
            id,
            LeaveAction::Approve {
                reviewer_id: reviewer_id.to_string(),
                comments,
            },
        )
    }

    /// `pending -> rejected`.
    pub fn reject_leave(
        &self,
        id: Uuid,
        reviewer_id: &str,
        reason: &str,
    ) -> EngineResult<LeaveApplication> {
        self.transition(
            id,
            LeaveAction::Reject {
                reviewer_id: reviewer_id.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// `pending -> cancelled`, by the applicant.
    pub fn cancel_leave(&self, id: Uuid, officer_id: &str) -> EngineResult<LeaveApplication> {
        self.transition(
            id,
            LeaveAction::Cancel {
                officer_id: officer_id.to_string(),
            },
        )
    }

    fn transition(&self, id: Uuid, action: LeaveAction) -> EngineResult<LeaveApplication> {
        let outcome = self.try_transition(id, &action);
        match &outcome {
            Ok(application) => {
                info!(
                    leave_id = %application.id,
                    officer_id = %application.officer_id,
                    action = action.name(),
                    to = %application.status,
                    "Leave transition accepted"
                );
                let actor = match &action {
                    LeaveAction::Approve { reviewer_id, .. }
                    | LeaveAction::Reject { reviewer_id, .. } => reviewer_id.clone(),
                    LeaveAction::Cancel { officer_id } => officer_id.clone(),
                };
                self.notifier.publish(WorkflowNotification {
                    subject: NotificationSubject::Leave,
                    entity_id: application.id,
                    officer_id: application.officer_id.clone(),
                    from: LeaveStatus::Pending.to_string(),
                    to: application.status.to_string(),
                    actor,
                    recipients: Vec::new(),
                });
            }
            Err(err) => warn!(
                leave_id = %id,
                action = action.name(),
                error = %err,
                "Leave transition rejected"
            ),
        }
        outcome
    }

    fn try_transition(&self, id: Uuid, action: &LeaveAction) -> EngineResult<LeaveApplication> {
        if let Some(reviewer) = action.reviewer() {
            if !self.authority.can_approve(reviewer) {
                return Err(EngineError::PermissionDenied {
                    actor: reviewer.to_string(),
                    action: format!("{} applications", action.name()),
                });
            }
        }
        let current = self.leaves.get(id)?;
        let next = apply_leave_transition(&current, action, Utc::now())?;
        self.leaves.compare_and_set(id, LeaveStatus::Pending, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveType;
    use crate::service::{AllowListAuthority, InMemoryLeaveStore, RecordingSink, StaticRecipients};
    use chrono::NaiveDate;

    fn service() -> (LeaveService, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let service = LeaveService::new(
            Arc::new(InMemoryLeaveStore::new()),
            Arc::new(AllowListAuthority::new(["rev_01"])),
            Notifier::new(sink.clone(), Arc::new(StaticRecipients::default())),
        );
        (service, sink)
    }

    fn request() -> LeaveRequest {
        LeaveRequest {
            officer_id: "off_001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 8).unwrap(),
            leave_type: LeaveType::Casual,
            reason: "Travel to home town".to_string(),
        }
    }

    #[test]
    fn test_submit_then_approve() {
        let (service, sink) = service();
        let application = service.submit_leave(request()).unwrap();
        let approved = service
            .approve_leave(application.id, "rev_01", Some("Approved".to_string()))
            .unwrap();

        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(service.get_leave(application.id).unwrap().status, LeaveStatus::Approved);
        assert_eq!(sink.sent().len(), 1);
        assert_eq!(sink.sent()[0].subject, NotificationSubject::Leave);
    }

    #[test]
    fn test_second_decision_is_state_conflict() {
        let (service, _) = service();
        let application = service.submit_leave(request()).unwrap();
        service.approve_leave(application.id, "rev_01", None).unwrap();

        let err = service
            .reject_leave(application.id, "rev_01", "Changed my mind about this one")
            .unwrap_err();
        assert!(matches!(err, EngineError::StateConflict { .. }));
    }

    #[test]
    fn test_reviewer_needs_authority() {
        let (service, sink) = service();
        let application = service.submit_leave(request()).unwrap();
        let err = service
            .approve_leave(application.id, "off_002", None)
            .unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied { .. }));
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn test_cancel_by_applicant() {
        let (service, _) = service();
        let application = service.submit_leave(request()).unwrap();
        assert!(service.cancel_leave(application.id, "off_009").is_err());
        let cancelled = service.cancel_leave(application.id, "off_001").unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    }
}
