//! Fire-and-forget workflow notifications.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{NotificationSink, RecipientResolver};
use crate::workflow::WorkflowNotification;

/// Resolves recipients and hands notifications to the sink.
///
/// Delivery failures are logged and dropped: a transition that has been
/// committed is never undone because a notification could not be sent.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    resolver: Arc<dyn RecipientResolver>,
}

impl Notifier {
    /// Creates a notifier.
    pub fn new(sink: Arc<dyn NotificationSink>, resolver: Arc<dyn RecipientResolver>) -> Self {
        Self { sink, resolver }
    }

    /// Publishes one notification.
    pub fn publish(&self, mut notification: WorkflowNotification) {
        match self.resolver.recipients(&notification) {
            Ok(recipients) => notification.recipients = recipients,
            Err(err) => warn!(
                entity_id = %notification.entity_id,
                error = %err,
                "Recipient resolution failed; sending without recipients"
            ),
        }

        match self.sink.notify(&notification) {
            Ok(()) => debug!(
                entity_id = %notification.entity_id,
                to = %notification.to,
                recipients = notification.recipients.len(),
                "Notification sent"
            ),
            Err(err) => warn!(
                entity_id = %notification.entity_id,
                to = %notification.to,
                error = %err,
                "Notification delivery failed"
            ),
        }
    }
}
