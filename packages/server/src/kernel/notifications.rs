//! Turns walk events into notifications.
//!
//! Delivery is best effort: a failed `notify` is logged and dropped, and a
//! lagging receiver skips what it missed.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BaseNotifier, EventHub, Notification};
use crate::domains::walks::events::WalkEvent;

/// Builds one notification per recipient of the event.
pub fn notifications_for(event: &WalkEvent) -> Vec<Notification> {
    let (title, body) = match event {
        WalkEvent::RequestCreated { .. } | WalkEvent::FeesSettled { .. } => return Vec::new(),
        WalkEvent::RequestCancelled { .. } => (
            "Walk request cancelled",
            "The owner cancelled a walk you bid on.".to_string(),
        ),
        WalkEvent::OfferSubmitted { price, .. } => (
            "New offer",
            format!("A walker offered {price} for your walk."),
        ),
        WalkEvent::OfferAccepted { .. } => (
            "Offer update",
            "The owner picked a walker for this walk.".to_string(),
        ),
        WalkEvent::OfferRejected { .. } => (
            "Offer declined",
            "The owner declined your offer.".to_string(),
        ),
        WalkEvent::WalkStarted { .. } => (
            "Walk started",
            "Your dog's walk has started.".to_string(),
        ),
        WalkEvent::WalkCompleted {
            duration_minutes, ..
        } => (
            "Walk completed",
            format!("The walk finished after {duration_minutes} minutes."),
        ),
        WalkEvent::WalkCancelled { reason, .. } => ("Walk cancelled", format!("Reason: {reason}")),
        WalkEvent::PaymentMarked { .. } => (
            "Payment received",
            "The owner marked your walk as paid.".to_string(),
        ),
    };

    let data = serde_json::to_value(event).unwrap_or_else(|_| json!({ "type": event.name() }));

    event
        .recipients()
        .into_iter()
        .map(|recipient_id| Notification {
            recipient_id,
            kind: event.name().to_string(),
            title: title.to_string(),
            body: body.clone(),
            data: data.clone(),
        })
        .collect()
}

/// Spawns the task that forwards hub events to the notifier until the hub
/// is dropped.
pub fn spawn_notification_dispatcher(
    hub: &EventHub,
    notifier: Arc<dyn BaseNotifier>,
) -> JoinHandle<()> {
    let mut rx = hub.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    for notification in notifications_for(&event) {
                        if let Err(e) = notifier.notify(&notification).await {
                            warn!(
                                error = %e,
                                kind = %notification.kind,
                                recipient = %notification.recipient_id,
                                "Notification delivery failed"
                            );
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification dispatcher lagged; events dropped");
                }
                Err(RecvError::Closed) => {
                    info!("Event hub closed; notification dispatcher stopping");
                    break;
                }
            }
        }
    })
}
