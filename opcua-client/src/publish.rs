//! Subscription publish loop
//!
//! One task per subscription keeps a publish request outstanding. The
//! first request goes out after three publishing intervals so the server
//! has a first sample queued; afterwards the loop paces itself at the
//! publishing interval. `BadTooManyPublishRequests` backs the loop off in
//! configured steps; `BadTimeout` and `BadNoSubscription` end it.

use crate::channel::Channel;
use crate::events::ClientEvent;
use opcua_application::message::ServiceResponse;
use opcua_application::subscription::{PublishRequest, SubscriptionAcknowledgement};
use opcua_core::{OpcUaError, StatusCode};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Delay before the first publish request
pub fn first_fire_delay(publishing_interval: Duration) -> Duration {
    publishing_interval * 3
}

/// Backoff after one more consecutive congestion response
pub fn next_backoff(current: Duration, step: Duration) -> Duration {
    current + step
}

/// How the loop should react to a publish outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishVerdict {
    /// Deliver notifications and continue at the publishing interval
    Continue,
    /// Server is saturated; wait an extra backoff step before retrying
    BackOff,
    /// Terminal status; stop the loop
    Stop,
}

/// Classify a publish service result
pub fn classify_status(status: StatusCode) -> PublishVerdict {
    match status {
        StatusCode::BadTooManyPublishRequests => PublishVerdict::BackOff,
        StatusCode::BadTimeout | StatusCode::BadNoSubscription => PublishVerdict::Stop,
        status if status.is_good() => PublishVerdict::Continue,
        // other failures are transient from the loop's point of view
        _ => PublishVerdict::BackOff,
    }
}

/// Drive the publish loop for one subscription until cancelled or stopped
pub async fn run_publish_loop(
    channel: Channel,
    subscription_id: u32,
    publishing_interval: Duration,
    backoff_step: Duration,
    events: mpsc::Sender<ClientEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut acks: Vec<SubscriptionAcknowledgement> = Vec::new();
    let mut backoff = Duration::ZERO;
    let mut wait = first_fire_delay(publishing_interval);

    loop {
        tokio::select! {
            _ = cancel.changed() => {
                log::debug!("Publish loop for subscription {} cancelled", subscription_id);
                return;
            }
            _ = tokio::time::sleep(wait + backoff) => {}
        }

        let request_id = channel.next_request_id();
        let request = PublishRequest {
            header: channel.request_header(request_id),
            subscription_acknowledgements: std::mem::take(&mut acks),
        };

        let status = match channel.call(request_id, &request).await {
            Ok(response) => {
                let status = response.service_result();
                if let ServiceResponse::Publish(publish) = response {
                    if status.is_good() {
                        if !publish.notification_message.is_keep_alive() {
                            acks.push(SubscriptionAcknowledgement {
                                subscription_id: publish.subscription_id,
                                sequence_number: publish.notification_message.sequence_number,
                            });
                        }
                        for notification in publish.notification_message.notifications {
                            for item in notification.monitored_items {
                                let event = ClientEvent::DataChange {
                                    subscription_id: publish.subscription_id,
                                    client_handle: item.client_handle,
                                    value: item.value,
                                };
                                if events.send(event).await.is_err() {
                                    // no listener left, keep servicing acks
                                    log::debug!("Dropping data change, no event listener");
                                }
                            }
                        }
                    }
                }
                status
            }
            Err(OpcUaError::Status(status)) => status,
            Err(e) => {
                log::warn!(
                    "Publish loop for subscription {} ending: {}",
                    subscription_id,
                    e
                );
                let _ = events
                    .send(ClientEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                let _ = events
                    .send(ClientEvent::SubscriptionStopped {
                        subscription_id,
                        status: StatusCode::BadCommunicationError,
                    })
                    .await;
                return;
            }
        };

        match classify_status(status) {
            PublishVerdict::Continue => {
                backoff = Duration::ZERO;
            }
            PublishVerdict::BackOff => {
                backoff = next_backoff(backoff, backoff_step);
                log::debug!(
                    "Publish congestion on subscription {}, backing off {:?}",
                    subscription_id,
                    backoff
                );
            }
            PublishVerdict::Stop => {
                log::info!(
                    "Publish loop for subscription {} stopped by {:?}",
                    subscription_id,
                    status
                );
                let _ = events
                    .send(ClientEvent::SubscriptionStopped {
                        subscription_id,
                        status,
                    })
                    .await;
                return;
            }
        }
        wait = publishing_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fire_is_three_intervals() {
        assert_eq!(
            first_fire_delay(Duration::from_millis(500)),
            Duration::from_millis(1_500)
        );
    }

    #[test]
    fn test_backoff_grows_in_hundred_ms_steps() {
        let step = Duration::from_millis(100);
        let first = next_backoff(Duration::ZERO, step);
        let second = next_backoff(first, step);
        assert_eq!(first, Duration::from_millis(100));
        assert_eq!(second, Duration::from_millis(200));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            classify_status(StatusCode::Good),
            PublishVerdict::Continue
        );
        assert_eq!(
            classify_status(StatusCode::BadTooManyPublishRequests),
            PublishVerdict::BackOff
        );
        assert_eq!(classify_status(StatusCode::BadTimeout), PublishVerdict::Stop);
        assert_eq!(
            classify_status(StatusCode::BadNoSubscription),
            PublishVerdict::Stop
        );
    }
}
