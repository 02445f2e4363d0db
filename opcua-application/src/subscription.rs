//! Subscription and publish services

use crate::attribute::{ReadValueId, TimestampsToReturn};
use crate::header::{RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{
    CREATE_MONITORED_ITEMS_REQUEST, CREATE_MONITORED_ITEMS_RESPONSE,
    CREATE_SUBSCRIPTION_REQUEST, CREATE_SUBSCRIPTION_RESPONSE, DATA_CHANGE_NOTIFICATION,
    DELETE_SUBSCRIPTIONS_REQUEST, DELETE_SUBSCRIPTIONS_RESPONSE, PUBLISH_REQUEST,
    PUBLISH_RESPONSE,
};
use crate::types::{
    decode_extension_object, decode_status_array, encode_extension_object,
    encode_null_extension_object, encode_status_array, DataValue, DiagnosticInfo,
};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{OpcUaError, OpcUaResult, StatusCode};

/// Create a subscription that the publish loop will service
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionRequest {
    pub header: RequestHeader,
    /// Publishing interval in milliseconds
    pub requested_publishing_interval: f64,
    /// Keep-alive and lifetime expressed in publishing cycles
    pub requested_lifetime_count: u32,
    pub requested_max_keep_alive_count: u32,
    pub max_notifications_per_publish: u32,
    pub publishing_enabled: bool,
    pub priority: u8,
}

impl CreateSubscriptionRequest {
    pub fn new(header: RequestHeader, publishing_interval_ms: f64) -> Self {
        Self {
            header,
            requested_publishing_interval: publishing_interval_ms,
            requested_lifetime_count: 600,
            requested_max_keep_alive_count: 20,
            max_notifications_per_publish: 0,
            publishing_enabled: true,
            priority: 0,
        }
    }
}

impl MessageBody for CreateSubscriptionRequest {
    const TYPE_ID: u16 = CREATE_SUBSCRIPTION_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_f64(self.requested_publishing_interval);
        encoder.encode_u32(self.requested_lifetime_count);
        encoder.encode_u32(self.requested_max_keep_alive_count);
        encoder.encode_u32(self.max_notifications_per_publish);
        encoder.encode_bool(self.publishing_enabled);
        encoder.encode_u8(self.priority);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: RequestHeader::decode(decoder)?,
            requested_publishing_interval: decoder.decode_f64()?,
            requested_lifetime_count: decoder.decode_u32()?,
            requested_max_keep_alive_count: decoder.decode_u32()?,
            max_notifications_per_publish: decoder.decode_u32()?,
            publishing_enabled: decoder.decode_bool()?,
            priority: decoder.decode_u8()?,
        })
    }
}

/// Subscription id and the revised timing the server granted
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionResponse {
    pub header: ResponseHeader,
    pub subscription_id: u32,
    pub revised_publishing_interval: f64,
    pub revised_lifetime_count: u32,
    pub revised_max_keep_alive_count: u32,
}

impl MessageBody for CreateSubscriptionResponse {
    const TYPE_ID: u16 = CREATE_SUBSCRIPTION_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_u32(self.subscription_id);
        encoder.encode_f64(self.revised_publishing_interval);
        encoder.encode_u32(self.revised_lifetime_count);
        encoder.encode_u32(self.revised_max_keep_alive_count);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
            subscription_id: decoder.decode_u32()?,
            revised_publishing_interval: decoder.decode_f64()?,
            revised_lifetime_count: decoder.decode_u32()?,
            revised_max_keep_alive_count: decoder.decode_u32()?,
        })
    }
}

/// Sampling configuration for one monitored item
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringParameters {
    /// Handle echoed back in every notification for this item
    pub client_handle: u32,
    /// Sampling interval in milliseconds; -1 inherits the publishing interval
    pub sampling_interval: f64,
    pub queue_size: u32,
    pub discard_oldest: bool,
}

impl MonitoringParameters {
    pub fn new(client_handle: u32) -> Self {
        Self {
            client_handle,
            sampling_interval: -1.0,
            queue_size: 1,
            discard_oldest: true,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.client_handle);
        encoder.encode_f64(self.sampling_interval);
        // no filter
        encode_null_extension_object(encoder);
        encoder.encode_u32(self.queue_size);
        encoder.encode_bool(self.discard_oldest);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let client_handle = decoder.decode_u32()?;
        let sampling_interval = decoder.decode_f64()?;
        let _filter = decode_extension_object(decoder)?;
        Ok(Self {
            client_handle,
            sampling_interval,
            queue_size: decoder.decode_u32()?,
            discard_oldest: decoder.decode_bool()?,
        })
    }
}

/// One item to add to a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemCreateRequest {
    pub item_to_monitor: ReadValueId,
    /// 0 disabled, 1 sampling, 2 reporting
    pub monitoring_mode: u32,
    pub requested_parameters: MonitoringParameters,
}

impl MonitoredItemCreateRequest {
    /// Monitor a node's Value attribute in reporting mode
    pub fn reporting(item_to_monitor: ReadValueId, client_handle: u32) -> Self {
        Self {
            item_to_monitor,
            monitoring_mode: 2,
            requested_parameters: MonitoringParameters::new(client_handle),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        self.item_to_monitor.encode(encoder);
        encoder.encode_u32(self.monitoring_mode);
        self.requested_parameters.encode(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            item_to_monitor: ReadValueId::decode(decoder)?,
            monitoring_mode: decoder.decode_u32()?,
            requested_parameters: MonitoringParameters::decode(decoder)?,
        })
    }
}

/// Add monitored items to an existing subscription
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMonitoredItemsRequest {
    pub header: RequestHeader,
    pub subscription_id: u32,
    pub timestamps_to_return: TimestampsToReturn,
    pub items_to_create: Vec<MonitoredItemCreateRequest>,
}

impl MessageBody for CreateMonitoredItemsRequest {
    const TYPE_ID: u16 = CREATE_MONITORED_ITEMS_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_u32(self.subscription_id);
        encoder.encode_u32(self.timestamps_to_return as u32);
        encoder.encode_array_len(self.items_to_create.len());
        for item in &self.items_to_create {
            item.encode(encoder);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let subscription_id = decoder.decode_u32()?;
        let timestamps_to_return = TimestampsToReturn::from_id(decoder.decode_u32()?)?;
        let count = decoder.decode_array_len()?;
        let mut items_to_create = Vec::with_capacity(count);
        for _ in 0..count {
            items_to_create.push(MonitoredItemCreateRequest::decode(decoder)?);
        }
        Ok(Self {
            header,
            subscription_id,
            timestamps_to_return,
            items_to_create,
        })
    }
}

/// Outcome for one created monitored item
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemCreateResult {
    pub status: StatusCode,
    pub monitored_item_id: u32,
    pub revised_sampling_interval: f64,
    pub revised_queue_size: u32,
}

impl MonitoredItemCreateResult {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_status(self.status);
        encoder.encode_u32(self.monitored_item_id);
        encoder.encode_f64(self.revised_sampling_interval);
        encoder.encode_u32(self.revised_queue_size);
        encode_null_extension_object(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let result = Self {
            status: decoder.decode_status()?,
            monitored_item_id: decoder.decode_u32()?,
            revised_sampling_interval: decoder.decode_f64()?,
            revised_queue_size: decoder.decode_u32()?,
        };
        let _filter_result = decode_extension_object(decoder)?;
        Ok(result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMonitoredItemsResponse {
    pub header: ResponseHeader,
    pub results: Vec<MonitoredItemCreateResult>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for CreateMonitoredItemsResponse {
    const TYPE_ID: u16 = CREATE_MONITORED_ITEMS_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_array_len(self.results.len());
        for result in &self.results {
            result.encode(encoder);
        }
        DiagnosticInfo::encode_array(&self.diagnostic_infos, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = ResponseHeader::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(MonitoredItemCreateResult::decode(decoder)?);
        }
        Ok(Self {
            header,
            results,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

/// Remove subscriptions and their monitored items
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSubscriptionsRequest {
    pub header: RequestHeader,
    pub subscription_ids: Vec<u32>,
}

impl MessageBody for DeleteSubscriptionsRequest {
    const TYPE_ID: u16 = DELETE_SUBSCRIPTIONS_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_array_len(self.subscription_ids.len());
        for id in &self.subscription_ids {
            encoder.encode_u32(*id);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut subscription_ids = Vec::with_capacity(count);
        for _ in 0..count {
            subscription_ids.push(decoder.decode_u32()?);
        }
        Ok(Self {
            header,
            subscription_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSubscriptionsResponse {
    pub header: ResponseHeader,
    pub results: Vec<StatusCode>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for DeleteSubscriptionsResponse {
    const TYPE_ID: u16 = DELETE_SUBSCRIPTIONS_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encode_status_array(encoder, &self.results);
        DiagnosticInfo::encode_array(&self.diagnostic_infos, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
            results: decode_status_array(decoder)?,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

/// Acknowledges a notification so the server can release it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionAcknowledgement {
    pub subscription_id: u32,
    pub sequence_number: u32,
}

impl SubscriptionAcknowledgement {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.subscription_id);
        encoder.encode_u32(self.sequence_number);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            subscription_id: decoder.decode_u32()?,
            sequence_number: decoder.decode_u32()?,
        })
    }
}

/// Publish request carrying acknowledgements for delivered notifications
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub header: RequestHeader,
    pub subscription_acknowledgements: Vec<SubscriptionAcknowledgement>,
}

impl MessageBody for PublishRequest {
    const TYPE_ID: u16 = PUBLISH_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_array_len(self.subscription_acknowledgements.len());
        for ack in &self.subscription_acknowledgements {
            ack.encode(encoder);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut subscription_acknowledgements = Vec::with_capacity(count);
        for _ in 0..count {
            subscription_acknowledgements.push(SubscriptionAcknowledgement::decode(decoder)?);
        }
        Ok(Self {
            header,
            subscription_acknowledgements,
        })
    }
}

/// One value change for a monitored item
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemNotification {
    /// The client handle supplied when the item was created
    pub client_handle: u32,
    pub value: DataValue,
}

impl MonitoredItemNotification {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.client_handle);
        self.value.encode(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            client_handle: decoder.decode_u32()?,
            value: DataValue::decode(decoder)?,
        })
    }
}

/// Data-change notification carried inside a NotificationMessage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataChangeNotification {
    pub monitored_items: Vec<MonitoredItemNotification>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl DataChangeNotification {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        let mut body = BinaryEncoder::new();
        body.encode_array_len(self.monitored_items.len());
        for item in &self.monitored_items {
            item.encode(&mut body);
        }
        DiagnosticInfo::encode_array(&self.diagnostic_infos, &mut body);
        encode_extension_object(encoder, DATA_CHANGE_NOTIFICATION, body.as_bytes());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let (type_id, body) = decode_extension_object(decoder)?;
        if type_id != DATA_CHANGE_NOTIFICATION {
            return Err(OpcUaError::Decode(format!(
                "Expected a data-change notification, got type id {}",
                type_id
            )));
        }
        let body = body.unwrap_or_default();
        let mut body = BinaryDecoder::new(&body);
        let count = body.decode_array_len()?;
        let mut monitored_items = Vec::with_capacity(count);
        for _ in 0..count {
            monitored_items.push(MonitoredItemNotification::decode(&mut body)?);
        }
        Ok(Self {
            monitored_items,
            diagnostic_infos: DiagnosticInfo::decode_array(&mut body)?,
        })
    }
}

/// Sequence-numbered batch of notifications from one publish cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationMessage {
    pub sequence_number: u32,
    pub publish_time: i64,
    pub notifications: Vec<DataChangeNotification>,
}

impl NotificationMessage {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.sequence_number);
        encoder.encode_i64(self.publish_time);
        encoder.encode_array_len(self.notifications.len());
        for notification in &self.notifications {
            notification.encode(encoder);
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let sequence_number = decoder.decode_u32()?;
        let publish_time = decoder.decode_i64()?;
        let count = decoder.decode_array_len()?;
        let mut notifications = Vec::with_capacity(count);
        for _ in 0..count {
            notifications.push(DataChangeNotification::decode(decoder)?);
        }
        Ok(Self {
            sequence_number,
            publish_time,
            notifications,
        })
    }

    /// A keep-alive carries a sequence number but no notifications
    pub fn is_keep_alive(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Server's answer to a publish request
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResponse {
    pub header: ResponseHeader,
    pub subscription_id: u32,
    /// Sequence numbers the server still holds for retransmission
    pub available_sequence_numbers: Vec<u32>,
    pub more_notifications: bool,
    pub notification_message: NotificationMessage,
    pub results: Vec<StatusCode>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for PublishResponse {
    const TYPE_ID: u16 = PUBLISH_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_u32(self.subscription_id);
        encoder.encode_array_len(self.available_sequence_numbers.len());
        for sequence in &self.available_sequence_numbers {
            encoder.encode_u32(*sequence);
        }
        encoder.encode_bool(self.more_notifications);
        self.notification_message.encode(encoder);
        encode_status_array(encoder, &self.results);
        DiagnosticInfo::encode_array(&self.diagnostic_infos, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = ResponseHeader::decode(decoder)?;
        let subscription_id = decoder.decode_u32()?;
        let count = decoder.decode_array_len()?;
        let mut available_sequence_numbers = Vec::with_capacity(count);
        for _ in 0..count {
            available_sequence_numbers.push(decoder.decode_u32()?);
        }
        Ok(Self {
            header,
            subscription_id,
            available_sequence_numbers,
            more_notifications: decoder.decode_bool()?,
            notification_message: NotificationMessage::decode(decoder)?,
            results: decode_status_array(decoder)?,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::now_timestamp;
    use crate::types::Variant;
    use opcua_core::NodeId;

    fn round_trip<T: MessageBody + PartialEq + std::fmt::Debug>(value: &T) {
        let mut enc = BinaryEncoder::new();
        value.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(&T::decode_body(&mut dec).unwrap(), value);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_create_subscription_round_trip() {
        round_trip(&CreateSubscriptionRequest::new(
            RequestHeader::new(NodeId::numeric(7), 30),
            500.0,
        ));
        round_trip(&CreateSubscriptionResponse {
            header: ResponseHeader::good(30),
            subscription_id: 11,
            revised_publishing_interval: 1_000.0,
            revised_lifetime_count: 600,
            revised_max_keep_alive_count: 20,
        });
    }

    #[test]
    fn test_create_monitored_items_round_trip() {
        round_trip(&CreateMonitoredItemsRequest {
            header: RequestHeader::new(NodeId::numeric(7), 31),
            subscription_id: 11,
            timestamps_to_return: TimestampsToReturn::Both,
            items_to_create: vec![MonitoredItemCreateRequest::reporting(
                ReadValueId::value_of(NodeId::String {
                    namespace: 2,
                    id: "Motor.Speed".into(),
                }),
                1,
            )],
        });
        round_trip(&CreateMonitoredItemsResponse {
            header: ResponseHeader::good(31),
            results: vec![MonitoredItemCreateResult {
                status: StatusCode::Good,
                monitored_item_id: 101,
                revised_sampling_interval: 500.0,
                revised_queue_size: 1,
            }],
            diagnostic_infos: Vec::new(),
        });
    }

    #[test]
    fn test_publish_round_trip() {
        round_trip(&PublishRequest {
            header: RequestHeader::new(NodeId::numeric(7), 32),
            subscription_acknowledgements: vec![SubscriptionAcknowledgement {
                subscription_id: 11,
                sequence_number: 4,
            }],
        });
        round_trip(&PublishResponse {
            header: ResponseHeader::good(32),
            subscription_id: 11,
            available_sequence_numbers: vec![5],
            more_notifications: false,
            notification_message: NotificationMessage {
                sequence_number: 5,
                publish_time: now_timestamp(),
                notifications: vec![DataChangeNotification {
                    monitored_items: vec![MonitoredItemNotification {
                        client_handle: 1,
                        value: DataValue::from_value(Variant::Double(42.5)),
                    }],
                    diagnostic_infos: Vec::new(),
                }],
            },
            results: vec![StatusCode::Good],
            diagnostic_infos: Vec::new(),
        });
    }

    #[test]
    fn test_keep_alive_has_no_notifications() {
        let message = NotificationMessage {
            sequence_number: 9,
            publish_time: now_timestamp(),
            notifications: Vec::new(),
        };
        assert!(message.is_keep_alive());
    }

    #[test]
    fn test_delete_subscriptions_round_trip() {
        round_trip(&DeleteSubscriptionsRequest {
            header: RequestHeader::new(NodeId::numeric(7), 33),
            subscription_ids: vec![11],
        });
        round_trip(&DeleteSubscriptionsResponse {
            header: ResponseHeader::good(33),
            results: vec![StatusCode::Good],
            diagnostic_infos: Vec::new(),
        });
    }
}
