//! Service message framing and response dispatch
//!
//! Every service body travels as a type-id-prefixed extensible object. The
//! response decoder switches on that prefix to produce a typed response,
//! so callers never inspect raw buffers.

use crate::discovery::GetEndpointsResponse;
use crate::header::ResponseHeader;
use crate::secure_channel::OpenSecureChannelResponse;
use crate::session::{
    ActivateSessionResponse, CloseSessionResponse, CreateSessionResponse,
};
use crate::subscription::{
    CreateMonitoredItemsResponse, CreateSubscriptionResponse, DeleteSubscriptionsResponse,
    PublishResponse,
};
use crate::attribute::{ReadResponse, WriteResponse};
use crate::type_ids::{self, decode_type_id, encode_type_id};
use crate::view::BrowseResponse;
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{OpcUaError, OpcUaResult, StatusCode};

/// A service message body with its binary-encoding type id
pub trait MessageBody: Sized {
    /// Standard-namespace numeric id of this body's binary encoding
    const TYPE_ID: u16;

    fn encode_body(&self, encoder: &mut BinaryEncoder);

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self>;
}

/// Encode a message as its type id followed by the body
pub fn encode_message<T: MessageBody>(message: &T) -> Vec<u8> {
    let mut encoder = BinaryEncoder::new();
    encode_type_id(&mut encoder, T::TYPE_ID);
    message.encode_body(&mut encoder);
    encoder.into_bytes()
}

/// Decode a type-id-prefixed message of a known kind
pub fn decode_message<T: MessageBody>(bytes: &[u8]) -> OpcUaResult<T> {
    let mut decoder = BinaryDecoder::new(bytes);
    let type_id = decode_type_id(&mut decoder)?;
    if type_id != T::TYPE_ID {
        return Err(OpcUaError::Decode(format!(
            "Expected message type {}, got {}",
            T::TYPE_ID,
            type_id
        )));
    }
    T::decode_body(&mut decoder)
}

/// Every response the server can send over an established channel
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse {
    OpenSecureChannel(OpenSecureChannelResponse),
    GetEndpoints(GetEndpointsResponse),
    CreateSession(CreateSessionResponse),
    ActivateSession(ActivateSessionResponse),
    CloseSession(CloseSessionResponse),
    Browse(BrowseResponse),
    Read(ReadResponse),
    Write(WriteResponse),
    CreateSubscription(CreateSubscriptionResponse),
    CreateMonitoredItems(CreateMonitoredItemsResponse),
    DeleteSubscriptions(DeleteSubscriptionsResponse),
    Publish(PublishResponse),
    /// A fault in place of the expected response; only the header arrives
    ServiceFault(ResponseHeader),
}

impl ServiceResponse {
    /// The response header, whichever body arrived
    pub fn header(&self) -> &ResponseHeader {
        match self {
            ServiceResponse::OpenSecureChannel(r) => &r.header,
            ServiceResponse::GetEndpoints(r) => &r.header,
            ServiceResponse::CreateSession(r) => &r.header,
            ServiceResponse::ActivateSession(r) => &r.header,
            ServiceResponse::CloseSession(r) => &r.header,
            ServiceResponse::Browse(r) => &r.header,
            ServiceResponse::Read(r) => &r.header,
            ServiceResponse::Write(r) => &r.header,
            ServiceResponse::CreateSubscription(r) => &r.header,
            ServiceResponse::CreateMonitoredItems(r) => &r.header,
            ServiceResponse::DeleteSubscriptions(r) => &r.header,
            ServiceResponse::Publish(r) => &r.header,
            ServiceResponse::ServiceFault(header) => header,
        }
    }

    /// Request handle this response answers
    pub fn request_handle(&self) -> u32 {
        self.header().request_handle
    }

    /// Overall service outcome
    pub fn service_result(&self) -> StatusCode {
        self.header().service_result
    }

    /// Fail on a non-Good service result, pass the response through otherwise
    pub fn into_good(self) -> OpcUaResult<Self> {
        let status = self.service_result();
        if status.is_good() {
            Ok(self)
        } else {
            Err(OpcUaError::Status(status))
        }
    }
}

/// Decode a response body by its type-id prefix
pub fn decode_service_response(bytes: &[u8]) -> OpcUaResult<ServiceResponse> {
    let mut decoder = BinaryDecoder::new(bytes);
    let type_id = decode_type_id(&mut decoder)?;
    let response = match type_id {
        type_ids::OPEN_SECURE_CHANNEL_RESPONSE => {
            ServiceResponse::OpenSecureChannel(OpenSecureChannelResponse::decode_body(&mut decoder)?)
        }
        type_ids::GET_ENDPOINTS_RESPONSE => {
            ServiceResponse::GetEndpoints(GetEndpointsResponse::decode_body(&mut decoder)?)
        }
        type_ids::CREATE_SESSION_RESPONSE => {
            ServiceResponse::CreateSession(CreateSessionResponse::decode_body(&mut decoder)?)
        }
        type_ids::ACTIVATE_SESSION_RESPONSE => {
            ServiceResponse::ActivateSession(ActivateSessionResponse::decode_body(&mut decoder)?)
        }
        type_ids::CLOSE_SESSION_RESPONSE => {
            ServiceResponse::CloseSession(CloseSessionResponse::decode_body(&mut decoder)?)
        }
        type_ids::BROWSE_RESPONSE => {
            ServiceResponse::Browse(BrowseResponse::decode_body(&mut decoder)?)
        }
        type_ids::READ_RESPONSE => {
            ServiceResponse::Read(ReadResponse::decode_body(&mut decoder)?)
        }
        type_ids::WRITE_RESPONSE => {
            ServiceResponse::Write(WriteResponse::decode_body(&mut decoder)?)
        }
        type_ids::CREATE_SUBSCRIPTION_RESPONSE => ServiceResponse::CreateSubscription(
            CreateSubscriptionResponse::decode_body(&mut decoder)?,
        ),
        type_ids::CREATE_MONITORED_ITEMS_RESPONSE => ServiceResponse::CreateMonitoredItems(
            CreateMonitoredItemsResponse::decode_body(&mut decoder)?,
        ),
        type_ids::DELETE_SUBSCRIPTIONS_RESPONSE => ServiceResponse::DeleteSubscriptions(
            DeleteSubscriptionsResponse::decode_body(&mut decoder)?,
        ),
        type_ids::PUBLISH_RESPONSE => {
            ServiceResponse::Publish(PublishResponse::decode_body(&mut decoder)?)
        }
        type_ids::SERVICE_FAULT => {
            ServiceResponse::ServiceFault(ResponseHeader::decode(&mut decoder)?)
        }
        other => {
            return Err(OpcUaError::Decode(format!(
                "Unknown response type id {}",
                other
            )))
        }
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::RequestHeader;
    use crate::session::CloseSessionRequest;
    use opcua_core::NodeId;

    #[test]
    fn test_round_trip_through_type_prefix() {
        let request = CloseSessionRequest {
            header: RequestHeader::new(NodeId::numeric(9), 6),
            delete_subscriptions: true,
        };
        let bytes = encode_message(&request);
        let decoded: CloseSessionRequest = decode_message(&bytes).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let request = CloseSessionRequest {
            header: RequestHeader::new(NodeId::null(), 6),
            delete_subscriptions: false,
        };
        let bytes = encode_message(&request);
        assert!(decode_message::<crate::session::CreateSessionRequest>(&bytes).is_err());
    }

    #[test]
    fn test_dispatch_selects_variant() {
        let response = CloseSessionResponse {
            header: ResponseHeader::good(6),
        };
        let bytes = encode_message(&response);
        match decode_service_response(&bytes).unwrap() {
            ServiceResponse::CloseSession(decoded) => assert_eq!(decoded, response),
            other => panic!("wrong variant {:?}", other),
        }
    }

    #[test]
    fn test_fault_carries_failure_status() {
        let fault = ResponseHeader::with_status(8, StatusCode::BadSessionIdInvalid);
        let mut encoder = BinaryEncoder::new();
        encode_type_id(&mut encoder, type_ids::SERVICE_FAULT);
        fault.encode(&mut encoder);
        let bytes = encoder.into_bytes();

        let response = decode_service_response(&bytes).unwrap();
        assert_eq!(response.request_handle(), 8);
        assert_eq!(
            response.service_result(),
            StatusCode::BadSessionIdInvalid
        );
        assert!(matches!(
            response.into_good(),
            Err(OpcUaError::Status(StatusCode::BadSessionIdInvalid))
        ));
    }

    #[test]
    fn test_unknown_type_id_is_decode_failure() {
        let mut encoder = BinaryEncoder::new();
        encode_type_id(&mut encoder, 9_999);
        let bytes = encoder.into_bytes();
        assert!(decode_service_response(&bytes).is_err());
    }
}
