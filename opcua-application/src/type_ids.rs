//! Extensible-object type identifiers
//!
//! Every service message body starts with a 4-byte numeric node id naming
//! its binary encoding. The numeric values are the standard-namespace ids
//! assigned by the protocol; only the services this client implements are
//! listed.

use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaError, OpcUaResult};

pub const SERVICE_FAULT: u16 = 397;
pub const OPEN_SECURE_CHANNEL_REQUEST: u16 = 446;
pub const OPEN_SECURE_CHANNEL_RESPONSE: u16 = 449;
pub const CLOSE_SECURE_CHANNEL_REQUEST: u16 = 452;
pub const GET_ENDPOINTS_REQUEST: u16 = 428;
pub const GET_ENDPOINTS_RESPONSE: u16 = 431;
pub const CREATE_SESSION_REQUEST: u16 = 461;
pub const CREATE_SESSION_RESPONSE: u16 = 464;
pub const ACTIVATE_SESSION_REQUEST: u16 = 467;
pub const ACTIVATE_SESSION_RESPONSE: u16 = 470;
pub const CLOSE_SESSION_REQUEST: u16 = 473;
pub const CLOSE_SESSION_RESPONSE: u16 = 476;
pub const BROWSE_REQUEST: u16 = 527;
pub const BROWSE_RESPONSE: u16 = 530;
pub const READ_REQUEST: u16 = 631;
pub const READ_RESPONSE: u16 = 634;
pub const WRITE_REQUEST: u16 = 673;
pub const WRITE_RESPONSE: u16 = 676;
pub const CREATE_SUBSCRIPTION_REQUEST: u16 = 787;
pub const CREATE_SUBSCRIPTION_RESPONSE: u16 = 790;
pub const CREATE_MONITORED_ITEMS_REQUEST: u16 = 751;
pub const CREATE_MONITORED_ITEMS_RESPONSE: u16 = 754;
pub const DELETE_SUBSCRIPTIONS_REQUEST: u16 = 847;
pub const DELETE_SUBSCRIPTIONS_RESPONSE: u16 = 850;
pub const PUBLISH_REQUEST: u16 = 826;
pub const PUBLISH_RESPONSE: u16 = 829;

pub const ANONYMOUS_IDENTITY_TOKEN: u16 = 321;
pub const USERNAME_IDENTITY_TOKEN: u16 = 324;
pub const X509_IDENTITY_TOKEN: u16 = 327;

pub const DATA_CHANGE_NOTIFICATION: u16 = 811;

/// Encode a type identifier as its 4-byte numeric node id
pub fn encode_type_id(encoder: &mut BinaryEncoder, type_id: u16) {
    encoder.encode_node_id(&NodeId::numeric(type_id));
}

/// Decode a 4-byte numeric type identifier
pub fn decode_type_id(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<u16> {
    match decoder.decode_node_id()? {
        NodeId::Numeric { namespace: 0, id } => Ok(id),
        other => Err(OpcUaError::Decode(format!(
            "Expected a standard-namespace numeric type id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_layout() {
        let mut enc = BinaryEncoder::new();
        encode_type_id(&mut enc, OPEN_SECURE_CHANNEL_REQUEST);
        // 446 = 0x01BE
        assert_eq!(enc.as_bytes(), &[0x01, 0x00, 0xBE, 0x01]);

        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(decode_type_id(&mut dec).unwrap(), 446);
    }
}
