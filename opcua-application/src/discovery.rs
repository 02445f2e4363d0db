//! Endpoint discovery

use crate::header::{RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{GET_ENDPOINTS_REQUEST, GET_ENDPOINTS_RESPONSE};
use crate::types::{decode_string_array, encode_string_array, EndpointDescription};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::OpcUaResult;

/// Ask the server which endpoints it offers
#[derive(Debug, Clone, PartialEq)]
pub struct GetEndpointsRequest {
    pub header: RequestHeader,
    pub endpoint_url: Option<String>,
    pub locale_ids: Vec<String>,
    pub profile_uris: Vec<String>,
}

impl GetEndpointsRequest {
    pub fn new(header: RequestHeader, endpoint_url: &str) -> Self {
        Self {
            header,
            endpoint_url: Some(endpoint_url.to_string()),
            locale_ids: Vec::new(),
            profile_uris: Vec::new(),
        }
    }
}

impl MessageBody for GetEndpointsRequest {
    const TYPE_ID: u16 = GET_ENDPOINTS_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_string(self.endpoint_url.as_deref());
        encode_string_array(encoder, &self.locale_ids);
        encode_string_array(encoder, &self.profile_uris);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: RequestHeader::decode(decoder)?,
            endpoint_url: decoder.decode_string()?,
            locale_ids: decode_string_array(decoder)?,
            profile_uris: decode_string_array(decoder)?,
        })
    }
}

/// Endpoints the server offers
#[derive(Debug, Clone, PartialEq)]
pub struct GetEndpointsResponse {
    pub header: ResponseHeader,
    pub endpoints: Vec<EndpointDescription>,
}

impl MessageBody for GetEndpointsResponse {
    const TYPE_ID: u16 = GET_ENDPOINTS_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        EndpointDescription::encode_array(&self.endpoints, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
            endpoints: EndpointDescription::decode_array(decoder)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApplicationDescription, UserTokenPolicy};
    use opcua_core::NodeId;
    use opcua_security::MessageSecurityMode;

    #[test]
    fn test_get_endpoints_round_trip() {
        let request =
            GetEndpointsRequest::new(RequestHeader::new(NodeId::null(), 2), "opc.tcp://h:4840");
        let mut enc = BinaryEncoder::new();
        request.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(GetEndpointsRequest::decode_body(&mut dec).unwrap(), request);

        let response = GetEndpointsResponse {
            header: ResponseHeader::good(2),
            endpoints: vec![EndpointDescription {
                endpoint_url: Some("opc.tcp://h:4840".into()),
                server: ApplicationDescription::client("urn:h", "h"),
                server_certificate: None,
                security_mode: MessageSecurityMode::None,
                security_policy_uri: Some(
                    "http://opcfoundation.org/UA/SecurityPolicy#None".into(),
                ),
                user_identity_tokens: vec![UserTokenPolicy::anonymous("anon")],
                transport_profile_uri: None,
                security_level: 0,
            }],
        };
        let mut enc = BinaryEncoder::new();
        response.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(
            GetEndpointsResponse::decode_body(&mut dec).unwrap(),
            response
        );
        assert_eq!(dec.remaining(), 0);
    }
}
