//! Attribute services: Read and Write

use crate::header::{RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{READ_REQUEST, READ_RESPONSE, WRITE_REQUEST, WRITE_RESPONSE};
use crate::types::{
    decode_status_array, encode_status_array, DataValue, DiagnosticInfo, QualifiedName,
};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaResult, StatusCode};

/// Attribute ids the client reads and writes
pub const ATTRIBUTE_VALUE: u32 = 13;
pub const ATTRIBUTE_DISPLAY_NAME: u32 = 4;
pub const ATTRIBUTE_DATA_TYPE: u32 = 14;

/// Which timestamps the server should attach to returned values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampsToReturn {
    Source = 0,
    Server = 1,
    Both = 2,
    Neither = 3,
}

impl TimestampsToReturn {
    pub fn from_id(id: u32) -> OpcUaResult<Self> {
        match id {
            0 => Ok(TimestampsToReturn::Source),
            1 => Ok(TimestampsToReturn::Server),
            2 => Ok(TimestampsToReturn::Both),
            3 => Ok(TimestampsToReturn::Neither),
            _ => Err(opcua_core::OpcUaError::Decode(format!(
                "Invalid timestamps-to-return value: {}",
                id
            ))),
        }
    }
}

/// One node/attribute pair to read
#[derive(Debug, Clone, PartialEq)]
pub struct ReadValueId {
    pub node_id: NodeId,
    pub attribute_id: u32,
    pub index_range: Option<String>,
    pub data_encoding: QualifiedName,
}

impl ReadValueId {
    /// Read the Value attribute of a node
    pub fn value_of(node_id: NodeId) -> Self {
        Self {
            node_id,
            attribute_id: ATTRIBUTE_VALUE,
            index_range: None,
            data_encoding: QualifiedName::default(),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_node_id(&self.node_id);
        encoder.encode_u32(self.attribute_id);
        encoder.encode_string(self.index_range.as_deref());
        self.data_encoding.encode(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            node_id: decoder.decode_node_id()?,
            attribute_id: decoder.decode_u32()?,
            index_range: decoder.decode_string()?,
            data_encoding: QualifiedName::decode(decoder)?,
        })
    }
}

/// Read one or more attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub header: RequestHeader,
    /// Oldest acceptable cached value age in milliseconds; 0 forces a
    /// fresh read from the source
    pub max_age: f64,
    pub timestamps_to_return: TimestampsToReturn,
    pub nodes_to_read: Vec<ReadValueId>,
}

impl MessageBody for ReadRequest {
    const TYPE_ID: u16 = READ_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_f64(self.max_age);
        encoder.encode_u32(self.timestamps_to_return as u32);
        encoder.encode_array_len(self.nodes_to_read.len());
        for node in &self.nodes_to_read {
            node.encode(encoder);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let max_age = decoder.decode_f64()?;
        let timestamps_to_return = TimestampsToReturn::from_id(decoder.decode_u32()?)?;
        let count = decoder.decode_array_len()?;
        let mut nodes_to_read = Vec::with_capacity(count);
        for _ in 0..count {
            nodes_to_read.push(ReadValueId::decode(decoder)?);
        }
        Ok(Self {
            header,
            max_age,
            timestamps_to_return,
            nodes_to_read,
        })
    }
}

/// Values in request order, one per node read
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResponse {
    pub header: ResponseHeader,
    pub results: Vec<DataValue>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for ReadResponse {
    const TYPE_ID: u16 = READ_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_array_len(self.results.len());
        for value in &self.results {
            value.encode(encoder);
        }
        DiagnosticInfo::encode_array(&self.diagnostic_infos, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = ResponseHeader::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(DataValue::decode(decoder)?);
        }
        Ok(Self {
            header,
            results,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

/// One node/attribute pair with the value to write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteValue {
    pub node_id: NodeId,
    pub attribute_id: u32,
    pub index_range: Option<String>,
    pub value: DataValue,
}

impl WriteValue {
    /// Write the Value attribute of a node
    pub fn value_of(node_id: NodeId, value: DataValue) -> Self {
        Self {
            node_id,
            attribute_id: ATTRIBUTE_VALUE,
            index_range: None,
            value,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_node_id(&self.node_id);
        encoder.encode_u32(self.attribute_id);
        encoder.encode_string(self.index_range.as_deref());
        self.value.encode(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            node_id: decoder.decode_node_id()?,
            attribute_id: decoder.decode_u32()?,
            index_range: decoder.decode_string()?,
            value: DataValue::decode(decoder)?,
        })
    }
}

/// Write one or more attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub header: RequestHeader,
    pub nodes_to_write: Vec<WriteValue>,
}

impl MessageBody for WriteRequest {
    const TYPE_ID: u16 = WRITE_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_array_len(self.nodes_to_write.len());
        for node in &self.nodes_to_write {
            node.encode(encoder);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut nodes_to_write = Vec::with_capacity(count);
        for _ in 0..count {
            nodes_to_write.push(WriteValue::decode(decoder)?);
        }
        Ok(Self {
            header,
            nodes_to_write,
        })
    }
}

/// Per-write status codes in request order
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResponse {
    pub header: ResponseHeader,
    pub results: Vec<StatusCode>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for WriteResponse {
    const TYPE_ID: u16 = WRITE_RESPONSE;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variant;

    fn round_trip<T: MessageBody + PartialEq + std::fmt::Debug>(value: &T) {
        let mut enc = BinaryEncoder::new();
        value.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(&T::decode_body(&mut dec).unwrap(), value);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_read_round_trip() {
        round_trip(&ReadRequest {
            header: RequestHeader::new(NodeId::numeric(7), 10),
            max_age: 0.0,
            timestamps_to_return: TimestampsToReturn::Both,
            nodes_to_read: vec![
                ReadValueId::value_of(NodeId::String {
                    namespace: 2,
                    id: "Motor.Speed".into(),
                }),
                ReadValueId::value_of(NodeId::numeric(2258)),
            ],
        });
        round_trip(&ReadResponse {
            header: ResponseHeader::good(10),
            results: vec![
                DataValue {
                    value: Some(Variant::Double(1480.5)),
                    status: None,
                    source_timestamp: Some(1_000),
                    server_timestamp: Some(1_001),
                },
                DataValue {
                    value: None,
                    status: Some(StatusCode::BadNodeIdUnknown),
                    source_timestamp: None,
                    server_timestamp: None,
                },
            ],
            diagnostic_infos: Vec::new(),
        });
    }

    #[test]
    fn test_write_round_trip() {
        round_trip(&WriteRequest {
            header: RequestHeader::new(NodeId::numeric(7), 11),
            nodes_to_write: vec![WriteValue::value_of(
                NodeId::String {
                    namespace: 2,
                    id: "Setpoint".into(),
                },
                DataValue::from_value(Variant::Float(55.5)),
            )],
        });
        round_trip(&WriteResponse {
            header: ResponseHeader::good(11),
            results: vec![StatusCode::Good, StatusCode::BadNotWritable],
            diagnostic_infos: Vec::new(),
        });
    }
}
