//! View service: browsing the address space

use crate::header::{RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{BROWSE_REQUEST, BROWSE_RESPONSE};
use crate::types::{DiagnosticInfo, LocalizedText, QualifiedName};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaError, OpcUaResult, StatusCode};

/// Which reference directions to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseDirection {
    Forward = 0,
    Inverse = 1,
    Both = 2,
}

impl BrowseDirection {
    pub fn from_id(id: u32) -> OpcUaResult<Self> {
        match id {
            0 => Ok(BrowseDirection::Forward),
            1 => Ok(BrowseDirection::Inverse),
            2 => Ok(BrowseDirection::Both),
            _ => Err(OpcUaError::Decode(format!(
                "Invalid browse direction: {}",
                id
            ))),
        }
    }
}

/// One starting node and the filter for references to follow
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseDescription {
    pub node_id: NodeId,
    pub browse_direction: BrowseDirection,
    pub reference_type_id: NodeId,
    pub include_subtypes: bool,
    /// Bit mask of node classes to return; 0 returns all
    pub node_class_mask: u32,
    /// Bit mask of result fields to fill in; 0x3F returns all
    pub result_mask: u32,
}

impl BrowseDescription {
    /// Browse all forward hierarchical references of a node
    pub fn children_of(node_id: NodeId) -> Self {
        Self {
            node_id,
            browse_direction: BrowseDirection::Forward,
            // HierarchicalReferences
            reference_type_id: NodeId::numeric(33),
            include_subtypes: true,
            node_class_mask: 0,
            result_mask: 0x3F,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_node_id(&self.node_id);
        encoder.encode_u32(self.browse_direction as u32);
        encoder.encode_node_id(&self.reference_type_id);
        encoder.encode_bool(self.include_subtypes);
        encoder.encode_u32(self.node_class_mask);
        encoder.encode_u32(self.result_mask);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            node_id: decoder.decode_node_id()?,
            browse_direction: BrowseDirection::from_id(decoder.decode_u32()?)?,
            reference_type_id: decoder.decode_node_id()?,
            include_subtypes: decoder.decode_bool()?,
            node_class_mask: decoder.decode_u32()?,
            result_mask: decoder.decode_u32()?,
        })
    }
}

/// Browse one or more nodes
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseRequest {
    pub header: RequestHeader,
    /// View to browse in; a null view id means the whole address space
    pub view_id: NodeId,
    pub view_timestamp: i64,
    pub view_version: u32,
    /// Cap on references returned per node; 0 lets the server choose
    pub requested_max_references_per_node: u32,
    pub nodes_to_browse: Vec<BrowseDescription>,
}

impl BrowseRequest {
    pub fn new(header: RequestHeader, nodes_to_browse: Vec<BrowseDescription>) -> Self {
        Self {
            header,
            view_id: NodeId::null(),
            view_timestamp: 0,
            view_version: 0,
            requested_max_references_per_node: 0,
            nodes_to_browse,
        }
    }
}

impl MessageBody for BrowseRequest {
    const TYPE_ID: u16 = BROWSE_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_node_id(&self.view_id);
        encoder.encode_i64(self.view_timestamp);
        encoder.encode_u32(self.view_version);
        encoder.encode_u32(self.requested_max_references_per_node);
        encoder.encode_array_len(self.nodes_to_browse.len());
        for node in &self.nodes_to_browse {
            node.encode(encoder);
        }
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let view_id = decoder.decode_node_id()?;
        let view_timestamp = decoder.decode_i64()?;
        let view_version = decoder.decode_u32()?;
        let requested_max_references_per_node = decoder.decode_u32()?;
        let count = decoder.decode_array_len()?;
        let mut nodes_to_browse = Vec::with_capacity(count);
        for _ in 0..count {
            nodes_to_browse.push(BrowseDescription::decode(decoder)?);
        }
        Ok(Self {
            header,
            view_id,
            view_timestamp,
            view_version,
            requested_max_references_per_node,
            nodes_to_browse,
        })
    }
}

/// One reference found while browsing
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDescription {
    pub reference_type_id: NodeId,
    pub is_forward: bool,
    pub node_id: NodeId,
    pub browse_name: QualifiedName,
    pub display_name: LocalizedText,
    /// 1 Object, 2 Variable, 4 Method, 8 ObjectType, ...
    pub node_class: u32,
    pub type_definition: NodeId,
}

impl ReferenceDescription {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_node_id(&self.reference_type_id);
        encoder.encode_bool(self.is_forward);
        encoder.encode_node_id(&self.node_id);
        self.browse_name.encode(encoder);
        self.display_name.encode(encoder);
        encoder.encode_u32(self.node_class);
        encoder.encode_node_id(&self.type_definition);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            reference_type_id: decoder.decode_node_id()?,
            is_forward: decoder.decode_bool()?,
            node_id: decoder.decode_node_id()?,
            browse_name: QualifiedName::decode(decoder)?,
            display_name: LocalizedText::decode(decoder)?,
            node_class: decoder.decode_u32()?,
            type_definition: decoder.decode_node_id()?,
        })
    }
}

/// Result for one browsed node
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResult {
    pub status: StatusCode,
    /// Opaque token to pass to BrowseNext when results were truncated
    pub continuation_point: Option<Vec<u8>>,
    pub references: Vec<ReferenceDescription>,
}

impl BrowseResult {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_status(self.status);
        encoder.encode_byte_string(self.continuation_point.as_deref());
        encoder.encode_array_len(self.references.len());
        for reference in &self.references {
            reference.encode(encoder);
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let status = decoder.decode_status()?;
        let continuation_point = decoder.decode_byte_string()?;
        let count = decoder.decode_array_len()?;
        let mut references = Vec::with_capacity(count);
        for _ in 0..count {
            references.push(ReferenceDescription::decode(decoder)?);
        }
        Ok(Self {
            status,
            continuation_point,
            references,
        })
    }
}

/// Results in request order, one per browsed node
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResponse {
    pub header: ResponseHeader,
    pub results: Vec<BrowseResult>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for BrowseResponse {
    const TYPE_ID: u16 = BROWSE_RESPONSE;

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
            results.push(BrowseResult::decode(decoder)?);
        }
        Ok(Self {
            header,
            results,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_round_trip() {
        let request = BrowseRequest::new(
            RequestHeader::new(NodeId::numeric(7), 20),
            // ObjectsFolder
            vec![BrowseDescription::children_of(NodeId::numeric(85))],
        );
        let mut enc = BinaryEncoder::new();
        request.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(BrowseRequest::decode_body(&mut dec).unwrap(), request);

        let response = BrowseResponse {
            header: ResponseHeader::good(20),
            results: vec![BrowseResult {
                status: StatusCode::Good,
                continuation_point: None,
                references: vec![ReferenceDescription {
                    reference_type_id: NodeId::numeric(35),
                    is_forward: true,
                    node_id: NodeId::String {
                        namespace: 2,
                        id: "Device".into(),
                    },
                    browse_name: QualifiedName::new(2, "Device"),
                    display_name: LocalizedText::from_text("Device"),
                    node_class: 1,
                    type_definition: NodeId::numeric(61),
                }],
            }],
            diagnostic_infos: Vec::new(),
        };
        let mut enc = BinaryEncoder::new();
        response.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(BrowseResponse::decode_body(&mut dec).unwrap(), response);
        assert_eq!(dec.remaining(), 0);
    }
}
