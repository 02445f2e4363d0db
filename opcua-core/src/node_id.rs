//! Node identifier model
//!
//! A `NodeId` identifies an addressable entity on the server. The binary
//! protocol encodes it in one of several compact layouts selected by a
//! leading encoding-mask byte; the expanded variants additionally carry a
//! server index. The wire codec lives in `opcua-codec`; this module only
//! defines the model.

use std::fmt;

/// Encoding mask byte for the numeric layout
pub const MASK_NUMERIC: u8 = 0x01;
/// Encoding mask byte for the string layout
pub const MASK_STRING: u8 = 0x03;
/// Encoding mask byte for the GUID layout
pub const MASK_GUID: u8 = 0x04;
/// Encoding mask byte for the opaque (byte string) layout
pub const MASK_OPAQUE: u8 = 0x05;
/// Flag bit marking an expanded layout carrying a server index
pub const MASK_EXPANDED: u8 = 0x40;

/// Polymorphic node identifier
///
/// The mask byte uniquely determines the variant and the exact number of
/// bytes the variant occupies on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Mask 0x01, 4 bytes total
    Numeric { namespace: u8, id: u16 },
    /// Mask 0x03, 7 + len bytes total
    String { namespace: u16, id: std::string::String },
    /// Mask 0x04, 19 bytes total
    Guid { namespace: u16, id: [u8; 16] },
    /// Mask 0x05, 7 + len bytes total
    Opaque { namespace: u16, id: Vec<u8> },
    /// Mask 0x40, 6 bytes total
    ExpandedCompact { id: u8, server_index: u32 },
    /// Mask 0x41, 8 bytes total
    ExpandedNumeric {
        namespace: u8,
        id: u16,
        server_index: u32,
    },
    /// Mask 0x43, 7 + len + 4 bytes total
    ExpandedString {
        namespace: u16,
        id: std::string::String,
        server_index: u32,
    },
    /// Mask 0x45, 7 + len + 4 bytes total
    ExpandedOpaque {
        namespace: u16,
        id: Vec<u8>,
        server_index: u32,
    },
}

impl NodeId {
    /// Null node id (numeric 0 in namespace 0)
    ///
    /// Used as the authentication token before a session exists and as the
    /// "absent extension object" body marker.
    pub fn null() -> Self {
        NodeId::Numeric { namespace: 0, id: 0 }
    }

    /// Standard-namespace numeric id
    pub fn numeric(id: u16) -> Self {
        NodeId::Numeric { namespace: 0, id }
    }

    /// Encoding mask byte for this variant
    pub fn mask(&self) -> u8 {
        match self {
            NodeId::Numeric { .. } => MASK_NUMERIC,
            NodeId::String { .. } => MASK_STRING,
            NodeId::Guid { .. } => MASK_GUID,
            NodeId::Opaque { .. } => MASK_OPAQUE,
            NodeId::ExpandedCompact { .. } => MASK_EXPANDED,
            NodeId::ExpandedNumeric { .. } => MASK_EXPANDED | MASK_NUMERIC,
            NodeId::ExpandedString { .. } => MASK_EXPANDED | MASK_STRING,
            NodeId::ExpandedOpaque { .. } => MASK_EXPANDED | MASK_OPAQUE,
        }
    }

    /// Namespace index, where the variant carries one
    pub fn namespace(&self) -> u16 {
        match self {
            NodeId::Numeric { namespace, .. } | NodeId::ExpandedNumeric { namespace, .. } => {
                *namespace as u16
            }
            NodeId::String { namespace, .. }
            | NodeId::Guid { namespace, .. }
            | NodeId::Opaque { namespace, .. }
            | NodeId::ExpandedString { namespace, .. }
            | NodeId::ExpandedOpaque { namespace, .. } => *namespace,
            NodeId::ExpandedCompact { .. } => 0,
        }
    }

    /// Server index carried by the expanded variants
    pub fn server_index(&self) -> Option<u32> {
        match self {
            NodeId::ExpandedCompact { server_index, .. }
            | NodeId::ExpandedNumeric { server_index, .. }
            | NodeId::ExpandedString { server_index, .. }
            | NodeId::ExpandedOpaque { server_index, .. } => Some(*server_index),
            _ => None,
        }
    }

    /// Exact number of bytes this id occupies on the wire, mask included
    pub fn encoded_len(&self) -> usize {
        match self {
            NodeId::Numeric { .. } => 4,
            NodeId::String { id, .. } => 7 + id.len(),
            NodeId::Guid { .. } => 19,
            NodeId::Opaque { id, .. } => 7 + id.len(),
            NodeId::ExpandedCompact { .. } => 6,
            NodeId::ExpandedNumeric { .. } => 8,
            NodeId::ExpandedString { id, .. } => 7 + id.len() + 4,
            NodeId::ExpandedOpaque { id, .. } => 7 + id.len() + 4,
        }
    }

    /// Whether this is the null id
    pub fn is_null(&self) -> bool {
        matches!(self, NodeId::Numeric { namespace: 0, id: 0 })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Numeric { namespace, id } => write!(f, "ns={};i={}", namespace, id),
            NodeId::String { namespace, id } => write!(f, "ns={};s={}", namespace, id),
            NodeId::Guid { namespace, id } => {
                write!(f, "ns={};g=", namespace)?;
                for b in id {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            NodeId::Opaque { namespace, id } => {
                write!(f, "ns={};b={} bytes", namespace, id.len())
            }
            NodeId::ExpandedCompact { id, server_index } => {
                write!(f, "svr={};i={}", server_index, id)
            }
            NodeId::ExpandedNumeric {
                namespace,
                id,
                server_index,
            } => write!(f, "svr={};ns={};i={}", server_index, namespace, id),
            NodeId::ExpandedString {
                namespace,
                id,
                server_index,
            } => write!(f, "svr={};ns={};s={}", server_index, namespace, id),
            NodeId::ExpandedOpaque {
                namespace,
                id,
                server_index,
            } => write!(f, "svr={};ns={};b={} bytes", server_index, namespace, id.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_values() {
        assert_eq!(NodeId::numeric(85).mask(), 0x01);
        assert_eq!(
            NodeId::String {
                namespace: 2,
                id: "Demo".into()
            }
            .mask(),
            0x03
        );
        assert_eq!(
            NodeId::ExpandedNumeric {
                namespace: 1,
                id: 7,
                server_index: 3
            }
            .mask(),
            0x41
        );
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(NodeId::numeric(85).encoded_len(), 4);
        assert_eq!(
            NodeId::String {
                namespace: 2,
                id: "abc".into()
            }
            .encoded_len(),
            10
        );
        assert_eq!(
            NodeId::Guid {
                namespace: 0,
                id: [0; 16]
            }
            .encoded_len(),
            19
        );
        assert_eq!(
            NodeId::ExpandedCompact {
                id: 9,
                server_index: 1
            }
            .encoded_len(),
            6
        );
    }

    #[test]
    fn test_null() {
        assert!(NodeId::null().is_null());
        assert!(!NodeId::numeric(1).is_null());
    }
}
