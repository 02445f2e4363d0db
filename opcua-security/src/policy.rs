//! Security policy configuration

use opcua_core::{OpcUaError, OpcUaResult};
use std::fmt;

/// Message security mode advertised by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSecurityMode {
    /// No signing or encryption
    None = 1,
    /// All messages signed
    Sign = 2,
    /// All messages signed and encrypted
    SignAndEncrypt = 3,
}

impl MessageSecurityMode {
    /// Wire value of this mode
    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Get mode from its wire value
    pub fn from_id(id: u32) -> OpcUaResult<Self> {
        match id {
            1 => Ok(MessageSecurityMode::None),
            2 => Ok(MessageSecurityMode::Sign),
            3 => Ok(MessageSecurityMode::SignAndEncrypt),
            _ => Err(OpcUaError::Decode(format!(
                "Invalid message security mode: {}",
                id
            ))),
        }
    }

    /// Whether this mode requires certificate exchange
    pub fn requires_certificate(&self) -> bool {
        !matches!(self, MessageSecurityMode::None)
    }
}

impl fmt::Display for MessageSecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageSecurityMode::None => "None",
            MessageSecurityMode::Sign => "Sign",
            MessageSecurityMode::SignAndEncrypt => "SignAndEncrypt",
        };
        write!(f, "{}", name)
    }
}

/// Security policy identified by URI in endpoint descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityPolicy {
    None,
    Basic128Rsa15,
    Basic256,
    Basic256Sha256,
}

impl SecurityPolicy {
    /// Policy URI as it appears on the wire
    pub fn uri(&self) -> &'static str {
        match self {
            SecurityPolicy::None => "http://opcfoundation.org/UA/SecurityPolicy#None",
            SecurityPolicy::Basic128Rsa15 => {
                "http://opcfoundation.org/UA/SecurityPolicy#Basic128Rsa15"
            }
            SecurityPolicy::Basic256 => "http://opcfoundation.org/UA/SecurityPolicy#Basic256",
            SecurityPolicy::Basic256Sha256 => {
                "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256"
            }
        }
    }

    /// Get policy from its URI; unknown URIs are not an error at the
    /// decode layer, callers filter endpoints they cannot use
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://opcfoundation.org/UA/SecurityPolicy#None" => Some(SecurityPolicy::None),
            "http://opcfoundation.org/UA/SecurityPolicy#Basic128Rsa15" => {
                Some(SecurityPolicy::Basic128Rsa15)
            }
            "http://opcfoundation.org/UA/SecurityPolicy#Basic256" => Some(SecurityPolicy::Basic256),
            "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256" => {
                Some(SecurityPolicy::Basic256Sha256)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip() {
        for mode in [
            MessageSecurityMode::None,
            MessageSecurityMode::Sign,
            MessageSecurityMode::SignAndEncrypt,
        ] {
            assert_eq!(MessageSecurityMode::from_id(mode.id()).unwrap(), mode);
        }
        assert!(MessageSecurityMode::from_id(0).is_err());
    }

    #[test]
    fn test_policy_uri_round_trip() {
        assert_eq!(
            SecurityPolicy::from_uri(SecurityPolicy::Basic256Sha256.uri()),
            Some(SecurityPolicy::Basic256Sha256)
        );
        assert_eq!(SecurityPolicy::from_uri("urn:unknown"), None);
    }
}
