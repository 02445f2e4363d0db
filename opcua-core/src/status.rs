//! OPC UA status codes
//!
//! Only the codes the client actually sees on the wire are modeled. The
//! enumeration is closed on purpose: a code outside this set is treated as
//! a decode failure rather than being carried around as an opaque number,
//! so every dispatch site can match exhaustively.

/// Severity class of a status code (top two bits of the raw value)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Good,
    Uncertain,
    Bad,
}

/// Status code returned in service responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Good,
    GoodSubscriptionTransferred,
    UncertainInitialValue,
    BadUnexpectedError,
    BadInternalError,
    BadTimeout,
    BadServiceUnsupported,
    BadShutdown,
    BadCommunicationError,
    BadEncodingError,
    BadDecodingError,
    BadCertificateInvalid,
    BadSecurityChecksFailed,
    BadIdentityTokenInvalid,
    BadIdentityTokenRejected,
    BadSecureChannelIdInvalid,
    BadNonceInvalid,
    BadSessionIdInvalid,
    BadSessionClosed,
    BadSessionNotActivated,
    BadSubscriptionIdInvalid,
    BadRequestHeaderInvalid,
    BadNodeIdInvalid,
    BadNodeIdUnknown,
    BadAttributeIdInvalid,
    BadNotReadable,
    BadNotWritable,
    BadUserAccessDenied,
    BadTooManyPublishRequests,
    BadNoSubscription,
    BadSequenceNumberUnknown,
    BadTcpServerTooBusy,
    BadTcpMessageTypeInvalid,
    BadTcpMessageTooLarge,
    BadTcpEndpointUrlInvalid,
    BadSecureChannelClosed,
}

impl StatusCode {
    /// Decode a raw 32-bit status value.
    ///
    /// Returns `None` for codes outside the modeled set; callers turn that
    /// into a decode failure.
    pub fn from_u32(value: u32) -> Option<Self> {
        use StatusCode::*;
        let code = match value {
            0x0000_0000 => Good,
            0x002D_0000 => GoodSubscriptionTransferred,
            0x4092_0000 => UncertainInitialValue,
            0x8001_0000 => BadUnexpectedError,
            0x8002_0000 => BadInternalError,
            0x800A_0000 => BadTimeout,
            0x800B_0000 => BadServiceUnsupported,
            0x800C_0000 => BadShutdown,
            0x8005_0000 => BadCommunicationError,
            0x8006_0000 => BadEncodingError,
            0x8007_0000 => BadDecodingError,
            0x8012_0000 => BadCertificateInvalid,
            0x8013_0000 => BadSecurityChecksFailed,
            0x8020_0000 => BadIdentityTokenInvalid,
            0x8021_0000 => BadIdentityTokenRejected,
            0x8022_0000 => BadSecureChannelIdInvalid,
            0x8024_0000 => BadNonceInvalid,
            0x8025_0000 => BadSessionIdInvalid,
            0x8026_0000 => BadSessionClosed,
            0x8027_0000 => BadSessionNotActivated,
            0x8028_0000 => BadSubscriptionIdInvalid,
            0x802A_0000 => BadRequestHeaderInvalid,
            0x8033_0000 => BadNodeIdInvalid,
            0x8034_0000 => BadNodeIdUnknown,
            0x8035_0000 => BadAttributeIdInvalid,
            0x803A_0000 => BadNotReadable,
            0x803B_0000 => BadNotWritable,
            0x801F_0000 => BadUserAccessDenied,
            0x8077_0000 => BadTooManyPublishRequests,
            0x8079_0000 => BadNoSubscription,
            0x807A_0000 => BadSequenceNumberUnknown,
            0x807D_0000 => BadTcpServerTooBusy,
            0x807E_0000 => BadTcpMessageTypeInvalid,
            0x8080_0000 => BadTcpMessageTooLarge,
            0x8083_0000 => BadTcpEndpointUrlInvalid,
            0x8086_0000 => BadSecureChannelClosed,
            _ => return None,
        };
        Some(code)
    }

    /// Raw 32-bit wire value
    pub fn as_u32(&self) -> u32 {
        use StatusCode::*;
        match self {
            Good => 0x0000_0000,
            GoodSubscriptionTransferred => 0x002D_0000,
            UncertainInitialValue => 0x4092_0000,
            BadUnexpectedError => 0x8001_0000,
            BadInternalError => 0x8002_0000,
            BadTimeout => 0x800A_0000,
            BadServiceUnsupported => 0x800B_0000,
            BadShutdown => 0x800C_0000,
            BadCommunicationError => 0x8005_0000,
            BadEncodingError => 0x8006_0000,
            BadDecodingError => 0x8007_0000,
            BadCertificateInvalid => 0x8012_0000,
            BadSecurityChecksFailed => 0x8013_0000,
            BadIdentityTokenInvalid => 0x8020_0000,
            BadIdentityTokenRejected => 0x8021_0000,
            BadSecureChannelIdInvalid => 0x8022_0000,
            BadNonceInvalid => 0x8024_0000,
            BadSessionIdInvalid => 0x8025_0000,
            BadSessionClosed => 0x8026_0000,
            BadSessionNotActivated => 0x8027_0000,
            BadSubscriptionIdInvalid => 0x8028_0000,
            BadRequestHeaderInvalid => 0x802A_0000,
            BadNodeIdInvalid => 0x8033_0000,
            BadNodeIdUnknown => 0x8034_0000,
            BadAttributeIdInvalid => 0x8035_0000,
            BadNotReadable => 0x803A_0000,
            BadNotWritable => 0x803B_0000,
            BadUserAccessDenied => 0x801F_0000,
            BadTooManyPublishRequests => 0x8077_0000,
            BadNoSubscription => 0x8079_0000,
            BadSequenceNumberUnknown => 0x807A_0000,
            BadTcpServerTooBusy => 0x807D_0000,
            BadTcpMessageTypeInvalid => 0x807E_0000,
            BadTcpMessageTooLarge => 0x8080_0000,
            BadTcpEndpointUrlInvalid => 0x8083_0000,
            BadSecureChannelClosed => 0x8086_0000,
        }
    }

    /// Severity class from the top two bits
    pub fn class(&self) -> StatusClass {
        match self.as_u32() >> 30 {
            0b00 => StatusClass::Good,
            0b01 => StatusClass::Uncertain,
            _ => StatusClass::Bad,
        }
    }

    /// Check for a Good-class code
    pub fn is_good(&self) -> bool {
        self.class() == StatusClass::Good
    }

    /// Check for a Bad-class code
    pub fn is_bad(&self) -> bool {
        self.class() == StatusClass::Bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_codes() {
        for raw in [0x0000_0000u32, 0x800A_0000, 0x8077_0000, 0x8079_0000] {
            let code = StatusCode::from_u32(raw).unwrap();
            assert_eq!(code.as_u32(), raw);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(StatusCode::from_u32(0xDEAD_BEEF).is_none());
    }

    #[test]
    fn test_classification() {
        assert!(StatusCode::Good.is_good());
        assert!(StatusCode::BadTimeout.is_bad());
        assert_eq!(
            StatusCode::UncertainInitialValue.class(),
            StatusClass::Uncertain
        );
        assert!(StatusCode::GoodSubscriptionTransferred.is_good());
    }
}
