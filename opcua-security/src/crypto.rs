//! Certificate digests
//!
//! The protocol engine only touches cryptography at the OpenSecureChannel
//! boundary: the asymmetric security header identifies the server by the
//! thumbprint of the certificate the client has already seen.

use ring::digest;

/// SHA-1 digest of certificate bytes
///
/// SHA-1 is mandated by the protocol for certificate thumbprints; it is
/// not used for any security decision here.
pub fn sha1_thumbprint(certificate: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, certificate)
        .as_ref()
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbprint_is_sha1_sized() {
        let tp = sha1_thumbprint(b"certificate bytes");
        assert_eq!(tp.len(), 20);
        // deterministic
        assert_eq!(tp, sha1_thumbprint(b"certificate bytes"));
        assert_ne!(tp, sha1_thumbprint(b"other bytes"));
    }
}
