//! Endpoint and identity selection
//!
//! After GetEndpoints the client picks the endpoint matching the configured
//! security mode, then the user token policy its credentials can satisfy.

use crate::config::Credentials;
use opcua_application::types::{
    EndpointDescription, UserIdentityToken, UserTokenPolicy, UserTokenType,
};
use opcua_core::{OpcUaError, OpcUaResult};
use opcua_security::MessageSecurityMode;

/// Pick the endpoint offering the required security mode
///
/// Candidates with the right mode are ranked by the server's own
/// `security_level`, highest first.
pub fn select_endpoint(
    endpoints: &[EndpointDescription],
    security_mode: MessageSecurityMode,
) -> OpcUaResult<&EndpointDescription> {
    endpoints
        .iter()
        .filter(|endpoint| endpoint.security_mode == security_mode)
        .max_by_key(|endpoint| endpoint.security_level)
        .ok_or_else(|| {
            OpcUaError::EndpointSelection(format!(
                "No endpoint offers security mode {} (server advertises {})",
                security_mode,
                endpoints.len()
            ))
        })
}

/// Build the identity token for the policy the endpoint accepts
///
/// A certificate credential is preferred over user-name, which is
/// preferred over anonymous; each is only usable when the endpoint
/// advertises a policy of the matching token type.
pub fn choose_identity(
    endpoint: &EndpointDescription,
    credentials: &Credentials,
) -> OpcUaResult<UserIdentityToken> {
    let token = match credentials {
        Credentials::Certificate { certificate } => {
            let policy = policy_of_type(endpoint, UserTokenType::Certificate)?;
            UserIdentityToken::X509 {
                policy_id: policy.policy_id.clone(),
                certificate_data: certificate.clone(),
            }
        }
        Credentials::UserName {
            user_name,
            password,
        } => {
            let policy = policy_of_type(endpoint, UserTokenType::UserName)?;
            UserIdentityToken::UserName {
                policy_id: policy.policy_id.clone(),
                user_name: user_name.clone(),
                password: password.as_bytes().to_vec(),
                encryption_algorithm: None,
            }
        }
        Credentials::Anonymous => {
            let policy = policy_of_type(endpoint, UserTokenType::Anonymous)?;
            UserIdentityToken::Anonymous {
                policy_id: policy.policy_id.clone(),
            }
        }
    };
    Ok(token)
}

fn policy_of_type(
    endpoint: &EndpointDescription,
    token_type: UserTokenType,
) -> OpcUaResult<&UserTokenPolicy> {
    endpoint
        .user_identity_tokens
        .iter()
        .find(|policy| policy.token_type == token_type)
        .ok_or_else(|| {
            OpcUaError::CredentialPolicyMismatch(format!(
                "Endpoint has no {:?} user token policy",
                token_type
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcua_application::types::ApplicationDescription;

    fn endpoint(
        mode: MessageSecurityMode,
        level: u8,
        policies: Vec<UserTokenPolicy>,
    ) -> EndpointDescription {
        EndpointDescription {
            endpoint_url: Some("opc.tcp://h:4840".into()),
            server: ApplicationDescription::client("urn:h", "h"),
            server_certificate: None,
            security_mode: mode,
            security_policy_uri: None,
            user_identity_tokens: policies,
            transport_profile_uri: None,
            security_level: level,
        }
    }

    #[test]
    fn test_selects_matching_mode_with_highest_level() {
        let endpoints = vec![
            endpoint(MessageSecurityMode::None, 0, vec![]),
            endpoint(MessageSecurityMode::Sign, 2, vec![]),
            endpoint(MessageSecurityMode::Sign, 3, vec![]),
        ];
        let selected = select_endpoint(&endpoints, MessageSecurityMode::Sign).unwrap();
        assert_eq!(selected.security_level, 3);
    }

    #[test]
    fn test_missing_mode_is_selection_error() {
        let endpoints = vec![endpoint(MessageSecurityMode::None, 0, vec![])];
        assert!(matches!(
            select_endpoint(&endpoints, MessageSecurityMode::SignAndEncrypt),
            Err(OpcUaError::EndpointSelection(_))
        ));
    }

    #[test]
    fn test_identity_follows_credentials() {
        let ep = endpoint(
            MessageSecurityMode::None,
            0,
            vec![
                UserTokenPolicy::anonymous("anon"),
                UserTokenPolicy {
                    policy_id: Some("user".into()),
                    token_type: UserTokenType::UserName,
                    issued_token_type: None,
                    issuer_endpoint_url: None,
                    security_policy_uri: None,
                },
            ],
        );

        let token = choose_identity(
            &ep,
            &Credentials::UserName {
                user_name: "operator".into(),
                password: "secret".into(),
            },
        )
        .unwrap();
        match token {
            UserIdentityToken::UserName {
                policy_id,
                user_name,
                ..
            } => {
                assert_eq!(policy_id.as_deref(), Some("user"));
                assert_eq!(user_name, "operator");
            }
            other => panic!("wrong token {:?}", other),
        }

        let token = choose_identity(&ep, &Credentials::Anonymous).unwrap();
        assert!(matches!(token, UserIdentityToken::Anonymous { .. }));
    }

    #[test]
    fn test_unsupported_credential_is_policy_mismatch() {
        let ep = endpoint(
            MessageSecurityMode::None,
            0,
            vec![UserTokenPolicy::anonymous("anon")],
        );
        assert!(matches!(
            choose_identity(
                &ep,
                &Credentials::Certificate {
                    certificate: vec![0x30],
                },
            ),
            Err(OpcUaError::CredentialPolicyMismatch(_))
        ));
    }
}
