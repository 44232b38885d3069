//! Response shapes of the three Vault RPCs vssh consumes.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::*;

/// Body of a logical read/write response.
///
/// Vault may answer 200 OK with a semantically empty body (no `auth` block
/// after a login, no `signed_key` after a signing request), so the accessors
/// below re-check the payload instead of trusting the status code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Secret {
    pub auth: Option<SecretAuth>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretAuth {
    pub client_token: String,
}

impl Secret {
    /// Token granted by a successful login, or `Error::EmptyToken` when the
    /// server answered OK without one.
    pub fn client_token(self) -> Result<String> {
        match self.auth {
            Some(SecretAuth { client_token }) if !client_token.is_empty() => Ok(client_token),
            _ => Err(Error::EmptyToken),
        }
    }

    /// `data.signed_key` of a key-signing response, or `Error::NoKeyReturned`
    /// when the field is absent, not a string, or empty.
    pub fn signed_key(self) -> Result<String> {
        let key = self
            .data
            .as_ref()
            .and_then(|data| data.get("signed_key"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if key.is_empty() {
            Err(Error::NoKeyReturned)
        } else {
            Ok(key.to_owned())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SealStatus {
    pub sealed: bool,
    pub initialized: bool,
}

impl SealStatus {
    pub fn is_usable(&self) -> bool {
        !self.sealed && self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(json: &str) -> Secret {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn client_token_of_normal_login_response() {
        let s = secret(r#"{"auth": {"client_token": "s.deadbeef"}}"#);
        assert_eq!(s.client_token().unwrap(), "s.deadbeef");
    }

    #[test]
    fn missing_auth_block_should_be_empty_token_error() {
        let s = secret(r#"{"data": {"foo": 1}}"#);
        assert!(matches!(s.client_token(), Err(Error::EmptyToken)));
    }

    #[test]
    fn blank_token_should_be_empty_token_error() {
        let s = secret(r#"{"auth": {"client_token": ""}}"#);
        assert!(matches!(s.client_token(), Err(Error::EmptyToken)));
    }

    #[test]
    fn signed_key_of_normal_sign_response() {
        let s = secret(r#"{"data": {"signed_key": "ssh-rsa-cert-v01@openssh.com AAAA"}}"#);
        assert_eq!(
            s.signed_key().unwrap(),
            "ssh-rsa-cert-v01@openssh.com AAAA"
        );
    }

    #[test]
    fn empty_data_variants_should_be_no_key_returned_error() {
        for json in [
            r#"{}"#,
            r#"{"data": {}}"#,
            r#"{"data": {"signed_key": ""}}"#,
            r#"{"data": {"signed_key": 42}}"#,
        ] {
            let res = secret(json).signed_key();
            assert!(matches!(res, Err(Error::NoKeyReturned)), "json={}", json);
        }
    }

    #[test]
    fn seal_status_usability() {
        let healthy = secret_status(r#"{"sealed": false, "initialized": true}"#);
        assert!(healthy.is_usable());

        let sealed = secret_status(r#"{"sealed": true, "initialized": true}"#);
        assert!(!sealed.is_usable());

        let uninitialized = secret_status(r#"{"sealed": false, "initialized": false}"#);
        assert!(!uninitialized.is_usable());
    }

    fn secret_status(json: &str) -> SealStatus {
        serde_json::from_str(json).unwrap()
    }
}
