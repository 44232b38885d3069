use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::{SealStatus, Secret};
use crate::auth::AuthMethod;
use crate::error::*;
use crate::model::{CredMap, Url};

/// Mount path of the SSH secrets engine when none is configured.
pub const DEFAULT_SSH_MOUNT: &str = "ssh";

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Parameters of one key-signing RPC. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub mount: String,
    pub role: String,
    pub public_key: String,
}

impl SigningRequest {
    pub fn new(mount: &str, role: &str, public_key: impl Into<String>) -> Self {
        let mount = if mount.is_empty() {
            DEFAULT_SSH_MOUNT
        } else {
            mount
        };
        Self {
            mount: mount.to_owned(),
            role: role.to_owned(),
            public_key: public_key.into(),
        }
    }

    fn sign_path(&self) -> String {
        format!("{}/sign/{}", self.mount, self.role)
    }

    fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("public_key".to_owned(), Value::from(self.public_key.as_str()));
        payload.insert("cert_type".to_owned(), Value::from("user"));
        payload
    }
}

/// The process's single connection to the secrets server.
///
/// A trait rather than a concrete type so the certificate lifecycle can be
/// exercised against in-memory fakes.
#[async_trait]
pub trait Session {
    /// Current token. Empty means unauthenticated.
    fn token(&self) -> &str;

    /// Replaces the token wholesale (e.g. with a cached one from disk).
    fn set_token(&mut self, token: String);

    /// Sends the method's login write and stores the returned token.
    /// The stored token is left untouched on any failure.
    async fn login(&mut self, method: &dyn AuthMethod, cred: &CredMap) -> Result<()>;

    /// Token self-lookup. Any failure (no token, expired token, network down)
    /// degrades to `false`, forcing a fresh login.
    async fn is_authenticated(&self) -> bool;

    /// `Ok(false)` when the server is sealed or uninitialized;
    /// `Err` only on a transport-level failure.
    async fn is_available(&self) -> Result<bool>;

    /// Asks the server to sign the public key, returning the signed blob.
    async fn sign_public_key(&self, req: &SigningRequest) -> Result<String>;
}

/// `Session` over the Vault HTTP API.
pub struct VaultSession {
    http: reqwest::Client,
    addr: Url,
    token: String,
}

impl VaultSession {
    pub fn new(addr: &str) -> Result<Self> {
        let addr = Url::parse(addr).map_err(|e| Error::InvalidServerAddress {
            url: addr.to_owned(),
            source: e,
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            addr,
            token: String::new(),
        })
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = token;
        self
    }

    pub fn address(&self) -> &Url {
        &self.addr
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.addr.as_str().trim_end_matches('/'), path)
    }

    /// Logical write RPC: POST `v1/{path}` with a JSON body.
    pub async fn write(&self, path: &str, payload: &Map<String, Value>) -> Result<Secret> {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(payload)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Logical read RPC: GET `v1/{path}`.
    async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);
        let resp = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Stores a token granted by a login response.
    /// The current token survives when the response carries no usable token.
    fn absorb_login_token(&mut self, secret: Secret) -> Result<()> {
        self.token = secret.client_token()?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::UnexpectedResponseCode {
                got: status,
                requested_url: resp.url().to_string(),
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Session for VaultSession {
    fn token(&self) -> &str {
        &self.token
    }

    fn set_token(&mut self, token: String) {
        self.token = token;
    }

    async fn login(&mut self, method: &dyn AuthMethod, cred: &CredMap) -> Result<()> {
        let path = method.login_path(cred);
        let payload = method.login_payload(cred);
        let secret = self.write(&path, &payload).await?;
        self.absorb_login_token(secret)
    }

    async fn is_authenticated(&self) -> bool {
        match self.read_json::<Secret>("auth/token/lookup-self").await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Token self-lookup failed: {}", e);
                false
            }
        }
    }

    async fn is_available(&self) -> Result<bool> {
        let status: SealStatus = self.read_json("sys/seal-status").await?;
        Ok(status.is_usable())
    }

    async fn sign_public_key(&self, req: &SigningRequest) -> Result<String> {
        let secret = self.write(&req.sign_path(), &req.payload()).await?;
        secret.signed_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_api_version_prefix() {
        let s = VaultSession::new("https://vault.example.com:8200").unwrap();
        assert_eq!(
            s.endpoint("auth/userpass/login/bob"),
            "https://vault.example.com:8200/v1/auth/userpass/login/bob"
        );

        let s = VaultSession::new("https://vault.example.com:8200/").unwrap();
        assert_eq!(
            s.endpoint("sys/seal-status"),
            "https://vault.example.com:8200/v1/sys/seal-status"
        );
    }

    #[test]
    fn signing_request_defaults_the_mount() {
        let req = SigningRequest::new("", "ops", "ssh-ed25519 AAAA");
        assert_eq!(req.sign_path(), "ssh/sign/ops");

        let req = SigningRequest::new("corp-ssh", "ops", "ssh-ed25519 AAAA");
        assert_eq!(req.sign_path(), "corp-ssh/sign/ops");
    }

    #[test]
    fn signing_payload_requests_a_user_cert() {
        let payload = SigningRequest::new("", "ops", "ssh-ed25519 AAAA").payload();
        assert_eq!(payload["public_key"], "ssh-ed25519 AAAA");
        assert_eq!(payload["cert_type"], "user");
    }

    #[test]
    fn empty_login_response_leaves_the_stored_token_untouched() {
        let mut s = VaultSession::new("http://127.0.0.1:8200")
            .unwrap()
            .with_token("s.old".to_owned());

        let res = s.absorb_login_token(Secret::default());
        assert!(matches!(res, Err(Error::EmptyToken)));
        assert_eq!(s.token, "s.old");

        let blank = Secret {
            auth: Some(crate::api::SecretAuth {
                client_token: String::new(),
            }),
            data: None,
        };
        assert!(matches!(s.absorb_login_token(blank), Err(Error::EmptyToken)));
        assert_eq!(s.token, "s.old");
    }

    #[test]
    fn invalid_address_is_rejected_at_construction() {
        assert!(matches!(
            VaultSession::new("not a url"),
            Err(Error::InvalidServerAddress { .. })
        ));
    }
}
