pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use error::*;
use vssh_vaultclient::{AuthRegistry, Session, SigningRequest};

use crate::cert::{self, CertStatus};
use crate::client::TokenPersistentSession;
use crate::interactive;

/// Prompt boundary: `(prompt text, sensitive) -> input`.
pub type AskFn<'a> = &'a mut dyn FnMut(&str, bool) -> io::Result<String>;

/// Auth-method choice boundary, fed with the registry's method names.
pub type ChooseMethodFn<'a> = &'a mut dyn FnMut(&[&'static str]) -> io::Result<&'static str>;

#[derive(Debug, Clone, Default)]
pub struct SignArgs {
    /// Private key path; `None` falls back to `~/.ssh/id_rsa`.
    pub identity: Option<PathBuf>,
    /// Mount path of the SSH secrets engine. Empty selects the default.
    pub mount: String,
    /// Signing role. Must be non-empty whenever a new signature is needed.
    pub role: String,
    /// Auth method to use without asking. `None` prompts for a choice.
    pub auth_method: Option<String>,
}

/// Terminal states of one certificate-lifecycle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertOutcome {
    /// The cached certificate is still inside its validity window;
    /// the server was never contacted.
    StillValid(PathBuf),
    /// A fresh certificate was obtained and written to the given path.
    Signed(PathBuf),
}

impl CertOutcome {
    pub fn cert_path(&self) -> &Path {
        match self {
            Self::StillValid(p) | Self::Signed(p) => p,
        }
    }
}

/// One pass through the certificate lifecycle.
///
/// Reuses the local certificate when it is still valid; otherwise checks the
/// server is usable, logs in when the session holds no working token, asks
/// for a signature and writes the result next to the public key. Every
/// failure aborts the run; nothing is retried.
pub async fn ensure_signed_cert<S>(
    cli: &mut S,
    registry: &AuthRegistry,
    args: &SignArgs,
    ask: AskFn<'_>,
    choose_method: ChooseMethodFn<'_>,
) -> Result<CertOutcome>
where
    S: Session + ?Sized,
{
    let pub_key_path = cert::public_key_path(args.identity.as_deref())?;
    let pub_key = fsutil::read_to_string(&pub_key_path)
        .with_context(|| format!("Failed to read public key '{}'", pub_key_path.display()))?;

    let cert_path = cert::cert_path_for(&pub_key_path);
    if cert::check_certificate(&cert_path, SystemTime::now()) == CertStatus::Valid {
        log::info!("Reusing certificate '{}'", cert_path.display());
        return Ok(CertOutcome::StillValid(cert_path));
    }

    ensure!(!args.role.is_empty(), "Please specify a role to sign with");

    let available = cli
        .is_available()
        .await
        .context("Failed to check server status")?;
    ensure!(
        available,
        "The server is sealed or not initialized - cannot continue"
    );

    if !cli.is_authenticated().await {
        run_login_flow(cli, registry, args.auth_method.as_deref(), ask, choose_method).await?;
    }

    let req = SigningRequest::new(&args.mount, &args.role, pub_key.trim_end());
    let signed_key = cli
        .sign_public_key(&req)
        .await
        .context("Failed to sign public key")?;

    fsutil::write(&cert_path, format!("{}\n", signed_key.trim_end()))?;
    log::info!("Wrote certificate to '{}'", cert_path.display());
    Ok(CertOutcome::Signed(cert_path))
}

/// Authenticates the session: pick a method, collect its credentials, send
/// the login write. The session token is replaced only when the server
/// confirms the login.
async fn run_login_flow<S>(
    cli: &mut S,
    registry: &AuthRegistry,
    method_name: Option<&str>,
    ask: AskFn<'_>,
    choose_method: ChooseMethodFn<'_>,
) -> Result<()>
where
    S: Session + ?Sized,
{
    let method = match method_name {
        Some(name) => registry.create(name)?,
        None => {
            let names = registry.names();
            let name = choose_method(&names).context("Failed to choose an auth method")?;
            registry.create(name)?
        }
    };

    let cred = interactive::collect_credentials(&*method, ask)
        .context("Failed to collect credentials")?;

    cli.login(&*method, &cred)
        .await
        .with_context(|| format!("Failed to login via '{}'", method.name()))
}

/// Standalone login for the `vssh login` subcommand.
pub async fn login<S>(
    cli: &mut S,
    registry: &AuthRegistry,
    method_name: Option<&str>,
    ask: AskFn<'_>,
    choose_method: ChooseMethodFn<'_>,
) -> Result<()>
where
    S: Session + ?Sized,
{
    ensure!(
        !cli.is_authenticated().await,
        "Already authenticated (the current token is still valid)"
    );
    run_login_flow(cli, registry, method_name, ask, choose_method).await
}

/// Drops the session token and the cached copy on disk. A cache file that
/// never existed is fine; any other removal failure is propagated without
/// touching the in-memory token.
pub fn logout(cli: &mut TokenPersistentSession) -> Result<()> {
    cli.remove_token_from_storage()?;
    cli.set_token(String::new());
    Ok(())
}
