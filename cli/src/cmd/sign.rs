use vssh_core::{action, client::TokenPersistentSession, interactive, print_success};
use vssh_vaultclient::{AuthRegistry, Session as _};

use super::{GlobalArgs, SignOpts, SubcmdResult};
use crate::config::GlobalConfig;
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub sign: SignOpts,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = GlobalConfig::from_file_env_and_args(global_args);
    let mut cli = super::new_session(&cfg)?;

    let outcome = ensure_signed_cert(&mut cli, &cfg, &args.sign).await?;

    let path = util::replace_homedir_to_tilde(outcome.cert_path());
    match outcome {
        action::CertOutcome::StillValid(_) => {
            println!("Certificate at {} is still valid", path.to_string_lossy());
        }
        action::CertOutcome::Signed(_) => {
            print_success!("Wrote certificate to {}", path.to_string_lossy());
        }
    }
    Ok(())
}

/// Runs the certificate lifecycle with interactive prompting, persisting the
/// token afterwards when configured to.
pub(crate) async fn ensure_signed_cert(
    cli: &mut TokenPersistentSession,
    cfg: &GlobalConfig,
    opts: &SignOpts,
) -> anyhow::Result<action::CertOutcome> {
    let registry = AuthRegistry::with_builtin();
    let sign_args = action::SignArgs {
        identity: opts.identity.clone().or_else(|| cfg.identity.clone()),
        mount: opts.mount.clone().unwrap_or_else(|| cfg.mount.clone()),
        role: opts.role.clone().unwrap_or_else(|| cfg.role.clone()),
        auth_method: opts.auth_method.clone(),
    };

    let outcome = action::ensure_signed_cert(
        &mut **cli,
        &registry,
        &sign_args,
        &mut interactive::ask_interactively,
        &mut interactive::select_auth_method,
    )
    .await?;

    if (opts.persist || cfg.persist) && !cli.token().is_empty() {
        cli.save_token_to_storage()?;
    }
    Ok(outcome)
}
