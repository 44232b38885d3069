pub mod connect;
pub mod login;
pub mod logout;
pub mod sign;

use std::path::PathBuf;

use vssh_core::client::TokenPersistentSession;
use vssh_vaultclient::VaultSession;

use crate::config::GlobalConfig;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Address of the vault server (default: $VAULT_ADDR)
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Vault token to use for authentication (default: $VAULT_TOKEN or the cached one)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Config file to read (default: <config_dir>/vssh/vssh.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("c"))]
    Connect(connect::Args),

    Sign(sign::Args),
    Login(login::Args),
    Logout(logout::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Connect(args) => connect::exec(args, self).await,
            Sign(args) => sign::exec(args, self).await,
            Login(args) => login::exec(args, self).await,
            Logout(args) => logout::exec(args, self).await,
        }
    }
}

/// Signing-related flags shared by `connect` and `sign`.
#[derive(Debug, clap::Args)]
pub struct SignOpts {
    /// Vault role account to sign with
    #[arg(short, long)]
    pub role: Option<String>,

    /// Mount path for the ssh backend (default: ssh)
    #[arg(short, long)]
    pub mount: Option<String>,

    /// ssh key-pair to sign and use (default: $HOME/.ssh/id_rsa)
    #[arg(short, long)]
    pub identity: Option<PathBuf>,

    /// Auth method to login with (skips the interactive choice)
    #[arg(long)]
    pub auth_method: Option<String>,

    /// Persist obtained tokens to the cache file
    #[arg(short, long)]
    pub persist: bool,
}

pub fn new_session(cfg: &GlobalConfig) -> anyhow::Result<TokenPersistentSession> {
    let session = VaultSession::new(&cfg.server)?.with_token(cfg.token.clone());
    Ok(TokenPersistentSession::new(session, &cfg.cache_dir))
}
