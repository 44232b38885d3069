use vssh_core::{action, interactive, print_success};
use vssh_vaultclient::AuthRegistry;

use super::{GlobalArgs, SubcmdResult};
use crate::config::GlobalConfig;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Auth method to login with (skips the interactive choice)
    #[arg(long)]
    pub auth_method: Option<String>,

    /// Persist the obtained token to the cache file
    #[arg(short, long)]
    pub persist: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = GlobalConfig::from_file_env_and_args(global_args);
    let mut cli = super::new_session(&cfg)?;
    let registry = AuthRegistry::with_builtin();

    action::login(
        &mut *cli,
        &registry,
        args.auth_method.as_deref(),
        &mut interactive::ask_interactively,
        &mut interactive::select_auth_method,
    )
    .await?;

    if args.persist || cfg.persist {
        cli.save_token_to_storage()?;
    }
    print_success!("Successfully logged in to {}", cli.address());
    Ok(())
}
