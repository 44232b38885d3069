use vssh_core::action;

use super::{GlobalArgs, SubcmdResult};
use crate::{config::GlobalConfig, util};

#[derive(Debug, clap::Args)]
pub struct Args {}

pub async fn exec(_args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = GlobalConfig::from_file_env_and_args(global_args);
    let mut cli = super::new_session(&cfg)?;

    let token_path = util::replace_homedir_to_tilde(cli.token_filepath());
    action::logout(&mut cli)?;

    println!("Removed cached token {}", token_path.to_string_lossy());
    Ok(())
}
