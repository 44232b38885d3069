use anyhow::Context as _;
use tokio::process::Command;

use super::{GlobalArgs, SignOpts, SubcmdResult};
use crate::cmd::sign;
use crate::config::GlobalConfig;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// ssh destination, e.g. `user@host`
    #[arg()] // positional argument
    pub destination: String,

    /// Extra arguments handed to ssh verbatim (after `--`)
    #[arg(last = true)]
    pub ssh_args: Vec<String>,

    #[command(flatten)]
    pub sign: SignOpts,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = GlobalConfig::from_file_env_and_args(global_args);
    let mut cli = super::new_session(&cfg)?;

    sign::ensure_signed_cert(&mut cli, &cfg, &args.sign).await?;

    // stdio is inherited, so ssh owns the terminal from here on.
    let status = Command::new("ssh")
        .arg(&args.destination)
        .args(&args.ssh_args)
        .status()
        .await
        .context("Failed to run ssh command")?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
