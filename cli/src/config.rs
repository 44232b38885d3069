use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use crate::{cmd::GlobalArgs, util};

pub const APP_NAME: &str = "vssh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "GlobalConfig::default_server")]
    pub server: String,

    /// Pre-authenticated token. Empty means "login when needed".
    #[serde(default = "GlobalConfig::default_token")]
    pub token: String,

    /// Mount path of the ssh backend. Empty selects the server default (`ssh`).
    #[serde(default)]
    pub mount: String,

    /// Role to sign public keys with.
    #[serde(default)]
    pub role: String,

    /// Private key path. `None` falls back to `~/.ssh/id_rsa`.
    #[serde(default)]
    pub identity: Option<PathBuf>,

    /// Always persist freshly obtained tokens to the cache file.
    #[serde(default)]
    pub persist: bool,

    #[serde(default = "GlobalConfig::default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            server: Self::default_server(),
            token: Self::default_token(),
            mount: String::new(),
            role: String::new(),
            identity: None,
            persist: false,
            cache_dir: Self::default_cache_dir(),
        }
    }
}

/// `VSSH_*` environment variable overrides, between the config file and flags.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    server: Option<String>,
    token: Option<String>,
    mount: Option<String>,
    role: Option<String>,
    identity: Option<PathBuf>,
    persist: Option<bool>,
    cache_dir: Option<PathBuf>,
}

impl GlobalConfig {
    pub const FILENAME: &str = "vssh.toml";

    pub fn filepath() -> PathBuf {
        let dir = dirs::config_dir().expect("Failed to get user's config dir path");
        dir.join(APP_NAME).join(Self::FILENAME)
    }

    fn default_server() -> String {
        std::env::var("VAULT_ADDR").unwrap_or_else(|_| "https://127.0.0.1:8200".to_owned())
    }

    fn default_token() -> String {
        std::env::var("VAULT_TOKEN").unwrap_or_default()
    }

    fn default_cache_dir() -> PathBuf {
        let dir = dirs::cache_dir().expect("Failed to get user's cache dir path");
        dir.join(APP_NAME)
    }

    /// Reads the config file at `path`, or the default location when `None`.
    /// A missing default file yields `GlobalConfig::default()`; an explicitly
    /// given file must be readable.
    pub fn from_file_or_default(path: Option<&Path>) -> Self {
        let (path, explicitly_given) = match path {
            Some(path) => (path.to_owned(), true),
            None => (Self::filepath(), false),
        };
        let toml_str = match File::open(&path).and_then(io::read_to_string) {
            Ok(toml) => toml,
            Err(e) if explicitly_given => {
                log::error!(
                    "Cannot read config '{:?}': {}",
                    util::replace_homedir_to_tilde(&path),
                    e
                );
                std::process::exit(1)
            }
            _ => return GlobalConfig::default(),
        };
        toml::from_str(&toml_str).unwrap_or_else(|e| {
            log::error!(
                "Invalid config '{:?}': {:#}",
                util::replace_homedir_to_tilde(path),
                e
            );
            std::process::exit(1)
        })
    }

    fn with_env(mut self) -> Self {
        let env: EnvOverrides = envy::prefixed("VSSH_").from_env().unwrap_or_default();

        env.server.map(|v| self.server = v);
        env.token.map(|v| self.token = v);
        env.mount.map(|v| self.mount = v);
        env.role.map(|v| self.role = v);
        env.identity.map(|v| self.identity = Some(v));
        env.persist.map(|v| self.persist = v);
        env.cache_dir.map(|v| self.cache_dir = v);
        self
    }

    pub fn with_args(mut self, args: &GlobalArgs) -> Self {
        let GlobalArgs {
            subcmd: _,
            config: _,
            server,
            token,
            cache_dir,
        } = args;

        server.as_ref().map(|v| self.server = v.clone());
        token.as_ref().map(|v| self.token = v.clone());
        cache_dir.as_ref().map(|d| self.cache_dir = d.clone());
        self
    }

    pub fn from_file_env_and_args(args: &GlobalArgs) -> Self {
        Self::from_file_or_default(args.config.as_deref())
            .with_env()
            .with_args(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_toml_fills_unset_fields_with_defaults() {
        let cfg: GlobalConfig = toml::from_str(
            r#"
            server = "https://vault.corp.example.com"
            role = "ops"
            persist = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server, "https://vault.corp.example.com");
        assert_eq!(cfg.role, "ops");
        assert!(cfg.persist);
        assert_eq!(cfg.mount, "");
        assert_eq!(cfg.identity, None);
    }

    #[test]
    fn explicitly_given_config_file_is_loaded() {
        let path = std::env::temp_dir().join(format!(
            "vssh-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "server = \"https://vault.test\"\nrole = \"dev\"\n").unwrap();

        let cfg = GlobalConfig::from_file_or_default(Some(&path));
        assert_eq!(cfg.server, "https://vault.test");
        assert_eq!(cfg.role, "dev");

        std::fs::remove_file(&path).unwrap();
    }
}
