use std::{
    io,
    ops::{Deref, DerefMut},
    path::Path,
};

use anyhow::anyhow;
use fsutil::SingleFileDriver;
use vssh_vaultclient::{Session as _, VaultSession};

use crate::config;

/// A `VaultSession` whose token survives across runs in a cache file
/// (`$cache_dir/vault-token`). The file is only ever written with a token the
/// server returned; an explicitly supplied token takes precedence over the
/// cached one.
pub struct TokenPersistentSession {
    session: VaultSession,
    token_file: SingleFileDriver,
}

impl Deref for TokenPersistentSession {
    type Target = VaultSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for TokenPersistentSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

impl TokenPersistentSession {
    pub fn new(session: VaultSession, cache_dir: impl AsRef<Path>) -> Self {
        let savepath = cache_dir.as_ref().join(config::TOKEN_FILENAME);

        let mut x = Self {
            session,
            token_file: SingleFileDriver::new(savepath),
        };

        if x.session.token().is_empty() {
            x.load_token_if_file_exists().unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable token cache: {:#}", e);
            });
        }
        x
    }

    pub fn load_token_if_file_exists(&mut self) -> anyhow::Result<()> {
        use fsutil::Error;

        match self.token_file.read() {
            Ok(token) => {
                self.session.set_token(token.trim().to_owned());
                Ok(())
            }
            Err(Error::SingleIO(_msg, _path, err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(())
            }
            Err(err) => Err(anyhow!(err)),
        }
    }

    #[must_use]
    pub fn save_token_to_storage(&self) -> anyhow::Result<()> {
        self.token_file
            .write_private(self.session.token())
            .map_err(|e| anyhow!(e))
    }

    /// Deletes the cached token file. A file that never existed is fine;
    /// anything else (e.g. a permission problem) is an error.
    #[must_use]
    pub fn remove_token_from_storage(&self) -> anyhow::Result<()> {
        use fsutil::Error;

        match self.token_file.remove() {
            Ok(()) => Ok(()),
            Err(Error::SingleIO(_msg, _path, err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(())
            }
            Err(err) => Err(anyhow!(err)),
        }
    }

    pub fn token_filepath(&self) -> &Path {
        &self.token_file.filepath
    }
}
