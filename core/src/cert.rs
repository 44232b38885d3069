//! Local certificate inspection: path derivation, parsing and the validity
//! window check that decides whether a run can skip the server entirely.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context as _, Result};
use chrono::{Local, TimeZone as _};
use ssh_key::Certificate;

/// Whether the local certificate can be reused as-is.
/// Everything that is not provably usable degrades to `ExpiredOrInvalid`,
/// which sends the run toward re-signing instead of blocking the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    Valid,
    ExpiredOrInvalid,
}

/// Public key path for the given private key path
/// (`~/.ssh/id_rsa` -> `~/.ssh/id_rsa.pub`).
/// Without an identity, defaults to `$HOME/.ssh/id_rsa.pub`.
pub fn public_key_path(identity: Option<&Path>) -> Result<PathBuf> {
    match identity {
        Some(identity) => {
            let mut path = OsString::from(identity);
            path.push(".pub");
            Ok(PathBuf::from(path))
        }
        None => {
            let home = dirs::home_dir().context("Failed to get user home directory")?;
            Ok(home.join(".ssh").join("id_rsa.pub"))
        }
    }
}

/// Path of the signed certificate belonging to a public key: `-cert` is
/// inserted just before the final extension
/// (`~/.ssh/id_rsa.pub` -> `~/.ssh/id_rsa-cert.pub`).
pub fn cert_path_for(pub_key_path: impl AsRef<Path>) -> PathBuf {
    let pub_key_path = pub_key_path.as_ref();
    let stem = pub_key_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let name = match pub_key_path.extension() {
        Some(ext) => format!("{}-cert.{}", stem, ext.to_string_lossy()),
        None => format!("{}-cert", stem),
    };
    pub_key_path.with_file_name(name)
}

/// Parses the OpenSSH authorized-key style certificate blob at `path`.
pub fn read_certificate(path: impl AsRef<Path>) -> Result<Certificate> {
    let path = path.as_ref();
    let blob = fsutil::read_to_string(path)?;
    Certificate::from_openssh(blob.trim())
        .with_context(|| format!("Malformed certificate '{}'", path.to_string_lossy()))
}

/// Strict on both bounds: a certificate whose window touches `now` exactly is
/// treated as invalid, so a run never races the expiry instant.
pub fn within_validity_window(valid_after: u64, valid_before: u64, now: u64) -> bool {
    valid_after < now && now < valid_before
}

/// Reads and checks the certificate at `path`.
/// Missing file, unreadable file, parse failure and an out-of-window
/// timestamp all yield `ExpiredOrInvalid`.
pub fn check_certificate(path: impl AsRef<Path>, now: SystemTime) -> CertStatus {
    let path = path.as_ref();
    let cert = match read_certificate(path) {
        Ok(cert) => cert,
        Err(e) => {
            log::debug!("No reusable certificate at '{}': {:#}", path.to_string_lossy(), e);
            return CertStatus::ExpiredOrInvalid;
        }
    };

    let now = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    if within_validity_window(cert.valid_after(), cert.valid_before(), now) {
        log::debug!(
            "Certificate '{}' is valid until {}",
            path.to_string_lossy(),
            fmt_unix_time(cert.valid_before()),
        );
        CertStatus::Valid
    } else {
        log::debug!(
            "Certificate '{}' is outside its validity window [{}, {}]",
            path.to_string_lossy(),
            fmt_unix_time(cert.valid_after()),
            fmt_unix_time(cert.valid_before()),
        );
        CertStatus::ExpiredOrInvalid
    }
}

fn fmt_unix_time(secs: u64) -> String {
    match Local.timestamp_opt(secs as i64, 0).single() {
        Some(t) => t.to_rfc3339(),
        None => format!("@{}", secs),
    }
}
