/// Filename of the cached auth token inside the cache dir.
pub const TOKEN_FILENAME: &str = "vault-token";
