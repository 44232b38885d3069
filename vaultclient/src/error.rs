use reqwest::StatusCode;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Login succeeded but the server returned an empty token")]
    EmptyToken,

    #[error("No signed key was returned from the server")]
    NoKeyReturned,

    #[error("Unknown auth method '{0}'")]
    UnknownAuthMethod(String),

    #[error("Auth method '{0}' is already registered")]
    DuplicateAuthMethod(String),

    #[error("Unexpected response code '{got}' while requesting to {requested_url}")]
    UnexpectedResponseCode {
        got: StatusCode,
        requested_url: String,
    },

    #[error("Failed to parse as URL '{url}'")]
    InvalidServerAddress {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
