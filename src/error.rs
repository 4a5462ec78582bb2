use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

/// Boxed source of a network-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration : {0}")]
    Configuration(String),
    #[error("OAuth handshake failed : {0}")]
    Handshake(#[from] HandshakeError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("remote service responded {status} : {body}")]
    Remote { status: StatusCode, body: String },
    #[error("request failed : {0}")]
    Transport(#[source] BoxError),
    #[error("credential store failed : {0}")]
    Store(String),
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
}

impl Error {
    /// Wraps any network-level failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(err.into())
    }

    /// `true` when the service refused the access token itself (401 / 403).
    ///
    /// The token was most likely revoked; running the handshake again is the
    /// only way to recover.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Error::Remote { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    /// `true` for any non-2xx answer of an authenticated call.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    /// HTTP status of a `Remote` or rejected handshake error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Handshake(HandshakeError::TemporaryCredentialRejected { status, .. })
            | Error::Handshake(HandshakeError::AccessTokenRejected { status, .. }) => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("invalid url {0} : {1}")]
    InvalidUrl(String, String),
    #[error("invalid http method : {0}")]
    InvalidMethod(String),
    #[error("unknown oauth parameter : {0}")]
    UnknownParameter(String),
    #[error("specified parameter {0} is generated by the signer and could not be configured via the request parameters.")]
    UnconfigurableParameter(String),
    #[error("unencodable parameter : {0}")]
    UnencodableParameter(String),
    #[error("invalid signing key : {0}")]
    InvalidKey(String),
    #[error("invalid oauth_timestamp : {0}")]
    InvalidTimestamp(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("temporary credential request rejected ({}) : {detail}", display_status(.status))]
    TemporaryCredentialRejected {
        status: Option<StatusCode>,
        detail: String,
    },
    #[error("temporary credential request rejected : oauth_callback_confirmed was not true")]
    CallbackNotConfirmed,
    #[error("unknown or expired temporary credential : {0}")]
    UnknownTemporaryCredential(String),
    #[error("access token request rejected ({}) : {detail}", display_status(.status))]
    AccessTokenRejected {
        status: Option<StatusCode>,
        detail: String,
    },
}

fn display_status(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "no response".to_string(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
