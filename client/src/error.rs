use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SUPABASE_URL and SUPABASE_KEY must be set in environment (do not commit keys).")]
    MissingConfiguration,

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Parse(#[from] benchlog_payloads::RowError),

    #[error("server returned {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    #[error("server returned a body that is not JSON")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// The HTTP status, if the server got far enough to send one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
