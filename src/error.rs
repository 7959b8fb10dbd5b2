use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    Config(String),
    Auth(String),
    InvalidQuery { message: String, redacted_url: String },
    Transient(String),
    MalformedResponse(String),
    MissingBaseline(String),
    OutOfRange(i64),
    Io(std::io::Error),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TrackerError::Auth(msg) => {
                write!(f, "Failed to auth, please check API key and try again: {}", msg)
            }
            TrackerError::InvalidQuery { message, redacted_url } => {
                write!(
                    f,
                    "Issue with query, please check configs: {} (request was {})",
                    message, redacted_url
                )
            }
            TrackerError::Transient(msg) => write!(f, "Fetch failed: {}", msg),
            TrackerError::MalformedResponse(msg) => {
                write!(f, "Unexpected API response shape: {}", msg)
            }
            TrackerError::MissingBaseline(msg) => {
                write!(f, "No stored baseline ({}), start a new session with --new", msg)
            }
            TrackerError::OutOfRange(lp) => {
                write!(f, "LP value {} is outside every known rank range", lp)
            }
            TrackerError::Io(e) => write!(f, "File error: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<std::io::Error> for TrackerError {
    fn from(e: std::io::Error) -> Self {
        TrackerError::Io(e)
    }
}
