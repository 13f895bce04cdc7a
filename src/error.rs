pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Listing service returned {status} for {url}")]
    TransportStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Snapshot format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Load error: {0}")]
    Load(sqlx::Error),

    #[error("Query error: {0}")]
    Query(sqlx::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Remote call failures, whether the request never completed or the
    /// service answered with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::TransportStatus { .. })
    }
}
