use path_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("background fetch failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("invalid toml: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("failed to write toml: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("failed to locate the {0} directory")]
    NoDir(&'static str),
    #[error("no geocoding key configured, set geocode_key or PATHDRAW_GEOCODE_KEY")]
    MissingGeocodeKey,
    #[error("no place found for {0:?}")]
    NotFound(String),
    #[error("walk script: {0}")]
    Script(String),
    #[error(transparent)]
    Page(#[from] pathdraw::PageError),
}

impl ConnectorError {
    /// Transport failures, throttling and server errors are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Protocol(ProtocolError::Upstream { status, .. }) => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ConnectorError {
        ConnectorError::Status {
            url: "http://store/paths".into(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!ConnectorError::NotFound("nowhere".into()).is_retryable());
        assert!(
            ConnectorError::Protocol(ProtocolError::Upstream {
                status: 502,
                body: "bad gateway".into()
            })
            .is_retryable()
        );
    }
}
