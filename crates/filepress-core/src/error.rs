use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx reply. `message` is the `error` field of the JSON body, if any.
    #[error("server returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session has been logged out")]
    SessionInvalidated,
    #[error("conversion reply did not include a download URL")]
    MissingDownloadUrl,
    #[error("{0} cannot be converted")]
    NotConvertible(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Collapse an error into the single status string shown to the user.
    ///
    /// Server-provided messages win; transport and I/O failures show their own
    /// text; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            ClientError::Transport(e) => e.to_string(),
            ClientError::Io(e) => e.to_string(),
            ClientError::SessionInvalidated => "Logged out".to_string(),
            ClientError::NotConvertible(name) => format!("{} is already a PDF", name),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = ClientError::Server {
            status: 404,
            message: Some("File not found".into()),
        };
        assert_eq!(err.user_message("Delete failed"), "File not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn empty_or_missing_message_uses_fallback() {
        let err = ClientError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Fetch failed"), "Fetch failed");

        let err = ClientError::Server {
            status: 500,
            message: Some(String::new()),
        };
        assert_eq!(err.user_message("Fetch failed"), "Fetch failed");
    }

    #[test]
    fn decode_error_uses_fallback() {
        let err: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.user_message("Conversion failed"), "Conversion failed");
    }

    #[test]
    fn unauthorized_is_a_plain_message() {
        let err = ClientError::Server {
            status: 401,
            message: Some("Token invalid".into()),
        };
        assert_eq!(err.user_message("Fetch failed"), "Token invalid");
    }
}
