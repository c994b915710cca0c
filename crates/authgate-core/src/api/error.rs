use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The authority explicitly rejected the credentials.
    #[error("Your username or password is incorrect.")]
    Unauthorized,

    /// Connection-level failure before a response was read.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response had an unexpected status or an undecodable body.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    /// Truncate a response body to avoid carrying excessive data around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => AuthError::Unauthorized,
            _ => AuthError::Malformed(format!(
                "status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }
}
