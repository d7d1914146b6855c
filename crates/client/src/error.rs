use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered `401`. The session has been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The call needs a token and the session holds none.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Any other non-success response, with the server's `{ error, code }`.
    #[error("API error ({status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}
