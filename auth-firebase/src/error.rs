use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Malformed Authorization header, expected: Bearer <token>")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
