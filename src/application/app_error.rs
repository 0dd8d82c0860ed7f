use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already exists in waitlist")]
    DuplicateEmail,

    #[error("Access token required")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Admin access required")]
    Forbidden,

    #[error("Email address not verified")]
    EmailNotVerified,

    #[error("Waitlist entry is linked to another account")]
    AlreadyLinked,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidInput,
    DuplicateEmail,
    Unauthenticated,
    InvalidToken,
    Forbidden,
    EmailNotVerified,
    AlreadyLinked,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            ErrorCode::AlreadyLinked => "ALREADY_LINKED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
