use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown company: {0}")]
    UnknownCompany(String),

    #[error("cannot delete the last remaining company")]
    LastCompany,

    #[error("no entry with id {0}")]
    UnknownEntry(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Invalid backup file format")]
    InvalidBackup,

    #[error("Failed to parse backup file")]
    BackupParse,

    #[error("cannot finish reconciliation: a difference of {0:.2} must be resolved")]
    OutOfBalance(f64),

    #[error("reconciliation session is not active")]
    SessionInactive,

    #[cfg(feature = "pdf")]
    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
