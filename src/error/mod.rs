use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not access ledger file")]
    FileError(#[from] std::io::Error),
    #[error("could not convert CSV rows to transactions")]
    CsvError(#[from] csv::Error),
    #[error("could not load configuration")]
    ConfigError(#[from] config::ConfigError),
    #[error(transparent)]
    BusinessError(#[from] crate::domain::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
