use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Store at {0} is locked by another process")]
    Locked(String),

    #[error("Partition not found: {0}")]
    PartitionNotFound(String),

    #[error("Invalid partition name: {0}")]
    InvalidPartitionName(String),

    #[error("Corrupt value in {partition}/{key}: {reason}")]
    Corrupt {
        partition: String,
        key: String,
        reason: String,
    },

    #[error("Invalid day label: {0}")]
    InvalidDay(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
