use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Store error: {0}")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MarketError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError(Box::new(std::io::Error::other(message.into())))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::StoreError(Box::new(err))
    }
}

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::StoreError(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for MarketError {
    fn from(err: rocksdb::Error) -> Self {
        Self::StoreError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
