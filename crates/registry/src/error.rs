use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(Uuid),
    #[error("Model not found: {0}")]
    ModelNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
