pub mod identity;
pub mod remote;
pub mod repository;

pub use remote::{RemoteClient, RemoteError};
pub use repository::OrderRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Could not parse resource id from: {0}")]
    IdentityError(String),
    #[error("Storage failure: {0}")]
    StorageError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
