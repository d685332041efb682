use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid subject label: '{0}'")]
    InvalidSubject(String),
    #[error("invalid session label: '{0}'")]
    InvalidSession(String),
    #[error("unknown module tag: '{0}'")]
    UnknownModule(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
