use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Malformed policy: {0}")]
    MalformedPolicy(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
