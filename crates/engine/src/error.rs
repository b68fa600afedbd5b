//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when an input violates a domain rule (blank
//!   category, negative amount, malformed month, ...).
//! - [`KeyNotFound`] thrown when an item is not found for the calling user.
//! - [`InvalidId`] thrown when an id cannot be parsed.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidId`]: EngineError::InvalidId
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Configuration(a), Self::Configuration(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
