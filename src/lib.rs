//! User and rating records for a classroom feedback app: validation,
//! password handling, persistence and login.

pub mod auth;
pub mod config;
pub mod error;
pub mod ratings;
pub mod state;
pub mod storage;
pub mod users;
pub mod validation;

pub use error::ModelError;
pub use ratings::Rating;
pub use users::User;
pub use validation::{FieldError, FieldErrorKind, ValidationErrors};
