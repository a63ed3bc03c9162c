pub mod dto;
pub mod password;
mod repo;
pub mod repo_types;
mod services;

pub use dto::{CreateUser, UpdateUser, UserWithRatings};
pub use repo_types::User;
pub use services::validate_new_user;
