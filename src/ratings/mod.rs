pub mod dto;
pub(crate) mod repo;
pub mod repo_types;
mod services;

pub use dto::{CreateRating, RatingSummary};
pub use repo_types::Rating;
pub use services::summarize;
