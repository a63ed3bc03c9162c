pub mod claims;
pub mod dto;
pub mod jwt;
pub mod services;

pub use dto::{AuthResponse, Flash, FlashKind, LoginRequest};
pub use services::{authenticate, login, login_flash, AuthError};
