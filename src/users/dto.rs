use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ratings::repo_types::Rating;
use crate::users::repo_types::User;

/// Signup input. `password` and `password_confirmation` are consumed when the
/// user is created and never stored.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
    pub cohort: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub need_help: Option<bool>,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("cohort", &self.cohort)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Profile edit. `None` leaves the stored value untouched; a `password`
/// replaces the stored hash.
///
/// `image` and `need_help` are nullable: `Some(None)` (an explicit JSON
/// `null`) clears the stored value.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    pub role: Option<String>,
    pub cohort: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub need_help: Option<Option<bool>>,
    pub password: Option<String>,
}

/// Only called when the key is present, so a missing key stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Profile view: the public user with every rating they authored.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRatings {
    #[serde(flatten)]
    pub user: User,
    pub ratings: Vec<Rating>,
}
