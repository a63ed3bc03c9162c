use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::ModelError;
use crate::storage::FeedbackStore;
use crate::users::{
    dto::{CreateUser, UpdateUser, UserWithRatings},
    password::{hash_password, verify_password, PASSWORD_MIN_LEN},
    repo_types::{NewUser, User},
};
use crate::validation::{is_valid_email, normalize_email, FieldErrorKind, ValidationErrors};

/// Borrowed view of the persisted profile fields, shared by create and update.
struct Profile<'a> {
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
    role: Option<&'a str>,
    cohort: Option<&'a str>,
}

fn validate_profile(profile: &Profile<'_>, errors: &mut ValidationErrors) {
    errors.require_text("firstName", profile.first_name);
    errors.require_text("lastName", profile.last_name);
    match profile.email {
        Some(email) if !email.is_empty() => {
            if !is_valid_email(email) {
                errors.add("email", FieldErrorKind::Email, "must be a valid email address");
            }
        }
        _ => errors.add("email", FieldErrorKind::Required, "email is required."),
    }
    errors.require_text("role", profile.role);
    errors.require_text("cohort", profile.cohort);
}

/// Password rules applied only to new users.
fn validate_new_password(
    password: Option<&str>,
    confirmation: Option<&str>,
    errors: &mut ValidationErrors,
) {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        errors.add("password", FieldErrorKind::Required, "A password is required.");
        return;
    };
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            "password",
            FieldErrorKind::MinLength,
            format!("must be at least {PASSWORD_MIN_LEN} characters."),
        );
    }
    if confirmation != Some(password) {
        errors.add(
            "passwordConfirmation",
            FieldErrorKind::Mismatch,
            "Passwords do not match.",
        );
    }
}

/// Every violation on a signup payload. `email` must already be normalized.
pub fn validate_new_user(input: &CreateUser) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_profile(
        &Profile {
            first_name: input.first_name.as_deref(),
            last_name: input.last_name.as_deref(),
            email: input.email.as_deref(),
            role: input.role.as_deref(),
            cohort: input.cohort.as_deref(),
        },
        &mut errors,
    );
    validate_new_password(
        input.password.as_deref(),
        input.password_confirmation.as_deref(),
        &mut errors,
    );
    errors
}

fn hash(password: &str) -> Result<String, ModelError> {
    hash_password(password).map_err(ModelError::Password)
}

impl User {
    /// Validate and persist a new user, deriving `password_hash` from the
    /// transient password.
    #[instrument(skip(store, input), fields(email = ?input.email))]
    pub async fn create(
        store: &dyn FeedbackStore,
        mut input: CreateUser,
    ) -> Result<User, ModelError> {
        input.email = input.email.as_deref().map(normalize_email);

        let errors = validate_new_user(&input);
        if !errors.is_empty() {
            warn!(%errors, "user rejected");
            return Err(errors.into());
        }

        // Required fields were checked above.
        let password = input.password.unwrap_or_default();
        let new = NewUser {
            first_name: input.first_name.unwrap_or_default(),
            last_name: input.last_name.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            image: input.image,
            role: input.role.unwrap_or_default(),
            cohort: input.cohort.unwrap_or_default(),
            password_hash: hash(&password)?,
            need_help: input.need_help,
        };

        let user = store.insert_user(new).await.map_err(|e| {
            let err = ModelError::from(e);
            match &err {
                ModelError::Validation(errors) => warn!(%errors, "user rejected by store"),
                other => error!(error = %other, "insert user failed"),
            }
            err
        })?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Apply a profile edit. Password length and confirmation rules do not
    /// apply here; a supplied password is simply re-hashed.
    #[instrument(skip(store, changes))]
    pub async fn update(
        store: &dyn FeedbackStore,
        id: Uuid,
        changes: UpdateUser,
    ) -> Result<User, ModelError> {
        let mut user = store
            .find_user(id)
            .await?
            .ok_or(ModelError::NotFound { entity: "user", id })?;

        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.email {
            user.email = normalize_email(&v);
        }
        if let Some(v) = changes.image {
            user.image = v;
        }
        if let Some(v) = changes.role {
            user.role = v;
        }
        if let Some(v) = changes.cohort {
            user.cohort = v;
        }
        if let Some(v) = changes.need_help {
            user.need_help = v;
        }

        let mut errors = ValidationErrors::new();
        validate_profile(
            &Profile {
                first_name: Some(&user.first_name),
                last_name: Some(&user.last_name),
                email: Some(&user.email),
                role: Some(&user.role),
                cohort: Some(&user.cohort),
            },
            &mut errors,
        );
        if !errors.is_empty() {
            warn!(%errors, user_id = %id, "profile update rejected");
            return Err(errors.into());
        }

        if let Some(password) = changes.password {
            user.password_hash = hash(&password)?;
            debug!(user_id = %id, "password re-hashed");
        }

        let user = store
            .update_user(&user)
            .await?
            .ok_or(ModelError::NotFound { entity: "user", id })?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Check `candidate` against the stored hash. A mismatch, or a hash that
    /// cannot be parsed, yields `false`.
    pub fn validate_password(&self, candidate: &str) -> bool {
        match verify_password(candidate, &self.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, user_id = %self.id, "stored password hash unreadable");
                false
            }
        }
    }

    pub async fn find_by_email(
        store: &dyn FeedbackStore,
        email: &str,
    ) -> Result<Option<User>, ModelError> {
        Ok(store.find_user_by_email(&normalize_email(email)).await?)
    }

    /// Load a user and every rating they authored, oldest first.
    ///
    /// The two reads are not transactional: a rating written between them
    /// may or may not be included.
    #[instrument(skip(store))]
    pub async fn fetch_by_id_with_ratings(
        store: &dyn FeedbackStore,
        id: Uuid,
    ) -> Result<UserWithRatings, ModelError> {
        let Some(user) = store.find_user(id).await? else {
            debug!(user_id = %id, "user not found");
            return Err(ModelError::NotFound { entity: "user", id });
        };
        let ratings = store.ratings_by_creator(user.id).await?;
        Ok(UserWithRatings { user, ratings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::{dto::CreateRating, repo_types::Rating};
    use crate::storage::MemoryStore;

    fn signup(email: &str, password: &str, confirmation: &str) -> CreateUser {
        CreateUser {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some(email.into()),
            image: None,
            role: Some("student".into()),
            cohort: Some("wdi-30".into()),
            password: Some(password.into()),
            password_confirmation: Some(confirmation.into()),
            need_help: Some(false),
        }
    }

    fn rating(pace: f64) -> CreateRating {
        CreateRating {
            created_by: None,
            pace: Some(pace),
            concepts: Some(3.0),
            syntax: Some(4.0),
            confidence: Some(2.0),
            message: Some("more examples please".into()),
        }
    }

    fn field_kind(err: &ModelError, field: &str) -> FieldErrorKind {
        err.validation_errors()
            .and_then(|errors| errors.get(field))
            .map(|e| e.kind)
            .unwrap_or_else(|| panic!("expected a validation error on {field}, got {err:?}"))
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let store = MemoryStore::new();
        let err = User::create(&store, signup("a@example.com", "abc", "abc"))
            .await
            .unwrap_err();
        assert_eq!(field_kind(&err, "password"), FieldErrorKind::MinLength);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let store = MemoryStore::new();
        let err = User::create(&store, signup("a@example.com", "secret1", "secret2"))
            .await
            .unwrap_err();
        assert_eq!(field_kind(&err, "passwordConfirmation"), FieldErrorKind::Mismatch);
        assert!(!err.validation_errors().expect("errors").contains("password"));
    }

    #[tokio::test]
    async fn missing_password_is_required() {
        let store = MemoryStore::new();
        let mut input = signup("a@example.com", "", "");
        input.password = None;
        let err = User::create(&store, input).await.unwrap_err();
        assert_eq!(field_kind(&err, "password"), FieldErrorKind::Required);
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let store = MemoryStore::new();
        let err = User::create(&store, signup("not-an-email", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(field_kind(&err, "email"), FieldErrorKind::Email);
    }

    #[tokio::test]
    async fn every_violation_is_reported() {
        let store = MemoryStore::new();
        let input = CreateUser {
            email: Some("nope".into()),
            password: Some("abc".into()),
            password_confirmation: Some("xyz".into()),
            ..CreateUser::default()
        };
        let err = User::create(&store, input).await.unwrap_err();
        let errors = err.validation_errors().expect("validation error");
        for field in [
            "firstName",
            "lastName",
            "email",
            "role",
            "cohort",
            "password",
            "passwordConfirmation",
        ] {
            assert!(errors.contains(field), "missing error for {field}: {errors}");
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_field_error() {
        let store = MemoryStore::new();
        User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("first signup");
        let err = User::create(&store, signup("A@Example.com ", "secret2", "secret2"))
            .await
            .unwrap_err();
        assert_eq!(field_kind(&err, "email"), FieldErrorKind::Unique);
    }

    #[tokio::test]
    async fn validate_password_matches_only_the_original() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        assert!(user.validate_password("secret1"));
        assert!(!user.validate_password("secret2"));
        assert!(!user.validate_password(""));
        assert_ne!(user.password_hash, "secret1");
    }

    #[tokio::test]
    async fn serialized_user_has_no_password_material() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let json = serde_json::to_value(&user).expect("serialize");
        let obj = json.as_object().expect("object");
        for key in ["passwordHash", "password_hash", "password", "passwordConfirmation", "_id"] {
            assert!(!obj.contains_key(key), "{key} leaked");
        }
        assert_eq!(obj["id"], serde_json::json!(user.id));
        assert_eq!(obj["firstName"], "Ada");
        assert_eq!(obj["email"], "a@example.com");
        assert!(obj.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn fetch_with_ratings_attaches_authored_ratings() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let other = User::create(&store, signup("b@example.com", "secret1", "secret1"))
            .await
            .expect("signup other");

        let first = Rating::create_for(&store, user.id, rating(1.0)).await.expect("rating 1");
        Rating::create_for(&store, other.id, rating(5.0)).await.expect("other rating");
        let second = Rating::create_for(&store, user.id, rating(2.0)).await.expect("rating 2");

        let profile = User::fetch_by_id_with_ratings(&store, user.id)
            .await
            .expect("profile");
        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.ratings, vec![first, second]);

        let json = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(json["ratings"].as_array().map(Vec::len), Some(2));
        assert!(json.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn fetch_with_ratings_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = User::fetch_by_id_with_ratings(&store, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_without_password_keeps_hash() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let changes = UpdateUser {
            cohort: Some("wdi-31".into()),
            need_help: Some(Some(true)),
            ..UpdateUser::default()
        };
        let updated = User::update(&store, user.id, changes).await.expect("update");
        assert_eq!(updated.cohort, "wdi-31");
        assert_eq!(updated.need_help, Some(true));
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(updated.validate_password("secret1"));
    }

    #[tokio::test]
    async fn update_clears_nullable_profile_fields() {
        let store = MemoryStore::new();
        let mut input = signup("a@example.com", "secret1", "secret1");
        input.image = Some("pic.png".into());
        input.need_help = Some(true);
        let user = User::create(&store, input).await.expect("signup");

        let changes: UpdateUser =
            serde_json::from_str(r#"{"image":null,"needHelp":null}"#).expect("parse");
        let updated = User::update(&store, user.id, changes).await.expect("update");
        assert_eq!(updated.image, None);
        assert_eq!(updated.need_help, None);
        assert_eq!(updated.first_name, "Ada");

        let reloaded = store.find_user(user.id).await.expect("read").expect("present");
        assert_eq!(reloaded.image, None);
        assert_eq!(reloaded.need_help, None);
    }

    #[tokio::test]
    async fn update_with_password_rehashes_without_length_rule() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let changes = UpdateUser {
            password: Some("abc".into()),
            ..UpdateUser::default()
        };
        let updated = User::update(&store, user.id, changes).await.expect("update");
        assert!(updated.validate_password("abc"));
        assert!(!updated.validate_password("secret1"));
    }

    #[tokio::test]
    async fn update_still_checks_profile_fields() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let changes = UpdateUser {
            email: Some("broken".into()),
            role: Some(" ".into()),
            ..UpdateUser::default()
        };
        let err = User::update(&store, user.id, changes).await.unwrap_err();
        assert_eq!(field_kind(&err, "email"), FieldErrorKind::Email);
        assert_eq!(field_kind(&err, "role"), FieldErrorKind::Required);
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let err = User::update(&store, Uuid::new_v4(), UpdateUser::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn find_by_email_normalizes_input() {
        let store = MemoryStore::new();
        let user = User::create(&store, signup("a@example.com", "secret1", "secret1"))
            .await
            .expect("signup");
        let found = User::find_by_email(&store, " A@EXAMPLE.COM")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, user.id);
    }
}
