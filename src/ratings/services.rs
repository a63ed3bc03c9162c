use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::ModelError;
use crate::ratings::{
    dto::{CreateRating, RatingSummary},
    repo_types::{NewRating, Rating},
};
use crate::storage::FeedbackStore;
use crate::validation::{FieldErrorKind, ValidationErrors};

/// Check a submission and, if it holds, turn it into insertable columns.
fn validate(input: CreateRating) -> Result<NewRating, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("createdBy", input.created_by.as_ref());
    for (field, value) in [
        ("pace", input.pace),
        ("concepts", input.concepts),
        ("syntax", input.syntax),
        ("confidence", input.confidence),
    ] {
        match value {
            None => errors.require::<f64>(field, None),
            Some(v) if !v.is_finite() => {
                errors.add(field, FieldErrorKind::Number, format!("{field} must be a number."))
            }
            Some(_) => {}
        }
    }

    match (
        input.created_by,
        input.pace,
        input.concepts,
        input.syntax,
        input.confidence,
    ) {
        (Some(created_by), Some(pace), Some(concepts), Some(syntax), Some(confidence))
            if errors.is_empty() =>
        {
            Ok(NewRating {
                created_by,
                pace,
                concepts,
                syntax,
                confidence,
                message: input.message,
            })
        }
        _ => Err(errors),
    }
}

impl Rating {
    /// Validate and persist a rating. `createdBy` must name an existing user.
    #[instrument(skip(store, input), fields(created_by = ?input.created_by))]
    pub async fn create(
        store: &dyn FeedbackStore,
        input: CreateRating,
    ) -> Result<Rating, ModelError> {
        let new = validate(input).map_err(|errors| {
            warn!(%errors, "rating rejected");
            ModelError::from(errors)
        })?;

        if store.find_user(new.created_by).await?.is_none() {
            warn!(user_id = %new.created_by, "rating references unknown user");
            return Err(ValidationErrors::single(
                "createdBy",
                FieldErrorKind::Reference,
                "createdBy must reference an existing user.",
            )
            .into());
        }

        let rating = store.insert_rating(new).await.map_err(|e| {
            error!(error = %e, "insert rating failed");
            ModelError::from(e)
        })?;
        info!(rating_id = %rating.id, user_id = %rating.created_by, "rating created");
        Ok(rating)
    }

    /// Create a rating on behalf of an authenticated user. Any `createdBy`
    /// in the payload is replaced by `author`.
    pub async fn create_for(
        store: &dyn FeedbackStore,
        author: Uuid,
        mut input: CreateRating,
    ) -> Result<Rating, ModelError> {
        input.created_by = Some(author);
        Self::create(store, input).await
    }

    /// Every rating, newest first.
    pub async fn list_all(store: &dyn FeedbackStore) -> Result<Vec<Rating>, ModelError> {
        Ok(store.list_ratings().await?)
    }
}

fn mean(ratings: &[Rating], score: impl Fn(&Rating) -> f64) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: f64 = ratings.iter().map(score).sum();
    Some(total / ratings.len() as f64)
}

pub fn summarize(ratings: &[Rating]) -> RatingSummary {
    RatingSummary {
        count: ratings.len(),
        pace: mean(ratings, |r| r.pace),
        concepts: mean(ratings, |r| r.concepts),
        syntax: mean(ratings, |r| r.syntax),
        confidence: mean(ratings, |r| r.confidence),
    }
}
