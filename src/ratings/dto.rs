use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating submission. Scores are open-ended numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRating {
    pub created_by: Option<Uuid>,
    pub pace: Option<f64>,
    pub concepts: Option<f64>,
    pub syntax: Option<f64>,
    pub confidence: Option<f64>,
    pub message: Option<String>,
}

/// Aggregated view over a set of ratings. Means are `None` when there are no
/// ratings to average.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub count: usize,
    pub pace: Option<f64>,
    pub concepts: Option<f64>,
    pub syntax: Option<f64>,
    pub confidence: Option<f64>,
}
