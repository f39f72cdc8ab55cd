//! Request/response DTOs for test results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_result;

/// Payload for recording a result against a Test.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateResultRequest {
    /// Outcome label, e.g. "passed" or "failed".
    pub status: String,
    #[serde(default)]
    pub comment: String,
    /// Free-form attribute map, bucketed by attribute histograms.
    #[serde(default)]
    pub attributes: Option<JsonValue>,
}

/// Response body for one result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub test_id: Uuid,
    pub status: String,
    pub comment: String,
    pub attributes: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl From<test_result::Model> for ResultResponse {
    fn from(model: test_result::Model) -> Self {
        ResultResponse {
            id: model.id,
            project_id: model.project_id,
            test_id: model.test_id,
            status: model.status,
            comment: model.comment,
            attributes: model.attributes,
            created_at: model.created_at,
        }
    }
}

/// List response for a Test's results, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultListResponse {
    pub results: Vec<ResultResponse>,
    pub total: i64,
}
