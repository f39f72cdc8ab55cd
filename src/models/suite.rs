//! Request/response DTOs for test suites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_suite;

/// Payload for suite creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSuiteRequest {
    pub name: String,
    pub project: Uuid,
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for suite updates. `parent` distinguishes an explicit `null`
/// (detach into a root of its own) from the key being absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSuiteRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub parent: Option<Option<Uuid>>,
}

/// Response body for one suite.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<test_suite::Model> for SuiteResponse {
    fn from(model: test_suite::Model) -> Self {
        SuiteResponse {
            id: model.id,
            project_id: model.project_id,
            parent_id: model.parent_id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

/// List response for suites.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteListResponse {
    pub suites: Vec<SuiteResponse>,
    pub total: i64,
    /// Deepest nesting level in the project; lets clients size tree views.
    pub max_depth: i32,
}
