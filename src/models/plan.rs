//! Request/response DTOs for test plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_plan;

/// Payload for plan creation.
///
/// A non-empty `parameters` list triggers the combinatorial path: one plan
/// per combination, all siblings under `parent`. `test_cases` pairs every
/// created plan with every listed case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub name: String,
    pub parent: Option<Uuid>,
    pub project: Uuid,
    pub started_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<Uuid>>,
    #[serde(default)]
    pub test_cases: Option<Vec<Uuid>>,
}

/// Payload for plan updates. Every field is optional; for `test_cases`
/// the *presence* of the key (even with an empty list) triggers Test
/// reconciliation, which is why it stays `Option<Vec<_>>` rather than
/// defaulting to empty. `parent` and `finished_at` distinguish an
/// explicit `null` (detach / clear) from the key being absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub parent: Option<Option<Uuid>>,
    pub started_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub finished_at: Option<Option<DateTime<Utc>>>,
    pub is_archive: Option<bool>,
    pub test_cases: Option<Vec<Uuid>>,
}

/// Response body for one plan.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub started_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub is_archive: bool,
    /// Parameter ids attached to this plan (empty unless generated).
    pub parameters: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PlanResponse {
    pub fn from_model(model: test_plan::Model, parameters: Vec<Uuid>) -> Self {
        PlanResponse {
            id: model.id,
            project_id: model.project_id,
            parent_id: model.parent_id,
            name: model.name,
            description: model.description,
            started_at: model.started_at,
            due_date: model.due_date,
            finished_at: model.finished_at,
            is_archive: model.is_archive,
            parameters,
            created_at: model.created_at,
        }
    }
}

/// List response for plans.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanListResponse {
    pub plans: Vec<PlanResponse>,
    pub total: i64,
    /// Deepest nesting level in the project; lets clients size tree views.
    pub max_depth: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_null_parent_means_detach() {
        let detach: UpdatePlanRequest = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        assert_eq!(detach.parent, Some(None));

        let untouched: UpdatePlanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.parent, None);

        let target = Uuid::now_v7();
        let moved: UpdatePlanRequest =
            serde_json::from_str(&format!(r#"{{"parent": "{}"}}"#, target)).unwrap();
        assert_eq!(moved.parent, Some(Some(target)));
    }

    #[test]
    fn test_update_request_null_finished_at_clears() {
        let clear: UpdatePlanRequest = serde_json::from_str(r#"{"finished_at": null}"#).unwrap();
        assert_eq!(clear.finished_at, Some(None));

        let keep: UpdatePlanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(keep.finished_at, None);
    }
}
