//! Database queries for projects and their parameters.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entity::parameter::{self, Entity as Parameter};
use crate::entity::project::{self, Entity as Project};
use crate::error::{AppError, AppResult};

/// Get a live project or fail with NotFound.
pub async fn require_project<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
) -> AppResult<project::Model> {
    Project::find_by_id(project_id)
        .filter(project::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))
}

/// Live parameters by id set, in input order.
///
/// Order matters: the combination engine's output order follows the
/// caller-supplied order, which keeps bulk plan generation reproducible.
pub async fn get_parameters_ordered<C: ConnectionTrait>(
    conn: &C,
    parameter_ids: &[Uuid],
) -> AppResult<Vec<parameter::Model>> {
    if parameter_ids.is_empty() {
        return Ok(Vec::new());
    }
    let fetched = Parameter::find()
        .filter(parameter::Column::Id.is_in(parameter_ids.to_vec()))
        .filter(parameter::Column::DeletedAt.is_null())
        .order_by_asc(parameter::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get parameters: {}", e)))?;

    let mut ordered = Vec::with_capacity(parameter_ids.len());
    for id in parameter_ids {
        if let Some(param) = fetched.iter().find(|p| p.id == *id) {
            ordered.push(param.clone());
        }
    }
    Ok(ordered)
}
