//! Append-only case version log.
//!
//! The collaborator interface for history: `snapshot` writes a new version
//! row, `latest_version` reads the newest one. Called explicitly by the
//! materializer and copy engine, never from a storage hook.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entity::case_version::{self, ActiveModel as VersionActiveModel, Entity as CaseVersion};
use crate::entity::test_case;
use crate::error::{AppError, AppResult};

/// Latest version number recorded for a case, 0 when none.
pub async fn latest_version<C: ConnectionTrait>(conn: &C, case_id: Uuid) -> AppResult<i32> {
    let newest = CaseVersion::find()
        .filter(case_version::Column::CaseId.eq(case_id))
        .order_by_desc(case_version::Column::Version)
        .limit(1)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get latest version: {}", e)))?;
    Ok(newest.map(|v| v.version).unwrap_or(0))
}

/// Append a snapshot of the case and return the new version number.
pub async fn snapshot(txn: &DatabaseTransaction, case: &test_case::Model) -> AppResult<i32> {
    let version = latest_version(txn, case.id).await? + 1;

    let payload = serde_json::json!({
        "name": case.name,
        "suite_id": case.suite_id,
        "setup": case.setup,
        "scenario": case.scenario,
        "expected": case.expected,
        "teardown": case.teardown,
        "description": case.description,
        "estimate": case.estimate,
        "is_steps": case.is_steps,
    });

    let model = VersionActiveModel {
        case_id: Set(case.id),
        version: Set(version),
        snapshot: Set(payload),
        created_at: Set(Utc::now()),
    };
    model
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to write case version: {}", e)))?;

    Ok(version)
}
