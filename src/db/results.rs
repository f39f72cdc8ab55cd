//! Database queries for test results.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::test_record::{self, Entity as Test};
use crate::entity::test_result::{self, ActiveModel as ResultActiveModel, Entity as TestResult};
use crate::error::{AppError, AppResult};

/// A result to be recorded for a Test.
pub struct NewResult {
    pub project_id: Uuid,
    pub test_id: Uuid,
    pub status: String,
    pub comment: String,
    pub attributes: Option<JsonValue>,
}

/// Insert a result and sync the owning Test's denormalized `last_status`.
pub async fn insert_result(
    txn: &DatabaseTransaction,
    result: NewResult,
) -> AppResult<test_result::Model> {
    let now = Utc::now();
    let model = ResultActiveModel {
        id: Set(Uuid::now_v7()),
        project_id: Set(result.project_id),
        test_id: Set(result.test_id),
        status: Set(result.status.clone()),
        comment: Set(result.comment),
        attributes: Set(result.attributes),
        created_at: Set(now),
        deleted_at: Set(None),
    };

    let inserted = model
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert result: {}", e)))?;

    Test::update_many()
        .col_expr(test_record::Column::LastStatus, Expr::value(Some(result.status)))
        .col_expr(test_record::Column::UpdatedAt, Expr::value(now))
        .filter(test_record::Column::Id.eq(result.test_id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to sync last_status: {}", e)))?;

    Ok(inserted)
}

/// Live results of one Test, newest first.
pub async fn list_by_test<C: ConnectionTrait>(
    conn: &C,
    test_id: Uuid,
) -> AppResult<Vec<test_result::Model>> {
    let result = TestResult::find()
        .filter(test_result::Column::TestId.eq(test_id))
        .filter(test_result::Column::DeletedAt.is_null())
        .order_by_desc(test_result::Column::CreatedAt)
        .order_by_desc(test_result::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list results: {}", e)))?;
    Ok(result)
}
