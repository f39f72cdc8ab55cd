//! Database queries for Test records (case-in-plan pairings).

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::test_record::{self, ActiveModel as TestActiveModel, Entity as Test};
use crate::entity::test_result;
use crate::error::{AppError, AppResult};

/// One Test pairing to be inserted.
pub struct NewTest {
    pub project_id: Uuid,
    pub plan_id: Uuid,
    pub case_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// Bulk-insert Test pairings in one statement.
pub async fn bulk_insert_tests(
    txn: &DatabaseTransaction,
    tests: Vec<NewTest>,
) -> AppResult<Vec<Uuid>> {
    if tests.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now();
    let mut ids = Vec::with_capacity(tests.len());
    let models: Vec<TestActiveModel> = tests
        .into_iter()
        .map(|t| {
            let id = Uuid::now_v7();
            ids.push(id);
            TestActiveModel {
                id: Set(id),
                project_id: Set(t.project_id),
                plan_id: Set(t.plan_id),
                case_id: Set(t.case_id),
                assignee_id: Set(t.assignee_id),
                is_archive: Set(false),
                last_status: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
        })
        .collect();

    Test::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert tests: {}", e)))?;
    Ok(ids)
}

/// Fetch a live Test by id, or fail with `NotFound`.
pub async fn require_test<C: ConnectionTrait>(
    conn: &C,
    test_id: Uuid,
) -> AppResult<test_record::Model> {
    Test::find_by_id(test_id)
        .filter(test_record::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get test: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Test".to_string()))
}

/// Live Tests of one plan.
pub async fn list_by_plan<C: ConnectionTrait>(
    conn: &C,
    plan_id: Uuid,
) -> AppResult<Vec<test_record::Model>> {
    let result = Test::find()
        .filter(test_record::Column::PlanId.eq(plan_id))
        .filter(test_record::Column::DeletedAt.is_null())
        .order_by_asc(test_record::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list tests: {}", e)))?;
    Ok(result)
}

/// Case ids currently paired with a plan.
pub async fn case_ids_of_plan<C: ConnectionTrait>(conn: &C, plan_id: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(list_by_plan(conn, plan_id)
        .await?
        .into_iter()
        .map(|t| t.case_id)
        .collect())
}

/// Soft-delete the Tests pairing a plan with the given cases, cascading the
/// soft delete to their results so the pairing stays recoverable.
pub async fn soft_delete_pairings(
    txn: &DatabaseTransaction,
    plan_id: Uuid,
    case_ids: &[Uuid],
) -> AppResult<u64> {
    if case_ids.is_empty() {
        return Ok(0);
    }
    let now = Utc::now();

    let doomed: Vec<Uuid> = Test::find()
        .filter(test_record::Column::PlanId.eq(plan_id))
        .filter(test_record::Column::CaseId.is_in(case_ids.to_vec()))
        .filter(test_record::Column::DeletedAt.is_null())
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find tests to remove: {}", e)))?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if doomed.is_empty() {
        return Ok(0);
    }

    test_result::Entity::update_many()
        .col_expr(test_result::Column::DeletedAt, Expr::value(Some(now)))
        .filter(test_result::Column::TestId.is_in(doomed.clone()))
        .filter(test_result::Column::DeletedAt.is_null())
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to soft-delete results: {}", e)))?;

    let res = Test::update_many()
        .col_expr(test_record::Column::DeletedAt, Expr::value(Some(now)))
        .filter(test_record::Column::Id.is_in(doomed))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to soft-delete tests: {}", e)))?;

    Ok(res.rows_affected)
}
