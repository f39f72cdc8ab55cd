//! Database queries for test cases and their steps.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::test_case::{self, ActiveModel as CaseActiveModel, Entity as TestCase};
use crate::entity::test_case_step::{self, ActiveModel as StepActiveModel, Entity as TestCaseStep};
use crate::error::{AppError, AppResult};

/// Live cases for a set of ids, preserving nothing about input order.
pub async fn get_cases<C: ConnectionTrait>(
    conn: &C,
    case_ids: &[Uuid],
) -> AppResult<Vec<test_case::Model>> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = TestCase::find()
        .filter(test_case::Column::Id.is_in(case_ids.to_vec()))
        .filter(test_case::Column::DeletedAt.is_null())
        .order_by_asc(test_case::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get cases: {}", e)))?;
    Ok(result)
}

/// Live cases belonging to any of the given suites.
pub async fn list_by_suites<C: ConnectionTrait>(
    conn: &C,
    suite_ids: &[Uuid],
) -> AppResult<Vec<test_case::Model>> {
    if suite_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = TestCase::find()
        .filter(test_case::Column::SuiteId.is_in(suite_ids.to_vec()))
        .filter(test_case::Column::DeletedAt.is_null())
        .order_by_asc(test_case::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list cases by suite: {}", e)))?;
    Ok(result)
}

/// Live steps belonging to any of the given cases, in step order.
pub async fn steps_by_cases<C: ConnectionTrait>(
    conn: &C,
    case_ids: &[Uuid],
) -> AppResult<Vec<test_case_step::Model>> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = TestCaseStep::find()
        .filter(test_case_step::Column::TestCaseId.is_in(case_ids.to_vec()))
        .filter(test_case_step::Column::DeletedAt.is_null())
        .order_by_asc(test_case_step::Column::TestCaseId)
        .order_by_asc(test_case_step::Column::SortOrder)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list case steps: {}", e)))?;
    Ok(result)
}

/// Bulk-insert fully-formed case rows (copy engine output).
pub async fn bulk_insert_cases(
    txn: &DatabaseTransaction,
    cases: Vec<test_case::Model>,
) -> AppResult<()> {
    if cases.is_empty() {
        return Ok(());
    }
    let models: Vec<CaseActiveModel> = cases.into_iter().map(|c| c.into_insert_model()).collect();
    TestCase::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert cases: {}", e)))?;
    Ok(())
}

/// Bulk-insert fully-formed step rows (copy engine output).
pub async fn bulk_insert_steps(
    txn: &DatabaseTransaction,
    steps: Vec<test_case_step::Model>,
) -> AppResult<()> {
    if steps.is_empty() {
        return Ok(());
    }
    let models: Vec<StepActiveModel> = steps.into_iter().map(|s| s.into_insert_model()).collect();
    TestCaseStep::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert steps: {}", e)))?;
    Ok(())
}

trait IntoInsertCase {
    fn into_insert_model(self) -> CaseActiveModel;
}

impl IntoInsertCase for test_case::Model {
    fn into_insert_model(self) -> CaseActiveModel {
        CaseActiveModel {
            id: Set(self.id),
            project_id: Set(self.project_id),
            suite_id: Set(self.suite_id),
            name: Set(self.name),
            setup: Set(self.setup),
            scenario: Set(self.scenario),
            expected: Set(self.expected),
            teardown: Set(self.teardown),
            description: Set(self.description),
            estimate: Set(self.estimate),
            is_steps: Set(self.is_steps),
            current_version: Set(self.current_version),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }
}

trait IntoInsertStep {
    fn into_insert_model(self) -> StepActiveModel;
}

impl IntoInsertStep for test_case_step::Model {
    fn into_insert_model(self) -> StepActiveModel {
        StepActiveModel {
            id: Set(self.id),
            test_case_id: Set(self.test_case_id),
            project_id: Set(self.project_id),
            name: Set(self.name),
            scenario: Set(self.scenario),
            expected: Set(self.expected),
            sort_order: Set(self.sort_order),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }
}
