//! Soft-delete, restore, and archive cascades.
//!
//! Cascades walk the relation graph reachable from the target: a plan
//! reaches its descendant plans, their tests, and those tests' results; a
//! suite reaches its descendant suites, their cases, and those cases'
//! steps. Removal marks rows instead of deleting them, so everything here
//! has an inverse.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{test_case, test_case_step, test_plan, test_record, test_result, test_suite};
use crate::error::{AppError, AppResult};

async fn test_ids_for_plans(txn: &DatabaseTransaction, plan_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    let tests = test_record::Entity::find()
        .filter(test_record::Column::PlanId.is_in(plan_ids.to_vec()))
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to collect tests: {}", e)))?;
    Ok(tests.into_iter().map(|t| t.id).collect())
}

/// Soft-delete a plan subtree with its tests and results.
pub async fn soft_delete_plans(txn: &DatabaseTransaction, plan_ids: &[Uuid]) -> AppResult<()> {
    if plan_ids.is_empty() {
        return Ok(());
    }
    let now = Some(Utc::now());
    let test_ids = test_ids_for_plans(txn, plan_ids).await?;

    if !test_ids.is_empty() {
        test_result::Entity::update_many()
            .col_expr(test_result::Column::DeletedAt, Expr::value(now))
            .filter(test_result::Column::TestId.is_in(test_ids.clone()))
            .filter(test_result::Column::DeletedAt.is_null())
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to soft-delete results: {}", e)))?;

        test_record::Entity::update_many()
            .col_expr(test_record::Column::DeletedAt, Expr::value(now))
            .filter(test_record::Column::Id.is_in(test_ids))
            .filter(test_record::Column::DeletedAt.is_null())
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to soft-delete tests: {}", e)))?;
    }

    test_plan::Entity::update_many()
        .col_expr(test_plan::Column::DeletedAt, Expr::value(now))
        .filter(test_plan::Column::Id.is_in(plan_ids.to_vec()))
        .filter(test_plan::Column::DeletedAt.is_null())
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to soft-delete plans: {}", e)))?;
    Ok(())
}

/// Restore a soft-deleted plan subtree with its tests and results.
pub async fn restore_plans(txn: &DatabaseTransaction, plan_ids: &[Uuid]) -> AppResult<()> {
    if plan_ids.is_empty() {
        return Ok(());
    }
    let none: Option<chrono::DateTime<Utc>> = None;
    let test_ids = test_ids_for_plans(txn, plan_ids).await?;

    test_plan::Entity::update_many()
        .col_expr(test_plan::Column::DeletedAt, Expr::value(none))
        .filter(test_plan::Column::Id.is_in(plan_ids.to_vec()))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to restore plans: {}", e)))?;

    if !test_ids.is_empty() {
        test_record::Entity::update_many()
            .col_expr(test_record::Column::DeletedAt, Expr::value(none))
            .filter(test_record::Column::Id.is_in(test_ids.clone()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to restore tests: {}", e)))?;

        test_result::Entity::update_many()
            .col_expr(test_result::Column::DeletedAt, Expr::value(none))
            .filter(test_result::Column::TestId.is_in(test_ids))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to restore results: {}", e)))?;
    }
    Ok(())
}

/// Toggle the archive flag on a plan subtree and its tests.
pub async fn set_archive_plans(
    txn: &DatabaseTransaction,
    plan_ids: &[Uuid],
    archived: bool,
) -> AppResult<()> {
    if plan_ids.is_empty() {
        return Ok(());
    }
    test_plan::Entity::update_many()
        .col_expr(test_plan::Column::IsArchive, Expr::value(archived))
        .filter(test_plan::Column::Id.is_in(plan_ids.to_vec()))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to archive plans: {}", e)))?;

    test_record::Entity::update_many()
        .col_expr(test_record::Column::IsArchive, Expr::value(archived))
        .filter(test_record::Column::PlanId.is_in(plan_ids.to_vec()))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to archive tests: {}", e)))?;
    Ok(())
}

/// Soft-delete a suite subtree with its cases and steps.
pub async fn soft_delete_suites(txn: &DatabaseTransaction, suite_ids: &[Uuid]) -> AppResult<()> {
    if suite_ids.is_empty() {
        return Ok(());
    }
    let now = Some(Utc::now());

    let case_ids: Vec<Uuid> = test_case::Entity::find()
        .filter(test_case::Column::SuiteId.is_in(suite_ids.to_vec()))
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to collect cases: {}", e)))?
        .into_iter()
        .map(|c| c.id)
        .collect();

    if !case_ids.is_empty() {
        test_case_step::Entity::update_many()
            .col_expr(test_case_step::Column::DeletedAt, Expr::value(now))
            .filter(test_case_step::Column::TestCaseId.is_in(case_ids.clone()))
            .filter(test_case_step::Column::DeletedAt.is_null())
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to soft-delete steps: {}", e)))?;

        test_case::Entity::update_many()
            .col_expr(test_case::Column::DeletedAt, Expr::value(now))
            .filter(test_case::Column::Id.is_in(case_ids))
            .filter(test_case::Column::DeletedAt.is_null())
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to soft-delete cases: {}", e)))?;
    }

    test_suite::Entity::update_many()
        .col_expr(test_suite::Column::DeletedAt, Expr::value(now))
        .filter(test_suite::Column::Id.is_in(suite_ids.to_vec()))
        .filter(test_suite::Column::DeletedAt.is_null())
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to soft-delete suites: {}", e)))?;
    Ok(())
}
