//! Database queries for test suites, including their tree-store seam.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::test_suite::{self, ActiveModel as SuiteActiveModel, Entity as TestSuite};
use crate::error::{AppError, AppResult};
use crate::tree::{BoundsUpdate, TreeRow};

use super::tree_store::TreeEntity;

/// Represents a test suite to be inserted.
pub struct NewSuite {
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub tree_id: Uuid,
    pub level: i32,
    pub name: String,
    pub description: String,
}

/// Tree-store implementation for the suite forest.
pub struct SuiteTree;

#[async_trait::async_trait]
impl TreeEntity for SuiteTree {
    const LOCK_SPACE: i32 = 1;

    async fn load_tree(txn: &DatabaseTransaction, tree_id: Uuid) -> AppResult<Vec<TreeRow>> {
        let rows = TestSuite::find()
            .filter(test_suite::Column::TreeId.eq(tree_id))
            .order_by_asc(test_suite::Column::Lft)
            .all(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load suite tree: {}", e)))?;
        Ok(rows.into_iter().map(to_tree_row).collect())
    }

    async fn apply_bounds(txn: &DatabaseTransaction, updates: &[BoundsUpdate]) -> AppResult<()> {
        for update in updates {
            TestSuite::update_many()
                .col_expr(test_suite::Column::Lft, Expr::value(update.lft))
                .col_expr(test_suite::Column::Rght, Expr::value(update.rght))
                .col_expr(test_suite::Column::Level, Expr::value(update.level))
                .filter(test_suite::Column::Id.eq(update.id))
                .exec(txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to apply suite bounds: {}", e)))?;
        }
        Ok(())
    }

    async fn set_parent(
        txn: &DatabaseTransaction,
        id: Uuid,
        parent_id: Option<Uuid>,
        tree_id: Uuid,
    ) -> AppResult<()> {
        TestSuite::update_many()
            .col_expr(test_suite::Column::ParentId, Expr::value(parent_id))
            .col_expr(test_suite::Column::TreeId, Expr::value(tree_id))
            .filter(test_suite::Column::Id.eq(id))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to reparent suite: {}", e)))?;
        Ok(())
    }

    async fn set_tree(txn: &DatabaseTransaction, ids: &[Uuid], tree_id: Uuid) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        TestSuite::update_many()
            .col_expr(test_suite::Column::TreeId, Expr::value(tree_id))
            .filter(test_suite::Column::Id.is_in(ids.to_vec()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to retree suites: {}", e)))?;
        Ok(())
    }
}

fn to_tree_row(model: test_suite::Model) -> TreeRow {
    TreeRow {
        id: model.id,
        parent_id: model.parent_id,
        tree_id: model.tree_id,
        lft: model.lft,
        rght: model.rght,
        level: model.level,
    }
}

/// Get a single live suite by ID.
pub async fn get_suite<C: ConnectionTrait>(
    conn: &C,
    suite_id: Uuid,
) -> AppResult<Option<test_suite::Model>> {
    let result = TestSuite::find_by_id(suite_id)
        .filter(test_suite::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get suite: {}", e)))?;
    Ok(result)
}

/// Get a live suite or fail with NotFound.
pub async fn require_suite<C: ConnectionTrait>(
    conn: &C,
    suite_id: Uuid,
) -> AppResult<test_suite::Model> {
    get_suite(conn, suite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test suite".to_string()))
}

/// List live suites of a project, tree order.
pub async fn list_by_project<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
) -> AppResult<Vec<test_suite::Model>> {
    let result = TestSuite::find()
        .filter(test_suite::Column::ProjectId.eq(project_id))
        .filter(test_suite::Column::DeletedAt.is_null())
        .order_by_asc(test_suite::Column::TreeId)
        .order_by_asc(test_suite::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list suites: {}", e)))?;
    Ok(result)
}

/// Insert one suite row with placeholder bounds; the caller rebuilds.
pub async fn insert_suite(txn: &DatabaseTransaction, suite: NewSuite) -> AppResult<test_suite::Model> {
    let now = Utc::now();
    let model = SuiteActiveModel {
        id: Set(Uuid::now_v7()),
        project_id: Set(suite.project_id),
        parent_id: Set(suite.parent_id),
        tree_id: Set(suite.tree_id),
        lft: Set(0),
        rght: Set(0),
        level: Set(suite.level),
        name: Set(suite.name),
        description: Set(suite.description),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let result = model
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert suite: {}", e)))?;
    Ok(result)
}

/// Bulk-insert fully-formed suite rows (copy engine output). Bounds are
/// placeholders; the caller rebuilds each touched tree.
pub async fn bulk_insert_suites(
    txn: &DatabaseTransaction,
    suites: Vec<test_suite::Model>,
) -> AppResult<()> {
    if suites.is_empty() {
        return Ok(());
    }
    let models: Vec<SuiteActiveModel> = suites
        .into_iter()
        .map(|s| SuiteActiveModel {
            id: Set(s.id),
            project_id: Set(s.project_id),
            parent_id: Set(s.parent_id),
            tree_id: Set(s.tree_id),
            lft: Set(s.lft),
            rght: Set(s.rght),
            level: Set(s.level),
            name: Set(s.name),
            description: Set(s.description),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
            deleted_at: Set(s.deleted_at),
        })
        .collect();
    TestSuite::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert suites: {}", e)))?;
    Ok(())
}

/// Live descendants of a suite via interval containment.
pub async fn descendants<C: ConnectionTrait>(
    conn: &C,
    suite: &test_suite::Model,
    include_self: bool,
) -> AppResult<Vec<test_suite::Model>> {
    let mut select = TestSuite::find()
        .filter(test_suite::Column::TreeId.eq(suite.tree_id))
        .filter(test_suite::Column::DeletedAt.is_null());

    select = if include_self {
        select
            .filter(test_suite::Column::Lft.gte(suite.lft))
            .filter(test_suite::Column::Rght.lte(suite.rght))
    } else {
        select
            .filter(test_suite::Column::Lft.gt(suite.lft))
            .filter(test_suite::Column::Rght.lt(suite.rght))
    };

    let result = select
        .order_by_asc(test_suite::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load suite descendants: {}", e)))?;
    Ok(result)
}

/// Live ancestors of a suite via interval containment.
pub async fn ancestors<C: ConnectionTrait>(
    conn: &C,
    suite: &test_suite::Model,
    include_self: bool,
) -> AppResult<Vec<test_suite::Model>> {
    let mut select = TestSuite::find()
        .filter(test_suite::Column::TreeId.eq(suite.tree_id))
        .filter(test_suite::Column::DeletedAt.is_null());

    select = if include_self {
        select
            .filter(test_suite::Column::Lft.lte(suite.lft))
            .filter(test_suite::Column::Rght.gte(suite.rght))
    } else {
        select
            .filter(test_suite::Column::Lft.lt(suite.lft))
            .filter(test_suite::Column::Rght.gt(suite.rght))
    };

    let result = select
        .order_by_asc(test_suite::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load suite ancestors: {}", e)))?;
    Ok(result)
}

/// Maximum depth level among a project's live suites; bounds recursive prefetching.
pub async fn max_depth<C: ConnectionTrait>(conn: &C, project_id: Uuid) -> AppResult<i32> {
    let result: Option<Option<i32>> = TestSuite::find()
        .filter(test_suite::Column::ProjectId.eq(project_id))
        .filter(test_suite::Column::DeletedAt.is_null())
        .select_only()
        .column_as(test_suite::Column::Level.max(), "max_level")
        .into_tuple()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get max suite depth: {}", e)))?;
    Ok(result.flatten().unwrap_or(0))
}

/// Update mutable suite fields.
pub async fn update_fields(
    txn: &DatabaseTransaction,
    suite: test_suite::Model,
    name: Option<String>,
    description: Option<String>,
) -> AppResult<test_suite::Model> {
    let mut active: SuiteActiveModel = suite.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now());

    let updated = active
        .update(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update suite: {}", e)))?;
    Ok(updated)
}
