//! Database queries for test plans, including their tree-store seam and
//! the bulk-insert path used by parameterized creation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::plan_parameter::{
    self, ActiveModel as PlanParameterActiveModel, Entity as PlanParameter,
};
use crate::entity::test_plan::{self, ActiveModel as PlanActiveModel, Entity as TestPlan};
use crate::error::{AppError, AppResult};
use crate::tree::{BoundsUpdate, TreeRow};

use super::tree_store::TreeEntity;

/// One plan row ready for bulk insertion, with tree placement pre-assigned.
pub struct NewPlan {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub tree_id: Uuid,
    pub level: i32,
    pub name: String,
    pub description: String,
    pub started_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Tree-store implementation for the plan forest.
pub struct PlanTree;

#[async_trait::async_trait]
impl TreeEntity for PlanTree {
    const LOCK_SPACE: i32 = 2;

    async fn load_tree(txn: &DatabaseTransaction, tree_id: Uuid) -> AppResult<Vec<TreeRow>> {
        let rows = TestPlan::find()
            .filter(test_plan::Column::TreeId.eq(tree_id))
            .order_by_asc(test_plan::Column::Lft)
            .all(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load plan tree: {}", e)))?;
        Ok(rows.into_iter().map(to_tree_row).collect())
    }

    async fn apply_bounds(txn: &DatabaseTransaction, updates: &[BoundsUpdate]) -> AppResult<()> {
        for update in updates {
            TestPlan::update_many()
                .col_expr(test_plan::Column::Lft, Expr::value(update.lft))
                .col_expr(test_plan::Column::Rght, Expr::value(update.rght))
                .col_expr(test_plan::Column::Level, Expr::value(update.level))
                .filter(test_plan::Column::Id.eq(update.id))
                .exec(txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to apply plan bounds: {}", e)))?;
        }
        Ok(())
    }

    async fn set_parent(
        txn: &DatabaseTransaction,
        id: Uuid,
        parent_id: Option<Uuid>,
        tree_id: Uuid,
    ) -> AppResult<()> {
        TestPlan::update_many()
            .col_expr(test_plan::Column::ParentId, Expr::value(parent_id))
            .col_expr(test_plan::Column::TreeId, Expr::value(tree_id))
            .filter(test_plan::Column::Id.eq(id))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to reparent plan: {}", e)))?;
        Ok(())
    }

    async fn set_tree(txn: &DatabaseTransaction, ids: &[Uuid], tree_id: Uuid) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        TestPlan::update_many()
            .col_expr(test_plan::Column::TreeId, Expr::value(tree_id))
            .filter(test_plan::Column::Id.is_in(ids.to_vec()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to retree plans: {}", e)))?;
        Ok(())
    }
}

fn to_tree_row(model: test_plan::Model) -> TreeRow {
    TreeRow {
        id: model.id,
        parent_id: model.parent_id,
        tree_id: model.tree_id,
        lft: model.lft,
        rght: model.rght,
        level: model.level,
    }
}

/// Get a single live plan by ID.
pub async fn get_plan<C: ConnectionTrait>(
    conn: &C,
    plan_id: Uuid,
) -> AppResult<Option<test_plan::Model>> {
    let result = TestPlan::find_by_id(plan_id)
        .filter(test_plan::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get plan: {}", e)))?;
    Ok(result)
}

/// Get a plan regardless of soft-delete state; the restore path needs to
/// see the rows it is about to revive.
pub async fn get_plan_any<C: ConnectionTrait>(
    conn: &C,
    plan_id: Uuid,
) -> AppResult<Option<test_plan::Model>> {
    let result = TestPlan::find_by_id(plan_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get plan: {}", e)))?;
    Ok(result)
}

/// Subtree ids via interval containment, soft-deleted rows included.
pub async fn subtree_ids_any<C: ConnectionTrait>(
    conn: &C,
    plan: &test_plan::Model,
) -> AppResult<Vec<Uuid>> {
    let rows = TestPlan::find()
        .filter(test_plan::Column::TreeId.eq(plan.tree_id))
        .filter(test_plan::Column::Lft.gte(plan.lft))
        .filter(test_plan::Column::Rght.lte(plan.rght))
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load plan subtree: {}", e)))?;
    Ok(rows.into_iter().map(|p| p.id).collect())
}

/// Get a live plan or fail with NotFound.
pub async fn require_plan<C: ConnectionTrait>(
    conn: &C,
    plan_id: Uuid,
) -> AppResult<test_plan::Model> {
    get_plan(conn, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test plan".to_string()))
}

/// List live plans of a project, tree order.
pub async fn list_by_project<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
) -> AppResult<Vec<test_plan::Model>> {
    let result = TestPlan::find()
        .filter(test_plan::Column::ProjectId.eq(project_id))
        .filter(test_plan::Column::DeletedAt.is_null())
        .order_by_asc(test_plan::Column::TreeId)
        .order_by_asc(test_plan::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list plans: {}", e)))?;
    Ok(result)
}

/// Bulk-insert plan rows in one statement and fetch the created models.
///
/// Bounds are placeholders; the caller triggers one rebuild per distinct
/// tree afterwards.
pub async fn insert_plans(
    txn: &DatabaseTransaction,
    plans: Vec<NewPlan>,
) -> AppResult<Vec<test_plan::Model>> {
    if plans.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now();
    let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();

    let models: Vec<PlanActiveModel> = plans
        .into_iter()
        .map(|p| PlanActiveModel {
            id: Set(p.id),
            project_id: Set(p.project_id),
            parent_id: Set(p.parent_id),
            tree_id: Set(p.tree_id),
            lft: Set(0),
            rght: Set(0),
            level: Set(p.level),
            name: Set(p.name),
            description: Set(p.description),
            started_at: Set(p.started_at),
            due_date: Set(p.due_date),
            finished_at: Set(p.finished_at),
            is_archive: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        })
        .collect();

    TestPlan::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert plans: {}", e)))?;

    let created = TestPlan::find()
        .filter(test_plan::Column::Id.is_in(ids.clone()))
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to fetch inserted plans: {}", e)))?;
    Ok(in_input_order(created, &ids))
}

/// Restore the caller's id order after a re-fetch. UUIDv7 ids minted in
/// the same millisecond do not sort by generation, so an id-ordered scan
/// can shuffle combination order.
fn in_input_order(rows: Vec<test_plan::Model>, ids: &[Uuid]) -> Vec<test_plan::Model> {
    let mut by_id: HashMap<Uuid, test_plan::Model> =
        rows.into_iter().map(|m| (m.id, m)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Attach parameter sets to generated plans in one bulk statement.
pub async fn insert_plan_parameters(
    txn: &DatabaseTransaction,
    pairs: &[(Uuid, Uuid)],
) -> AppResult<()> {
    if pairs.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let models: Vec<PlanParameterActiveModel> = pairs
        .iter()
        .map(|(plan_id, parameter_id)| PlanParameterActiveModel {
            plan_id: Set(*plan_id),
            parameter_id: Set(*parameter_id),
            created_at: Set(now),
        })
        .collect();

    PlanParameter::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert plan parameters: {}", e)))?;
    Ok(())
}

/// Parameter ids attached to one plan.
pub async fn parameter_ids_of<C: ConnectionTrait>(conn: &C, plan_id: Uuid) -> AppResult<Vec<Uuid>> {
    let rows = PlanParameter::find()
        .filter(plan_parameter::Column::PlanId.eq(plan_id))
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load plan parameters: {}", e)))?;
    Ok(rows.into_iter().map(|r| r.parameter_id).collect())
}

/// Live direct children of a plan.
pub async fn children<C: ConnectionTrait>(
    conn: &C,
    plan_id: Uuid,
) -> AppResult<Vec<test_plan::Model>> {
    let result = TestPlan::find()
        .filter(test_plan::Column::ParentId.eq(plan_id))
        .filter(test_plan::Column::DeletedAt.is_null())
        .order_by_asc(test_plan::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load child plans: {}", e)))?;
    Ok(result)
}

/// Live root plans of a project.
pub async fn roots_by_project<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
) -> AppResult<Vec<test_plan::Model>> {
    let result = TestPlan::find()
        .filter(test_plan::Column::ProjectId.eq(project_id))
        .filter(test_plan::Column::ParentId.is_null())
        .filter(test_plan::Column::DeletedAt.is_null())
        .order_by_asc(test_plan::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load root plans: {}", e)))?;
    Ok(result)
}

/// Live descendants of a plan via interval containment.
pub async fn descendants<C: ConnectionTrait>(
    conn: &C,
    plan: &test_plan::Model,
    include_self: bool,
) -> AppResult<Vec<test_plan::Model>> {
    let mut select = TestPlan::find()
        .filter(test_plan::Column::TreeId.eq(plan.tree_id))
        .filter(test_plan::Column::DeletedAt.is_null());

    select = if include_self {
        select
            .filter(test_plan::Column::Lft.gte(plan.lft))
            .filter(test_plan::Column::Rght.lte(plan.rght))
    } else {
        select
            .filter(test_plan::Column::Lft.gt(plan.lft))
            .filter(test_plan::Column::Rght.lt(plan.rght))
    };

    let result = select
        .order_by_asc(test_plan::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load plan descendants: {}", e)))?;
    Ok(result)
}

/// Live ancestors of a plan via interval containment.
pub async fn ancestors<C: ConnectionTrait>(
    conn: &C,
    plan: &test_plan::Model,
    include_self: bool,
) -> AppResult<Vec<test_plan::Model>> {
    let mut select = TestPlan::find()
        .filter(test_plan::Column::TreeId.eq(plan.tree_id))
        .filter(test_plan::Column::DeletedAt.is_null());

    select = if include_self {
        select
            .filter(test_plan::Column::Lft.lte(plan.lft))
            .filter(test_plan::Column::Rght.gte(plan.rght))
    } else {
        select
            .filter(test_plan::Column::Lft.lt(plan.lft))
            .filter(test_plan::Column::Rght.gt(plan.rght))
    };

    let result = select
        .order_by_asc(test_plan::Column::Lft)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load plan ancestors: {}", e)))?;
    Ok(result)
}

/// Maximum depth level among a project's live plans.
pub async fn max_depth<C: ConnectionTrait>(conn: &C, project_id: Uuid) -> AppResult<i32> {
    let result: Option<Option<i32>> = TestPlan::find()
        .filter(test_plan::Column::ProjectId.eq(project_id))
        .filter(test_plan::Column::DeletedAt.is_null())
        .select_only()
        .column_as(test_plan::Column::Level.max(), "max_level")
        .into_tuple()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get max plan depth: {}", e)))?;
    Ok(result.flatten().unwrap_or(0))
}

/// Update mutable plan fields (not the parent; moves go through the tree store).
#[allow(clippy::too_many_arguments)]
pub async fn update_fields(
    txn: &DatabaseTransaction,
    plan: test_plan::Model,
    name: Option<String>,
    description: Option<String>,
    started_at: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    finished_at: Option<Option<DateTime<Utc>>>,
    is_archive: Option<bool>,
) -> AppResult<test_plan::Model> {
    let mut active: PlanActiveModel = plan.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(started_at) = started_at {
        active.started_at = Set(started_at);
    }
    if let Some(due_date) = due_date {
        active.due_date = Set(due_date);
    }
    if let Some(finished_at) = finished_at {
        active.finished_at = Set(finished_at);
    }
    if let Some(is_archive) = is_archive {
        active.is_archive = Set(is_archive);
    }
    active.updated_at = Set(Utc::now());

    let updated = active
        .update(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update plan: {}", e)))?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Uuid) -> test_plan::Model {
        let now = Utc::now();
        test_plan::Model {
            id,
            project_id: Uuid::now_v7(),
            parent_id: None,
            tree_id: id,
            lft: 0,
            rght: 0,
            level: 0,
            name: "generated".to_string(),
            description: String::new(),
            started_at: now,
            due_date: now,
            finished_at: None,
            is_archive: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_refetch_restores_caller_order() {
        // Ids minted in one burst do not sort by generation, so the
        // re-fetch must follow the input list, not the id index.
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();

        let shuffled = vec![row(b), row(c), row(a)];
        let ordered = in_input_order(shuffled, &[c, a, b]);
        let got: Vec<Uuid> = ordered.iter().map(|m| m.id).collect();
        assert_eq!(got, vec![c, a, b]);
    }
}
