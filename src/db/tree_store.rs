//! Persistence half of the Tree Store.
//!
//! Suites and plans both implement [`TreeEntity`]; the generic operations
//! here load a tree's rows, run the pure algorithms from [`crate::tree`],
//! and persist whatever changed. Every mutation runs inside the caller's
//! transaction with an advisory lock on the target tree, so concurrent
//! inserts into one tree serialize while distinct trees proceed in
//! parallel.

use sea_orm::{ConnectionTrait, DatabaseTransaction, Statement, Value};
use tracing::warn;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::tree::{self, BoundsUpdate, TreeRow};

/// Tree persistence seam implemented by the suite and plan repositories.
#[async_trait::async_trait]
pub trait TreeEntity {
    /// Advisory-lock namespace; distinct per entity type so suite and plan
    /// trees never contend with each other.
    const LOCK_SPACE: i32;

    /// Load every row (including soft-deleted ones) of one tree.
    async fn load_tree(txn: &DatabaseTransaction, tree_id: Uuid) -> AppResult<Vec<TreeRow>>;

    /// Persist new bounds/levels for the given rows.
    async fn apply_bounds(txn: &DatabaseTransaction, updates: &[BoundsUpdate]) -> AppResult<()>;

    /// Point a node at a new parent and tree.
    async fn set_parent(
        txn: &DatabaseTransaction,
        id: Uuid,
        parent_id: Option<Uuid>,
        tree_id: Uuid,
    ) -> AppResult<()>;

    /// Reassign a set of nodes to a tree (used when a subtree moves across
    /// trees).
    async fn set_tree(txn: &DatabaseTransaction, ids: &[Uuid], tree_id: Uuid) -> AppResult<()>;
}

/// Take the transaction-scoped exclusive lock for one tree.
///
/// `pg_advisory_xact_lock` releases at commit/rollback, which is exactly
/// the insert-through-rebuild window the encoding needs.
pub async fn lock_tree<C: ConnectionTrait>(
    conn: &C,
    lock_space: i32,
    tree_id: Uuid,
) -> AppResult<()> {
    let b = tree_id.as_bytes();
    let key = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    conn.execute_raw(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1, $2)",
        [Value::Int(Some(lock_space)), Value::Int(Some(key))],
    ))
    .await
    .map_err(|e| AppError::Database(format!("Failed to lock tree: {}", e)))?;
    Ok(())
}

/// Recompute the full encoding for one tree and persist every change.
///
/// Idempotent; safe to call repeatedly.
pub async fn rebuild<T: TreeEntity>(
    txn: &DatabaseTransaction,
    tree_id: Uuid,
) -> AppResult<usize> {
    let rows = T::load_tree(txn, tree_id).await?;
    let updates =
        tree::assign_bounds(&rows).map_err(|issue| AppError::Consistency(issue.to_string()))?;
    let delta = tree::diff_bounds(&rows, updates);
    T::apply_bounds(txn, &delta).await?;
    Ok(delta.len())
}

/// Rebuild minimizing writes: verify the stored encoding first and persist
/// only the changed rows; a broken encoding falls back to a full rebuild.
pub async fn partial_rebuild<T: TreeEntity>(
    txn: &DatabaseTransaction,
    tree_id: Uuid,
) -> AppResult<usize> {
    let rows = T::load_tree(txn, tree_id).await?;

    if let Err(issue) = tree::validate_encoding(&rows) {
        warn!(
            tree_id = %tree_id,
            issue = %issue,
            "stored tree encoding inconsistent, falling back to full rebuild"
        );
        return rebuild::<T>(txn, tree_id).await;
    }

    let updates =
        tree::assign_bounds(&rows).map_err(|issue| AppError::Consistency(issue.to_string()))?;
    let delta = tree::diff_bounds(&rows, updates);
    T::apply_bounds(txn, &delta).await?;
    Ok(delta.len())
}

/// Reparent a node, refusing moves that would create a cycle.
///
/// When the new parent lives in a different tree, the whole moved subtree
/// is reassigned to that tree and both trees are rebuilt.
pub async fn move_node<T: TreeEntity>(
    txn: &DatabaseTransaction,
    node_id: Uuid,
    node_tree: Uuid,
    new_parent: Option<(Uuid, Uuid)>,
) -> AppResult<()> {
    lock_tree(txn, T::LOCK_SPACE, node_tree).await?;

    let rows = T::load_tree(txn, node_tree).await?;
    let node = rows
        .iter()
        .find(|r| r.id == node_id)
        .ok_or_else(|| AppError::NotFound("Tree node".to_string()))?
        .clone();

    match new_parent {
        Some((parent_id, parent_tree)) if parent_tree == node_tree => {
            if tree::would_cycle(node_id, parent_id, &rows) {
                return Err(AppError::TreeCycle);
            }
            T::set_parent(txn, node_id, Some(parent_id), node_tree).await?;
            partial_rebuild::<T>(txn, node_tree).await?;
        }
        Some((parent_id, parent_tree)) => {
            // Cross-tree move: carry the whole subtree into the parent's tree.
            lock_tree(txn, T::LOCK_SPACE, parent_tree).await?;
            let subtree: Vec<Uuid> = rows
                .iter()
                .filter(|r| r.id == node_id || tree::is_descendant(r, &node))
                .map(|r| r.id)
                .collect();
            T::set_tree(txn, &subtree, parent_tree).await?;
            T::set_parent(txn, node_id, Some(parent_id), parent_tree).await?;
            partial_rebuild::<T>(txn, node_tree).await?;
            partial_rebuild::<T>(txn, parent_tree).await?;
        }
        None if node.parent_id.is_none() => {}
        None => {
            // Detach into a fresh tree of its own.
            let new_tree = Uuid::now_v7();
            let subtree: Vec<Uuid> = rows
                .iter()
                .filter(|r| r.id == node_id || tree::is_descendant(r, &node))
                .map(|r| r.id)
                .collect();
            T::set_tree(txn, &subtree, new_tree).await?;
            T::set_parent(txn, node_id, None, new_tree).await?;
            partial_rebuild::<T>(txn, node_tree).await?;
            partial_rebuild::<T>(txn, new_tree).await?;
        }
    }

    Ok(())
}
