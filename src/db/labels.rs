//! Database queries for labels and label assignments.

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, Select, Set,
};
use uuid::Uuid;

use crate::entity::label::{self, ActiveModel as LabelActiveModel, Entity as Label};
use crate::entity::labeled_item::{
    self, ActiveModel as LabeledItemActiveModel, Entity as LabeledItem,
};
use crate::error::{AppError, AppResult};
use crate::models::RefKind;

/// Live labels by id set.
pub async fn get_labels<C: ConnectionTrait>(
    conn: &C,
    label_ids: &[Uuid],
) -> AppResult<Vec<label::Model>> {
    if label_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = Label::find()
        .filter(label::Column::Id.is_in(label_ids.to_vec()))
        .filter(label::Column::DeletedAt.is_null())
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get labels: {}", e)))?;
    Ok(result)
}

/// Live label assignments for a set of cases.
pub async fn items_for_cases<C: ConnectionTrait>(
    conn: &C,
    case_ids: &[Uuid],
) -> AppResult<Vec<labeled_item::Model>> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = LabeledItem::find()
        .filter(labeled_item::Column::Kind.eq(RefKind::Case.as_str()))
        .filter(labeled_item::Column::ItemId.is_in(case_ids.to_vec()))
        .filter(labeled_item::Column::DeletedAt.is_null())
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get labeled items: {}", e)))?;
    Ok(result)
}

/// Case-insensitive lookup of a label by name and type within a project.
/// Used by the copy engine's reuse path. Exact equality on the lowercased
/// name; a LIKE-style match would let `%`/`_` in label names act as
/// wildcards.
pub async fn find_by_name_type<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
    name: &str,
    label_type: i32,
) -> AppResult<Option<label::Model>> {
    let result = name_type_query(project_id, name, label_type)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find label by name: {}", e)))?;
    Ok(result)
}

fn name_type_query(project_id: Uuid, name: &str, label_type: i32) -> Select<Label> {
    Label::find()
        .filter(label::Column::ProjectId.eq(project_id))
        .filter(label::Column::LabelType.eq(label_type))
        .filter(Expr::expr(Func::lower(Expr::col(label::Column::Name))).eq(name.to_lowercase()))
        .filter(label::Column::DeletedAt.is_null())
}

/// Bulk-insert fully-formed label rows (copy engine output).
pub async fn bulk_insert_labels(
    txn: &DatabaseTransaction,
    labels: Vec<label::Model>,
) -> AppResult<()> {
    if labels.is_empty() {
        return Ok(());
    }
    let models: Vec<LabelActiveModel> = labels
        .into_iter()
        .map(|l| LabelActiveModel {
            id: Set(l.id),
            project_id: Set(l.project_id),
            name: Set(l.name),
            label_type: Set(l.label_type),
            created_at: Set(l.created_at),
            updated_at: Set(l.updated_at),
            deleted_at: Set(l.deleted_at),
        })
        .collect();
    Label::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert labels: {}", e)))?;
    Ok(())
}

/// Bulk-insert label assignments (copy engine output).
pub async fn bulk_insert_items(
    txn: &DatabaseTransaction,
    items: Vec<labeled_item::Model>,
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    let models: Vec<LabeledItemActiveModel> = items
        .into_iter()
        .map(|i| LabeledItemActiveModel {
            id: Set(i.id),
            label_id: Set(i.label_id),
            kind: Set(i.kind),
            item_id: Set(i.item_id),
            created_at: Set(i.created_at),
            deleted_at: Set(i.deleted_at),
        })
        .collect();
    LabeledItem::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert labeled items: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_name_lookup_is_equality_not_pattern() {
        // "v1_2" must not match "v1x2": the name is compared verbatim,
        // never as a LIKE pattern.
        let sql = name_type_query(Uuid::now_v7(), "v1_2", 0)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("LOWER("));
        assert!(sql.contains("'v1_2'"));
        assert!(!sql.to_uppercase().contains("LIKE"));
    }

    #[test]
    fn test_name_lookup_lowercases_input() {
        let sql = name_type_query(Uuid::now_v7(), "Smoke", 1)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("'smoke'"));
    }
}
