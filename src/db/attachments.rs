//! Database queries for attachments.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::attachment::{self, ActiveModel as AttachmentActiveModel, Entity as Attachment};
use crate::error::{AppError, AppResult};
use crate::models::RefKind;

/// Live attachments hanging off any of the given items of one kind.
pub async fn list_for_items<C: ConnectionTrait>(
    conn: &C,
    kind: RefKind,
    item_ids: &[Uuid],
) -> AppResult<Vec<attachment::Model>> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let result = Attachment::find()
        .filter(attachment::Column::Kind.eq(kind.as_str()))
        .filter(attachment::Column::ItemId.is_in(item_ids.to_vec()))
        .filter(attachment::Column::DeletedAt.is_null())
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))?;
    Ok(result)
}

/// Bulk-insert fully-formed attachment rows (copy engine output).
pub async fn bulk_insert(
    txn: &DatabaseTransaction,
    attachments: Vec<attachment::Model>,
) -> AppResult<()> {
    if attachments.is_empty() {
        return Ok(());
    }
    let models: Vec<AttachmentActiveModel> = attachments
        .into_iter()
        .map(|a| AttachmentActiveModel {
            id: Set(a.id),
            project_id: Set(a.project_id),
            kind: Set(a.kind),
            item_id: Set(a.item_id),
            name: Set(a.name),
            content: Set(a.content),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
            deleted_at: Set(a.deleted_at),
        })
        .collect();
    Attachment::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to bulk-insert attachments: {}", e)))?;
    Ok(())
}
