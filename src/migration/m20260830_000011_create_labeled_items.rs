//! Migration: Create labeled_items join table.
//!
//! `kind` + `item_id` reference cases, steps or plans without a hard
//! foreign key; the kind discriminator is validated in code.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE labeled_items (
                    id UUID PRIMARY KEY,
                    label_id UUID NOT NULL REFERENCES labels(id) ON DELETE CASCADE,

                    kind VARCHAR(20) NOT NULL
                        CHECK (kind IN ('case', 'step', 'plan')),
                    item_id UUID NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_labeled_items_item ON labeled_items(kind, item_id)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_labeled_items_label_id ON labeled_items(label_id)
                    WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS labeled_items CASCADE;")
            .await?;

        Ok(())
    }
}
