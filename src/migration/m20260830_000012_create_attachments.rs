//! Migration: Create attachments table.

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
                CREATE TABLE attachments (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,

                    kind VARCHAR(20) NOT NULL
                        CHECK (kind IN ('case', 'step', 'plan')),
                    item_id UUID NOT NULL,

                    name VARCHAR(500) NOT NULL,
                    content TEXT NOT NULL DEFAULT '',

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_attachments_item ON attachments(kind, item_id)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_attachments_updated_at
                    BEFORE UPDATE ON attachments
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_attachments_updated_at ON attachments;
                DROP TABLE IF EXISTS attachments CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
