//! Migration: Create labels table.

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
                CREATE TABLE labels (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,

                    name VARCHAR(255) NOT NULL,
                    label_type INTEGER NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                -- Copy reuse looks labels up case-insensitively by name and type
                CREATE INDEX idx_labels_project_name
                    ON labels(project_id, lower(name), label_type)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_labels_updated_at
                    BEFORE UPDATE ON labels
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
                DROP TRIGGER IF EXISTS update_labels_updated_at ON labels;
                DROP TABLE IF EXISTS labels CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
