//! Migration: Create parameters table.
//!
//! One row per (group, value); the combination engine crosses groups.

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
                CREATE TABLE parameters (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,

                    group_name VARCHAR(255) NOT NULL,
                    data VARCHAR(255) NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_parameters_project_id ON parameters(project_id)
                    WHERE deleted_at IS NULL;

                -- Group lookup for combination building
                CREATE INDEX idx_parameters_group_name ON parameters(project_id, group_name)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_parameters_updated_at
                    BEFORE UPDATE ON parameters
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
                DROP TRIGGER IF EXISTS update_parameters_updated_at ON parameters;
                DROP TABLE IF EXISTS parameters CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
