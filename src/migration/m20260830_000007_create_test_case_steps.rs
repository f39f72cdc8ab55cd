//! Migration: Create test_case_steps table.

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
                CREATE TABLE test_case_steps (
                    id UUID PRIMARY KEY,
                    test_case_id UUID NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,

                    name VARCHAR(255) NOT NULL,
                    scenario TEXT NOT NULL DEFAULT '',
                    expected TEXT NOT NULL DEFAULT '',
                    sort_order INTEGER NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_test_case_steps_case_order
                    ON test_case_steps(test_case_id, sort_order)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_test_case_steps_updated_at
                    BEFORE UPDATE ON test_case_steps
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
                DROP TRIGGER IF EXISTS update_test_case_steps_updated_at ON test_case_steps;
                DROP TABLE IF EXISTS test_case_steps CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
