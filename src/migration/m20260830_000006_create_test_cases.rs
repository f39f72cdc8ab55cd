//! Migration: Create test_cases table.

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
                CREATE TABLE test_cases (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    suite_id UUID NOT NULL REFERENCES test_suites(id) ON DELETE CASCADE,

                    name VARCHAR(255) NOT NULL,

                    -- Rich-text scenario fields (may embed attachment references)
                    setup TEXT NOT NULL DEFAULT '',
                    scenario TEXT NOT NULL DEFAULT '',
                    expected TEXT NOT NULL DEFAULT '',
                    teardown TEXT NOT NULL DEFAULT '',
                    description TEXT NOT NULL DEFAULT '',

                    estimate INTEGER,                     -- seconds
                    is_steps BOOLEAN NOT NULL DEFAULT FALSE,
                    current_version INTEGER NOT NULL DEFAULT 1,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_test_cases_suite_id ON test_cases(suite_id)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_test_cases_project_id ON test_cases(project_id)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_test_cases_updated_at
                    BEFORE UPDATE ON test_cases
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
                DROP TRIGGER IF EXISTS update_test_cases_updated_at ON test_cases;
                DROP TABLE IF EXISTS test_cases CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
