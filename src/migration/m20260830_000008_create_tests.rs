//! Migration: Create tests table.
//!
//! A Test pairs one case with one plan; results hang off it. last_status
//! is a denormalized copy of the newest result's status.

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
                CREATE TABLE tests (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    plan_id UUID NOT NULL REFERENCES test_plans(id) ON DELETE CASCADE,
                    case_id UUID NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,

                    assignee_id UUID,
                    is_archive BOOLEAN NOT NULL DEFAULT FALSE,
                    last_status VARCHAR(50),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_tests_plan_id ON tests(plan_id)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_tests_case_id ON tests(case_id)
                    WHERE deleted_at IS NULL;

                -- Reconciliation looks pairings up by (plan, case)
                CREATE INDEX idx_tests_plan_case ON tests(plan_id, case_id)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_tests_updated_at
                    BEFORE UPDATE ON tests
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
                DROP TRIGGER IF EXISTS update_tests_updated_at ON tests;
                DROP TABLE IF EXISTS tests CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
