//! Migration: Create test_plans table.
//!
//! Same nested-set shape as test_suites, plus scheduling fields and the
//! archive flag.

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
                CREATE TABLE test_plans (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    parent_id UUID REFERENCES test_plans(id) ON DELETE CASCADE,

                    -- Nested-set encoding
                    tree_id UUID NOT NULL,
                    lft INTEGER NOT NULL DEFAULT 0,
                    rght INTEGER NOT NULL DEFAULT 0,
                    level INTEGER NOT NULL DEFAULT 0,

                    name VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL DEFAULT '',

                    started_at TIMESTAMPTZ NOT NULL,
                    due_date TIMESTAMPTZ NOT NULL,
                    finished_at TIMESTAMPTZ,
                    is_archive BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_test_plans_project_id ON test_plans(project_id)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_test_plans_tree_bounds ON test_plans(tree_id, lft, rght);

                CREATE INDEX idx_test_plans_parent_id ON test_plans(parent_id)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_test_plans_updated_at
                    BEFORE UPDATE ON test_plans
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
                DROP TRIGGER IF EXISTS update_test_plans_updated_at ON test_plans;
                DROP TABLE IF EXISTS test_plans CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
