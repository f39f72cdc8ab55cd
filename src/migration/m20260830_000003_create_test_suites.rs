//! Migration: Create test_suites table.
//!
//! Nested-set encoded forest: (tree_id, lft, rght) drive every subtree and
//! ancestor query; parent_id stays the source of truth for structure.

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
                CREATE TABLE test_suites (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    parent_id UUID REFERENCES test_suites(id) ON DELETE CASCADE,

                    -- Nested-set encoding
                    tree_id UUID NOT NULL,
                    lft INTEGER NOT NULL DEFAULT 0,
                    rght INTEGER NOT NULL DEFAULT 0,
                    level INTEGER NOT NULL DEFAULT 0,

                    name VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL DEFAULT '',

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_test_suites_project_id ON test_suites(project_id)
                    WHERE deleted_at IS NULL;

                -- Interval queries scan one tree ordered by lft
                CREATE INDEX idx_test_suites_tree_bounds ON test_suites(tree_id, lft, rght);

                CREATE INDEX idx_test_suites_parent_id ON test_suites(parent_id)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_test_suites_updated_at
                    BEFORE UPDATE ON test_suites
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
                DROP TRIGGER IF EXISTS update_test_suites_updated_at ON test_suites;
                DROP TABLE IF EXISTS test_suites CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
