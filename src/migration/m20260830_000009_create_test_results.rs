//! Migration: Create test_results table.
//!
//! Append-only: rows are never updated, so the newest row per test (by
//! created_at, then id) is the current status.

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
                CREATE TABLE test_results (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    test_id UUID NOT NULL REFERENCES tests(id) ON DELETE CASCADE,

                    status VARCHAR(50) NOT NULL,
                    comment TEXT NOT NULL DEFAULT '',
                    attributes JSONB,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                -- Latest-result window queries scan this ordered per test
                CREATE INDEX idx_test_results_test_created
                    ON test_results(test_id, created_at DESC, id DESC)
                    WHERE deleted_at IS NULL;

                -- Histogram range scans
                CREATE INDEX idx_test_results_created_at ON test_results(created_at)
                    WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS test_results CASCADE;")
            .await?;

        Ok(())
    }
}
