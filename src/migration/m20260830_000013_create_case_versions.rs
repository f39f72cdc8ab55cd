//! Migration: Create case_versions table.

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
                CREATE TABLE case_versions (
                    case_id UUID NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                    version INTEGER NOT NULL,

                    snapshot JSONB NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    PRIMARY KEY (case_id, version)
                );
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS case_versions CASCADE;")
            .await?;

        Ok(())
    }
}
