//! Migration: Create plan_parameters join table.

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
                CREATE TABLE plan_parameters (
                    plan_id UUID NOT NULL REFERENCES test_plans(id) ON DELETE CASCADE,
                    parameter_id UUID NOT NULL REFERENCES parameters(id) ON DELETE CASCADE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    PRIMARY KEY (plan_id, parameter_id)
                );

                CREATE INDEX idx_plan_parameters_parameter_id ON plan_parameters(parameter_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS plan_parameters CASCADE;")
            .await?;

        Ok(())
    }
}
