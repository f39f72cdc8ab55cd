//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260830_000001_create_projects;
mod m20260830_000002_create_parameters;
mod m20260830_000003_create_test_suites;
mod m20260830_000004_create_test_plans;
mod m20260830_000005_create_plan_parameters;
mod m20260830_000006_create_test_cases;
mod m20260830_000007_create_test_case_steps;
mod m20260830_000008_create_tests;
mod m20260830_000009_create_test_results;
mod m20260830_000010_create_labels;
mod m20260830_000011_create_labeled_items;
mod m20260830_000012_create_attachments;
mod m20260830_000013_create_case_versions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260830_000001_create_projects::Migration),
            Box::new(m20260830_000002_create_parameters::Migration),
            Box::new(m20260830_000003_create_test_suites::Migration),
            Box::new(m20260830_000004_create_test_plans::Migration),
            Box::new(m20260830_000005_create_plan_parameters::Migration),
            Box::new(m20260830_000006_create_test_cases::Migration),
            Box::new(m20260830_000007_create_test_case_steps::Migration),
            Box::new(m20260830_000008_create_tests::Migration),
            Box::new(m20260830_000009_create_test_results::Migration),
            Box::new(m20260830_000010_create_labels::Migration),
            Box::new(m20260830_000011_create_labeled_items::Migration),
            Box::new(m20260830_000012_create_attachments::Migration),
            Box::new(m20260830_000013_create_case_versions::Migration),
        ]
    }
}
