//! TestCase entity for SeaORM.
//!
//! The free-text fields (setup/scenario/expected/teardown/description) may
//! embed `attachments/{id}/` references; the copy engine rewrites those
//! when cloning. `current_version` points into the case_versions log.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub setup: String,
    pub scenario: String,
    pub expected: String,
    pub teardown: String,
    pub description: String,
    pub estimate: Option<i32>,
    pub is_steps: bool,
    pub current_version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::SuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Cascade"
    )]
    Suite,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(has_many = "super::test_case_step::Entity")]
    Steps,
    #[sea_orm(has_many = "super::test_record::Entity")]
    Tests,
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suite.def()
    }
}

impl Related<super::test_case_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steps.def()
    }
}

impl Related<super::test_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
