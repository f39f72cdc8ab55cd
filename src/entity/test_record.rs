//! Test entity for SeaORM: the materialized pairing of one case with one plan.
//!
//! `last_status` is denormalized for fast listing filters and kept in sync
//! by the result-creation path; statistics recompute current status from
//! results instead of trusting it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub plan_id: Uuid,
    pub case_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub is_archive: bool,
    pub last_status: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_plan::Entity",
        from = "Column::PlanId",
        to = "super::test_plan::Column::Id",
        on_delete = "Cascade"
    )]
    Plan,
    #[sea_orm(
        belongs_to = "super::test_case::Entity",
        from = "Column::CaseId",
        to = "super::test_case::Column::Id",
        on_delete = "Cascade"
    )]
    Case,
    #[sea_orm(has_many = "super::test_result::Entity")]
    Results,
}

impl Related<super::test_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::test_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl Related<super::test_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
