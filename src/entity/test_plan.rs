//! TestPlan entity for SeaORM.
//!
//! Plans share the nested-set encoding with suites. Leaf plans generated
//! from a parameter combination carry their parameters via the
//! `plan_parameters` join table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub tree_id: Uuid,
    pub lft: i32,
    pub rght: i32,
    pub level: i32,
    pub name: String,
    pub description: String,
    pub started_at: DateTimeUtc,
    pub due_date: DateTimeUtc,
    pub finished_at: Option<DateTimeUtc>,
    pub is_archive: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::test_record::Entity")]
    Tests,
    #[sea_orm(has_many = "super::plan_parameter::Entity")]
    PlanParameters,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::test_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tests.def()
    }
}

impl Related<super::plan_parameter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanParameters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
