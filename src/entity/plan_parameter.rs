//! Plan/parameter join entity for SeaORM.
//!
//! At most one parameter per group per plan, enforced by the materializer
//! (each row comes from one generated combination).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plan_parameters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub plan_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub parameter_id: Uuid,
    pub created_at: DateTimeUtc,
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
        belongs_to = "super::parameter::Entity",
        from = "Column::ParameterId",
        to = "super::parameter::Column::Id",
        on_delete = "Cascade"
    )]
    Parameter,
}

impl Related<super::test_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::parameter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parameter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
