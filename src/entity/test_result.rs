//! TestResult entity for SeaORM.
//!
//! Results are immutable once created. A test's current status is the
//! status of its most recent result by created_at, ties broken by highest
//! id (UUIDv7 is time-ordered).

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub test_id: Uuid,
    pub status: String,
    pub comment: String,
    /// Free-form attribute map used by attribute-bucketed histograms.
    pub attributes: Option<JsonValue>,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_record::Entity",
        from = "Column::TestId",
        to = "super::test_record::Column::Id",
        on_delete = "Cascade"
    )]
    Test,
}

impl Related<super::test_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Test.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
