//! SeaORM entity definitions for PostgreSQL database.

pub mod attachment;
pub mod case_version;
pub mod label;
pub mod labeled_item;
pub mod parameter;
pub mod plan_parameter;
pub mod project;
pub mod test_case;
pub mod test_case_step;
pub mod test_plan;
pub mod test_record;
pub mod test_result;
pub mod test_suite;
