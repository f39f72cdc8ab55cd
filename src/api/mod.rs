//! API endpoint modules.

pub mod cases;
pub mod health;
pub mod openapi;
pub mod plans;
pub mod results;
pub mod statistics;
pub mod suites;

pub use cases::configure_routes as configure_case_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use plans::configure_routes as configure_plan_routes;
pub use results::configure_routes as configure_result_routes;
pub use statistics::configure_routes as configure_statistics_routes;
pub use suites::configure_routes as configure_suite_routes;
