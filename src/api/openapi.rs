//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TMS Server",
        version = "0.3.0",
        description = "Test management backend: suite/plan trees, parameterized plan generation, statistics and deep copy"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Plan endpoints
        api::plans::create_plan,
        api::plans::update_plan,
        api::plans::get_plan,
        api::plans::list_plans,
        api::plans::delete_plan,
        api::plans::restore_plan,
        api::plans::archive_plan,
        api::plans::plan_breadcrumbs,
        // Suite endpoints
        api::suites::create_suite,
        api::suites::update_suite,
        api::suites::get_suite,
        api::suites::list_suites,
        api::suites::delete_suite,
        api::suites::copy_suites,
        api::suites::suite_breadcrumbs,
        // Case endpoints
        api::cases::copy_cases,
        // Result endpoints
        api::results::create_result,
        api::results::list_results,
        // Statistics endpoints
        api::statistics::plan_statistics,
        api::statistics::plan_histogram,
        api::statistics::plan_progress,
        api::statistics::project_progress,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::RefKind,
            models::LabelsCondition,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Plans
            models::CreatePlanRequest,
            models::UpdatePlanRequest,
            models::PlanResponse,
            models::PlanListResponse,
            api::plans::ArchiveRequest,
            // Suites
            models::CreateSuiteRequest,
            models::UpdateSuiteRequest,
            models::SuiteResponse,
            models::SuiteListResponse,
            // Copy
            models::SuiteCopySpec,
            models::CopySuitesRequest,
            models::CaseCopySpec,
            models::CopyCasesRequest,
            models::CopiedEntry,
            models::CopyResponse,
            // Results
            models::CreateResultRequest,
            models::ResultResponse,
            models::ResultListResponse,
            // Statistics
            models::StatusTallyEntry,
            models::HistogramPoint,
            models::ProgressEntry,
        )
    ),
    tags(
        (name = "Health", description = "Service health and readiness"),
        (name = "Plans", description = "Test plan management"),
        (name = "Suites", description = "Test suite management"),
        (name = "Cases", description = "Test case operations"),
        (name = "Results", description = "Recording and listing test results"),
        (name = "Statistics", description = "Status tallies, histograms and progress")
    )
)]
pub struct ApiDoc;
