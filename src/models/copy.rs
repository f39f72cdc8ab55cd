//! Request/response DTOs for the copy endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One suite selected for copying, optionally renamed at the root.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SuiteCopySpec {
    pub id: Uuid,
    #[serde(default)]
    pub new_name: Option<String>,
}

/// Payload for copying suite subtrees.
///
/// When `dst_project_id` is absent the destination defaults to each
/// source suite's own project, so `dst_suite_id` must then belong to
/// that same project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CopySuitesRequest {
    pub suites: Vec<SuiteCopySpec>,
    #[serde(default)]
    pub dst_suite_id: Option<Uuid>,
    #[serde(default)]
    pub dst_project_id: Option<Uuid>,
}

/// One case selected for copying.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CaseCopySpec {
    pub id: Uuid,
    #[serde(default)]
    pub new_name: Option<String>,
}

/// Payload for copying cases into a destination suite.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyCasesRequest {
    pub cases: Vec<CaseCopySpec>,
    pub dst_suite_id: Uuid,
}

/// Mapping from a source id to its freshly created copy.
#[derive(Debug, Serialize, ToSchema)]
pub struct CopiedEntry {
    pub src_id: Uuid,
    pub new_id: Uuid,
}

/// Response body for both copy endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct CopyResponse {
    pub suites: Vec<CopiedEntry>,
    pub cases: Vec<CopiedEntry>,
}
