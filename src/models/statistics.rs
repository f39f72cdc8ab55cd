//! Query parameters and response shapes for the statistics endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::LabelsCondition;

fn default_true() -> bool {
    true
}

/// Query parameters for the status tally endpoint.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct StatisticsQuery {
    /// Restrict to cases carrying these labels.
    #[serde(default)]
    pub labels: Option<Vec<Uuid>>,
    /// Exclude cases carrying any of these labels.
    #[serde(default)]
    pub not_labels: Option<Vec<Uuid>>,
    #[serde(default)]
    pub labels_condition: LabelsCondition,
    /// Include tests of descendant plans, not just the plan itself.
    #[serde(default = "default_true")]
    pub include_descendants: bool,
}

/// One bucket of the status tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusTallyEntry {
    pub label: String,
    pub value: i64,
}

/// Query parameters for the histogram endpoint.
///
/// Without `attribute` the histogram buckets by result day; with it,
/// by the named result attribute value.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistogramQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub attribute: Option<String>,
}

/// One point of a histogram series: a bucket with per-status counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HistogramPoint {
    /// Bucket key: an ISO date for day histograms, an attribute value otherwise.
    pub point: String,
    pub values: Vec<StatusTallyEntry>,
}

/// Query parameters for the progress endpoint.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ProgressQuery {
    /// Override the recent-progress window, in days.
    #[serde(default)]
    pub period_days: Option<i64>,
}

/// Progress counters for one plan subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub tests_total: i64,
    pub tests_progress_total: i64,
    pub tests_progress_period: i64,
}
