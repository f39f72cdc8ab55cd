//! Domain models and API DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod copy;
pub mod plan;
pub mod result;
pub mod statistics;
pub mod suite;

pub use copy::{
    CaseCopySpec, CopiedEntry, CopyCasesRequest, CopyResponse, CopySuitesRequest, SuiteCopySpec,
};
pub use plan::{CreatePlanRequest, PlanListResponse, PlanResponse, UpdatePlanRequest};
pub use result::{CreateResultRequest, ResultListResponse, ResultResponse};
pub use statistics::{
    HistogramPoint, HistogramQuery, ProgressEntry, ProgressQuery, StatisticsQuery, StatusTallyEntry,
};
pub use suite::{CreateSuiteRequest, SuiteListResponse, SuiteResponse, UpdateSuiteRequest};

/// Deserialize a field whose JSON `null` must stay distinguishable from
/// the key being absent: absent maps to `None`, `null` to `Some(None)`,
/// a value to `Some(Some(v))`. Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

/// Entity kinds that attachments and labels can reference.
///
/// An explicit discriminator instead of reflective content-type linkage:
/// stored as its `as_str` form, parsed on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Case,
    Step,
    Plan,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Case => "case",
            RefKind::Step => "step",
            RefKind::Plan => "plan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "case" => Some(RefKind::Case),
            "step" => Some(RefKind::Step),
            "plan" => Some(RefKind::Plan),
            _ => None,
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How multiple label filters combine in a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabelsCondition {
    /// Case must carry every listed label.
    And,
    /// Case must carry at least one listed label.
    #[default]
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_kind_round_trip() {
        for kind in [RefKind::Case, RefKind::Step, RefKind::Plan] {
            assert_eq!(RefKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RefKind::parse("report"), None);
    }
}
