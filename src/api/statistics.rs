//! Statistics API handlers.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    HistogramPoint, HistogramQuery, LabelsCondition, ProgressEntry, ProgressQuery,
    StatisticsQuery, StatusTallyEntry,
};
use crate::services::statistics;

fn default_true() -> bool {
    true
}

/// Wire form of the tally query: label lists arrive comma-separated.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RawStatisticsQuery {
    /// Comma-separated label ids; keep only tests whose case carries them.
    #[serde(default)]
    pub labels: Option<String>,
    /// Comma-separated label ids; drop tests whose case carries any.
    #[serde(default)]
    pub not_labels: Option<String>,
    #[serde(default)]
    pub labels_condition: LabelsCondition,
    #[serde(default = "default_true")]
    pub include_descendants: bool,
}

fn parse_uuid_list(field: &str, raw: &Option<String>) -> AppResult<Option<Vec<Uuid>>> {
    let Some(raw) = raw else { return Ok(None) };
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::validation(field, format!("'{}' is not a valid id", part)))?;
        out.push(id);
    }
    Ok(Some(out))
}

impl RawStatisticsQuery {
    fn parse(self) -> AppResult<StatisticsQuery> {
        Ok(StatisticsQuery {
            labels: parse_uuid_list("labels", &self.labels)?,
            not_labels: parse_uuid_list("not_labels", &self.not_labels)?,
            labels_condition: self.labels_condition,
            include_descendants: self.include_descendants,
        })
    }
}

/// Current-status tally for a plan subtree.
#[utoipa::path(
    get,
    path = "/plans/{plan_id}/statistics",
    tag = "Statistics",
    params(("plan_id" = Uuid, Path, description = "Plan id"), RawStatisticsQuery),
    responses(
        (status = 200, description = "Status tally", body = [StatusTallyEntry]),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn plan_statistics(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<RawStatisticsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner().parse()?;
    let tally = statistics::plan_statistics(&pool, path.into_inner(), query).await?;
    Ok(HttpResponse::Ok().json(tally))
}

/// Result histogram for a plan subtree, by day or by result attribute.
#[utoipa::path(
    get,
    path = "/plans/{plan_id}/histogram",
    tag = "Statistics",
    params(("plan_id" = Uuid, Path, description = "Plan id"), HistogramQuery),
    responses(
        (status = 200, description = "Histogram points", body = [HistogramPoint]),
        (status = 400, description = "Bad date range"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn plan_histogram(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<HistogramQuery>,
) -> AppResult<HttpResponse> {
    let points = statistics::plan_histogram(&pool, path.into_inner(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(points))
}

/// Progress counters for a plan's direct children.
#[utoipa::path(
    get,
    path = "/plans/{plan_id}/progress",
    tag = "Statistics",
    params(("plan_id" = Uuid, Path, description = "Plan id"), ProgressQuery),
    responses(
        (status = 200, description = "Progress entries", body = [ProgressEntry]),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn plan_progress(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
    query: web::Query<ProgressQuery>,
) -> AppResult<HttpResponse> {
    let entries =
        statistics::plan_progress(&pool, &config, path.into_inner(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Progress counters for each root plan of a project.
#[utoipa::path(
    get,
    path = "/projects/{project_id}/progress",
    tag = "Statistics",
    params(("project_id" = Uuid, Path, description = "Project id"), ProgressQuery),
    responses(
        (status = 200, description = "Progress entries", body = [ProgressEntry]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn project_progress(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
    query: web::Query<ProgressQuery>,
) -> AppResult<HttpResponse> {
    let entries =
        statistics::project_progress(&pool, &config, path.into_inner(), query.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Configure statistics routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/plans/{plan_id}/statistics").route(web::get().to(plan_statistics)),
    )
    .service(web::resource("/plans/{plan_id}/histogram").route(web::get().to(plan_histogram)))
    .service(web::resource("/plans/{plan_id}/progress").route(web::get().to(plan_progress)))
    .service(
        web::resource("/projects/{project_id}/progress").route(web::get().to(project_progress)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_list_accepts_comma_separated_ids() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let raw = Some(format!("{}, {}", a, b));
        let parsed = parse_uuid_list("labels", &raw).unwrap().unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn test_parse_uuid_list_rejects_garbage() {
        let raw = Some("not-a-uuid".to_string());
        assert!(parse_uuid_list("labels", &raw).is_err());
    }

    #[test]
    fn test_parse_uuid_list_absent_stays_absent() {
        assert!(parse_uuid_list("labels", &None).unwrap().is_none());
    }
}
