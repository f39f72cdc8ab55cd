//! Test plan API handlers.

use actix_web::{web, HttpResponse};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{CreatePlanRequest, PlanListResponse, PlanResponse, UpdatePlanRequest};
use crate::services::materializer;

/// Query parameters for plan listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPlansQuery {
    /// Project to list plans for.
    pub project: Uuid,
}

/// Create one plan, or a batch when parameters are given.
#[utoipa::path(
    post,
    path = "/plans",
    tag = "Plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plans created", body = [PlanResponse]),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Project, parent, parameter or case not found")
    )
)]
pub async fn create_plan(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<CreatePlanRequest>,
) -> AppResult<HttpResponse> {
    let created = materializer::create_plans(&pool, &config, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Update a plan; may move it and reconcile its case pairings.
#[utoipa::path(
    patch,
    path = "/plans/{plan_id}",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Plan updated", body = PlanResponse),
        (status = 404, description = "Plan not found"),
        (status = 409, description = "Move would create a cycle")
    )
)]
pub async fn update_plan(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePlanRequest>,
) -> AppResult<HttpResponse> {
    let updated = materializer::update_plan(&pool, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Get one plan.
#[utoipa::path(
    get,
    path = "/plans/{plan_id}",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan found", body = PlanResponse),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn get_plan(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let plan = db::plans::require_plan(pool.connection(), path.into_inner()).await?;
    let parameters = db::plans::parameter_ids_of(pool.connection(), plan.id).await?;
    Ok(HttpResponse::Ok().json(PlanResponse::from_model(plan, parameters)))
}

/// List a project's plans in tree order.
#[utoipa::path(
    get,
    path = "/plans",
    tag = "Plans",
    params(ListPlansQuery),
    responses(
        (status = 200, description = "Plans listed", body = PlanListResponse)
    )
)]
pub async fn list_plans(
    pool: web::Data<DbPool>,
    query: web::Query<ListPlansQuery>,
) -> AppResult<HttpResponse> {
    let plans = db::plans::list_by_project(pool.connection(), query.project).await?;
    let max_depth = db::plans::max_depth(pool.connection(), query.project).await?;
    let total = plans.len() as i64;
    let plans = plans
        .into_iter()
        .map(|p| PlanResponse::from_model(p, Vec::new()))
        .collect();
    Ok(HttpResponse::Ok().json(PlanListResponse {
        plans,
        total,
        max_depth,
    }))
}

/// Ancestor chain of a plan, root first.
#[utoipa::path(
    get,
    path = "/plans/{plan_id}/breadcrumbs",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Ancestors listed, root first", body = [PlanResponse]),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn plan_breadcrumbs(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let plan = db::plans::require_plan(pool.connection(), path.into_inner()).await?;
    let chain = db::plans::ancestors(pool.connection(), &plan, true).await?;
    let chain: Vec<PlanResponse> = chain
        .into_iter()
        .map(|p| PlanResponse::from_model(p, Vec::new()))
        .collect();
    Ok(HttpResponse::Ok().json(chain))
}

/// Soft-delete a plan subtree with its tests and results.
#[utoipa::path(
    delete,
    path = "/plans/{plan_id}",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn delete_plan(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let plan = db::plans::require_plan(&txn, path.into_inner()).await?;
    let subtree = db::plans::descendants(&txn, &plan, true).await?;
    let ids: Vec<Uuid> = subtree.iter().map(|p| p.id).collect();
    db::recovery::soft_delete_plans(&txn, &ids).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit plan deletion: {}", e)))?;

    info!(plan_id = %plan.id, removed = ids.len(), "soft-deleted plan subtree");
    Ok(HttpResponse::NoContent().finish())
}

/// Restore a soft-deleted plan subtree.
#[utoipa::path(
    post,
    path = "/plans/{plan_id}/restore",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan restored", body = PlanResponse),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn restore_plan(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let plan_id = path.into_inner();
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let plan = db::plans::get_plan_any(&txn, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test plan".to_string()))?;
    let ids = db::plans::subtree_ids_any(&txn, &plan).await?;
    db::recovery::restore_plans(&txn, &ids).await?;

    let restored = db::plans::require_plan(&txn, plan_id).await?;
    let parameters = db::plans::parameter_ids_of(&txn, restored.id).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit plan restore: {}", e)))?;

    info!(plan_id = %plan_id, restored = ids.len(), "restored plan subtree");
    Ok(HttpResponse::Ok().json(PlanResponse::from_model(restored, parameters)))
}

/// Archive payload: absent body archives, `archived: false` unarchives.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ArchiveRequest {
    #[serde(default = "default_archived")]
    pub archived: bool,
}

fn default_archived() -> bool {
    true
}

impl Default for ArchiveRequest {
    fn default() -> Self {
        ArchiveRequest { archived: true }
    }
}

/// Toggle the archive flag on a plan subtree and its tests.
#[utoipa::path(
    post,
    path = "/plans/{plan_id}/archive",
    tag = "Plans",
    params(("plan_id" = Uuid, Path, description = "Plan id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Archive flag set", body = PlanResponse),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn archive_plan(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: Option<web::Json<ArchiveRequest>>,
) -> AppResult<HttpResponse> {
    let plan_id = path.into_inner();
    let archived = body.map(|b| b.archived).unwrap_or(true);

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let plan = db::plans::require_plan(&txn, plan_id).await?;
    let subtree = db::plans::descendants(&txn, &plan, true).await?;
    let ids: Vec<Uuid> = subtree.iter().map(|p| p.id).collect();
    db::recovery::set_archive_plans(&txn, &ids, archived).await?;

    let updated = db::plans::require_plan(&txn, plan_id).await?;
    let parameters = db::plans::parameter_ids_of(&txn, updated.id).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit archive toggle: {}", e)))?;

    info!(plan_id = %plan_id, archived, count = ids.len(), "toggled archive flag");
    Ok(HttpResponse::Ok().json(PlanResponse::from_model(updated, parameters)))
}

/// Configure plan routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/plans")
            .route(web::get().to(list_plans))
            .route(web::post().to(create_plan)),
    )
    .service(
        web::resource("/plans/{plan_id}")
            .route(web::get().to(get_plan))
            .route(web::patch().to(update_plan))
            .route(web::delete().to(delete_plan)),
    )
    .service(web::resource("/plans/{plan_id}/restore").route(web::post().to(restore_plan)))
    .service(web::resource("/plans/{plan_id}/archive").route(web::post().to(archive_plan)))
    .service(web::resource("/plans/{plan_id}/breadcrumbs").route(web::get().to(plan_breadcrumbs)));
}
