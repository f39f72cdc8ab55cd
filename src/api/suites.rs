//! Test suite API handlers.

use actix_web::{web, HttpResponse};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    CopyResponse, CopySuitesRequest, CreateSuiteRequest, SuiteListResponse, SuiteResponse,
    UpdateSuiteRequest,
};
use crate::services::{copy, materializer};

/// Query parameters for suite listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSuitesQuery {
    /// Project to list suites for.
    pub project: Uuid,
}

/// Create a suite.
#[utoipa::path(
    post,
    path = "/suites",
    tag = "Suites",
    request_body = CreateSuiteRequest,
    responses(
        (status = 201, description = "Suite created", body = SuiteResponse),
        (status = 404, description = "Project or parent not found")
    )
)]
pub async fn create_suite(
    pool: web::Data<DbPool>,
    body: web::Json<CreateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let created = materializer::create_suite(&pool, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Update a suite; may move it under a new parent.
#[utoipa::path(
    patch,
    path = "/suites/{suite_id}",
    tag = "Suites",
    params(("suite_id" = Uuid, Path, description = "Suite id")),
    request_body = UpdateSuiteRequest,
    responses(
        (status = 200, description = "Suite updated", body = SuiteResponse),
        (status = 404, description = "Suite not found"),
        (status = 409, description = "Move would create a cycle")
    )
)]
pub async fn update_suite(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let updated = materializer::update_suite(&pool, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Get one suite.
#[utoipa::path(
    get,
    path = "/suites/{suite_id}",
    tag = "Suites",
    params(("suite_id" = Uuid, Path, description = "Suite id")),
    responses(
        (status = 200, description = "Suite found", body = SuiteResponse),
        (status = 404, description = "Suite not found")
    )
)]
pub async fn get_suite(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let suite = db::suites::require_suite(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuiteResponse::from(suite)))
}

/// List a project's suites in tree order.
#[utoipa::path(
    get,
    path = "/suites",
    tag = "Suites",
    params(ListSuitesQuery),
    responses(
        (status = 200, description = "Suites listed", body = SuiteListResponse)
    )
)]
pub async fn list_suites(
    pool: web::Data<DbPool>,
    query: web::Query<ListSuitesQuery>,
) -> AppResult<HttpResponse> {
    let suites = db::suites::list_by_project(pool.connection(), query.project).await?;
    let max_depth = db::suites::max_depth(pool.connection(), query.project).await?;
    let total = suites.len() as i64;
    let suites = suites.into_iter().map(SuiteResponse::from).collect();
    Ok(HttpResponse::Ok().json(SuiteListResponse {
        suites,
        total,
        max_depth,
    }))
}

/// Ancestor chain of a suite, root first.
#[utoipa::path(
    get,
    path = "/suites/{suite_id}/breadcrumbs",
    tag = "Suites",
    params(("suite_id" = Uuid, Path, description = "Suite id")),
    responses(
        (status = 200, description = "Ancestors listed, root first", body = [SuiteResponse]),
        (status = 404, description = "Suite not found")
    )
)]
pub async fn suite_breadcrumbs(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let suite = db::suites::require_suite(pool.connection(), path.into_inner()).await?;
    let chain = db::suites::ancestors(pool.connection(), &suite, true).await?;
    let chain: Vec<SuiteResponse> = chain.into_iter().map(SuiteResponse::from).collect();
    Ok(HttpResponse::Ok().json(chain))
}

/// Soft-delete a suite subtree with its cases and steps.
#[utoipa::path(
    delete,
    path = "/suites/{suite_id}",
    tag = "Suites",
    params(("suite_id" = Uuid, Path, description = "Suite id")),
    responses(
        (status = 204, description = "Suite deleted"),
        (status = 404, description = "Suite not found")
    )
)]
pub async fn delete_suite(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let suite = db::suites::require_suite(&txn, path.into_inner()).await?;
    let subtree = db::suites::descendants(&txn, &suite, true).await?;
    let ids: Vec<Uuid> = subtree.iter().map(|s| s.id).collect();
    db::recovery::soft_delete_suites(&txn, &ids).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit suite deletion: {}", e)))?;

    info!(suite_id = %suite.id, removed = ids.len(), "soft-deleted suite subtree");
    Ok(HttpResponse::NoContent().finish())
}

/// Deep-copy suite subtrees, optionally into another suite or project.
#[utoipa::path(
    post,
    path = "/suites/copy",
    tag = "Suites",
    request_body = CopySuitesRequest,
    responses(
        (status = 201, description = "Suites copied", body = CopyResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Suite or project not found")
    )
)]
pub async fn copy_suites(
    pool: web::Data<DbPool>,
    body: web::Json<CopySuitesRequest>,
) -> AppResult<HttpResponse> {
    let copied = copy::copy_suites(&pool, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(copied))
}

/// Configure suite routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/suites")
            .route(web::get().to(list_suites))
            .route(web::post().to(create_suite)),
    )
    .service(web::resource("/suites/copy").route(web::post().to(copy_suites)))
    .service(
        web::resource("/suites/{suite_id}")
            .route(web::get().to(get_suite))
            .route(web::patch().to(update_suite))
            .route(web::delete().to(delete_suite)),
    )
    .service(web::resource("/suites/{suite_id}/breadcrumbs").route(web::get().to(suite_breadcrumbs)));
}
