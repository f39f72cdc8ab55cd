//! Test result API handlers.

use actix_web::{web, HttpResponse};
use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{CreateResultRequest, ResultListResponse, ResultResponse};

/// Record a result; updates the Test's denormalized last_status.
#[utoipa::path(
    post,
    path = "/tests/{test_id}/results",
    tag = "Results",
    params(("test_id" = Uuid, Path, description = "Test id")),
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ResultResponse),
        (status = 404, description = "Test not found")
    )
)]
pub async fn create_result(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreateResultRequest>,
) -> AppResult<HttpResponse> {
    let test_id = path.into_inner();
    let body = body.into_inner();

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let test = db::test_records::require_test(&txn, test_id).await?;
    let inserted = db::results::insert_result(
        &txn,
        db::results::NewResult {
            project_id: test.project_id,
            test_id: test.id,
            status: body.status,
            comment: body.comment,
            attributes: body.attributes,
        },
    )
    .await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit result: {}", e)))?;

    info!(test_id = %test_id, status = %inserted.status, "recorded result");
    Ok(HttpResponse::Created().json(ResultResponse::from(inserted)))
}

/// List a Test's results, newest first.
#[utoipa::path(
    get,
    path = "/tests/{test_id}/results",
    tag = "Results",
    params(("test_id" = Uuid, Path, description = "Test id")),
    responses(
        (status = 200, description = "Results listed", body = ResultListResponse),
        (status = 404, description = "Test not found")
    )
)]
pub async fn list_results(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let test = db::test_records::require_test(pool.connection(), path.into_inner()).await?;
    let results = db::results::list_by_test(pool.connection(), test.id).await?;
    let total = results.len() as i64;
    let results = results.into_iter().map(ResultResponse::from).collect();
    Ok(HttpResponse::Ok().json(ResultListResponse { results, total }))
}

/// Configure result routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/tests/{test_id}/results")
            .route(web::get().to(list_results))
            .route(web::post().to(create_result)),
    );
}
