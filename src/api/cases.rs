//! Test case API handlers.

use actix_web::{web, HttpResponse};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CopyCasesRequest, CopyResponse};
use crate::services::copy;

/// Copy cases into a destination suite, with their steps and attachments.
#[utoipa::path(
    post,
    path = "/cases/copy",
    tag = "Cases",
    request_body = CopyCasesRequest,
    responses(
        (status = 201, description = "Cases copied", body = CopyResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Case or destination suite not found")
    )
)]
pub async fn copy_cases(
    pool: web::Data<DbPool>,
    body: web::Json<CopyCasesRequest>,
) -> AppResult<HttpResponse> {
    let copied = copy::copy_cases(&pool, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(copied))
}

/// Configure case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/cases/copy").route(web::post().to(copy_cases)));
}
