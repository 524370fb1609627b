use actix_web::{web, HttpResponse, Result};

use crate::database::models::{AccountInfo, LoginInput, RegisterInput};
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::AppState;

pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse> {
    let response = state.auth_service.register(input.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        response,
        "User registered successfully",
    )))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse> {
    let response = state.auth_service.login(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        response,
        "Login successful",
    )))
}

pub async fn me(claims: Claims, state: web::Data<AppState>) -> Result<HttpResponse> {
    let account = state.auth_service.account_for(&claims).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(AccountInfo::from(account))))
}
