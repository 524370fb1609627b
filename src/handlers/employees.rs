use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::database::models::{AccountInfo, AddEmployeeInput, EmployeeListQuery};
use crate::database::repositories::AccountRepository;
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, EmployeePagination};
use crate::services::auth::Claims;
use crate::AppState;

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListResponse {
    pub employees: Vec<AccountInfo>,
    pub pagination: EmployeePagination,
}

/// Provision a new employee account (Admin only). The opening balance is
/// always the annual limit, regardless of what the client sends.
pub async fn add_employee(
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<AddEmployeeInput>,
) -> Result<HttpResponse> {
    claims.require_admin()?;

    let employee = state
        .auth_service
        .provision_employee(input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        employee,
        "Employee added successfully",
    )))
}

/// Paginated employee listing with optional name/email search (Admin only).
pub async fn list_employees(
    claims: Claims,
    repo: web::Data<AccountRepository>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse> {
    claims.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let offset = i64::from(page - 1) * i64::from(limit);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let total = repo
        .count_employees(search)
        .await
        .map_err(AppError::from)?;
    let employees = repo
        .list_employees(search, i64::from(limit), offset)
        .await
        .map_err(AppError::from)?
        .iter()
        .map(AccountInfo::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(EmployeeListResponse {
        employees,
        pagination: EmployeePagination::new(page, limit, total),
    })))
}

/// Fetch a single account by id (Admin only).
pub async fn get_employee(
    claims: Claims,
    repo: web::Data<AccountRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    claims.require_admin()?;

    let id = path.into_inner();
    let account = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(AccountInfo::from(account))))
}
