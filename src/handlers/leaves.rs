use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::database::models::{ApplyLeaveInput, LeaveListQuery, LeaveRequestView};
use crate::handlers::shared::{ApiResponse, Pagination};
use crate::services::auth::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestResponse {
    pub leave_request: LeaveRequestView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListResponse {
    pub leaves: Vec<LeaveRequestView>,
    pub pagination: Pagination,
}

/// Submit a leave request for yourself, or (as Admin) for any employee.
pub async fn apply_leave(
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<ApplyLeaveInput>,
) -> Result<HttpResponse> {
    let leave_request = state
        .leave_service
        .apply_leave(&claims, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        LeaveRequestResponse { leave_request },
        "Leave request submitted successfully",
    )))
}

pub async fn list_leaves(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<LeaveListQuery>,
) -> Result<HttpResponse> {
    let page = state.leave_service.list_leaves(&claims, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(LeaveListResponse {
        leaves: page.leaves,
        pagination: Pagination::new(page.page, page.limit, page.total),
    })))
}

/// Approve a pending request (Admin only).
pub async fn approve_leave(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let decided = state
        .leave_service
        .approve_leave(&claims, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        decided,
        "Leave approved successfully",
    )))
}

/// Reject a pending request (Admin only).
pub async fn reject_leave(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let leave_request = state
        .leave_service
        .reject_leave(&claims, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        LeaveRequestResponse { leave_request },
        "Leave rejected successfully",
    )))
}

/// Cancel an approved, not-yet-started request (owner or Admin).
pub async fn cancel_leave(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let decided = state
        .leave_service
        .cancel_leave(&claims, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        decided,
        "Leave cancelled successfully",
    )))
}

/// Balance report for one employee (self or Admin).
pub async fn leave_balance(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let report = state
        .leave_service
        .leave_balance(&claims, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

/// Recompute and, if needed, correct the stored balance (Admin only).
pub async fn verify_leave_balance(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let verification = state
        .leave_service
        .verify_leave_balance(&claims, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        verification,
        "Leave balance verified",
    )))
}
