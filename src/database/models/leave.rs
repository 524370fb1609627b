use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

impl LeaveStatus {
    /// Terminal statuses admit no further transition, except the single
    /// Approved -> Cancelled edge handled by the accounting engine.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
        )
    }

    /// Client-facing capitalized form, matching the JSON casing.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
            LeaveStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day count, computed once at creation and never
    /// recomputed afterwards.
    pub days_requested: i64,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_at: DateTime<Utc>,
    pub decision_at: Option<DateTime<Utc>>,
    pub reviewer_id: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A leave request joined with its owner's display fields. This is the
/// read-side composition the API returns; the persisted entity never
/// embeds the employee.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub employee_name: String,
    pub employee_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveInput {
    /// Admins may apply on behalf of an employee; everyone else must
    /// leave this unset or name themselves.
    pub employee_id: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub available: i64,
    pub total_taken: i64,
    pub total_pending: i64,
    pub pending_requests: Vec<LeaveRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceReport {
    pub employee: EmployeeRef,
    pub leave_balance: LeaveBalance,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecidedLeave {
    pub leave_request: LeaveRequestView,
    pub new_balance: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedEmployee {
    pub name: String,
    pub email: String,
    pub old_balance: i64,
    pub new_balance: i64,
    pub corrected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTotals {
    pub total_approved: i64,
    pub total_days_taken: i64,
    pub expected_balance: i64,
}

/// Result of the admin-only balance reconciliation pass.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceVerification {
    pub employee: VerifiedEmployee,
    pub leaves: VerifiedTotals,
}
