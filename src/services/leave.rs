//! The leave accounting engine.
//!
//! Every operation here validates against the freshest stored state and
//! leaves the employee balance and request lifecycle consistent: only an
//! approval debits the balance, only a cancellation credits it back, and
//! no two non-terminal requests for one employee may share a calendar
//! day.

use std::str::FromStr;

use crate::database::models::{
    ApplyLeaveInput, BalanceVerification, DecidedLeave, EmployeeAccount, EmployeeRef,
    LeaveBalance, LeaveBalanceReport, LeaveListQuery, LeaveRequestView, LeaveStatus,
    VerifiedEmployee, VerifiedTotals,
};
use crate::database::repositories::{AccountRepository, LeaveRepository};
use crate::dates;
use crate::error::AppError;
use crate::services::auth::Claims;

const MAX_PAGE_SIZE: u32 = 100;

/// One page of leave requests plus the numbers the pagination envelope
/// is built from.
#[derive(Debug)]
pub struct LeaveListPage {
    pub leaves: Vec<LeaveRequestView>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[derive(Clone)]
pub struct LeaveService {
    accounts: AccountRepository,
    leaves: LeaveRepository,
    annual_leave_limit: i64,
}

impl LeaveService {
    pub fn new(
        accounts: AccountRepository,
        leaves: LeaveRepository,
        annual_leave_limit: i64,
    ) -> Self {
        Self {
            accounts,
            leaves,
            annual_leave_limit,
        }
    }

    /// Submit a new leave request. Checks run in a fixed order and the
    /// first failure wins; a successful application never touches the
    /// employee's balance.
    pub async fn apply_leave(
        &self,
        claims: &Claims,
        input: ApplyLeaveInput,
    ) -> Result<LeaveRequestView, AppError> {
        let target_id = match input.employee_id.as_deref() {
            Some(id) if id != claims.account_id() => {
                if !claims.is_admin() {
                    return Err(AppError::Forbidden(
                        "Can only apply leave for yourself".to_string(),
                    ));
                }
                id.to_string()
            }
            _ => claims.account_id().to_string(),
        };

        let account = self
            .accounts
            .find_by_id(&target_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;
        let employee = account.as_employee().ok_or_else(|| {
            AppError::BadRequest("Can only apply leave for employees".to_string())
        })?;

        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "Reason for leave is required".to_string(),
            ));
        }

        let start_date = dates::parse_calendar_date(&input.start_date)?;
        let end_date = dates::parse_calendar_date(&input.end_date)?;

        if end_date < start_date {
            return Err(AppError::InvalidRange(
                "End date cannot be before start date".to_string(),
            ));
        }

        if start_date < employee.joining_date {
            return Err(AppError::InvalidRange(
                "Leave start date cannot be before joining date".to_string(),
            ));
        }

        let days_requested = dates::inclusive_day_count(start_date, end_date)?;
        if days_requested < 1 {
            return Err(AppError::BadRequest(
                "Leave must be at least 1 day".to_string(),
            ));
        }

        if employee.leave_balance <= 0 {
            return Err(AppError::InsufficientBalance {
                available: employee.leave_balance,
                requested: days_requested,
            });
        }

        // Days already promised to pending requests are not available,
        // even though the stored balance has not been debited yet.
        let pending_days = self
            .leaves
            .days_in_status(&employee.id, LeaveStatus::Pending)
            .await?;
        let available = employee.leave_balance - pending_days;
        if available <= 0 || days_requested > available {
            return Err(AppError::InsufficientBalance {
                available,
                requested: days_requested,
            });
        }

        if self
            .leaves
            .has_overlap(&employee.id, start_date, end_date)
            .await?
        {
            return Err(AppError::Conflict(
                "Overlapping leave request exists".to_string(),
            ));
        }

        Ok(self
            .leaves
            .create(&employee.id, start_date, end_date, days_requested, reason)
            .await?)
    }

    /// Role-scoped listing: non-admins only ever see their own requests.
    pub async fn list_leaves(
        &self,
        claims: &Claims,
        query: &LeaveListQuery,
    ) -> Result<LeaveListPage, AppError> {
        let employee_scope = if claims.is_admin() {
            query.employee_id.clone()
        } else {
            Some(claims.account_id().to_string())
        };

        let status = match query.status.as_deref() {
            Some(raw) => Some(
                LeaveStatus::from_str(raw)
                    .map_err(|_| AppError::BadRequest(format!("Invalid status: {}", raw)))?,
            ),
            None => None,
        };

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
        let offset = i64::from(page - 1) * i64::from(limit);

        let total = self.leaves.count(employee_scope.as_deref(), status).await?;
        let leaves = self
            .leaves
            .list(
                employee_scope.as_deref(),
                status,
                i64::from(limit),
                offset,
            )
            .await?;

        Ok(LeaveListPage {
            leaves,
            page,
            limit,
            total,
        })
    }

    /// Approve a pending request: the balance debit and the status
    /// transition are applied as one unit by the store.
    pub async fn approve_leave(
        &self,
        claims: &Claims,
        request_id: &str,
    ) -> Result<DecidedLeave, AppError> {
        claims.require_admin()?;

        let request = self
            .leaves
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Leave request not found"))?;

        if request.status != LeaveStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Leave already {}",
                request.status.label()
            )));
        }

        let employee = self.owner_of(&request.employee_id).await?;
        if employee.leave_balance < request.days_requested {
            return Err(AppError::InsufficientBalance {
                available: employee.leave_balance,
                requested: request.days_requested,
            });
        }

        let (leave_request, new_balance) =
            self.leaves.approve(&request, claims.account_id()).await?;

        Ok(DecidedLeave {
            leave_request,
            new_balance,
        })
    }

    /// Reject a pending request. No balance change.
    pub async fn reject_leave(
        &self,
        claims: &Claims,
        request_id: &str,
    ) -> Result<LeaveRequestView, AppError> {
        claims.require_admin()?;

        let request = self
            .leaves
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Leave request not found"))?;

        if request.status != LeaveStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Leave already {}",
                request.status.label()
            )));
        }

        self.leaves.reject(&request, claims.account_id()).await
    }

    /// Cancel an approved request before it starts; the days go back to
    /// the employee's balance, capped at the annual limit.
    pub async fn cancel_leave(
        &self,
        claims: &Claims,
        request_id: &str,
    ) -> Result<DecidedLeave, AppError> {
        let request = self
            .leaves
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Leave request not found"))?;

        claims.require_self_or_admin(&request.employee_id)?;

        if request.status != LeaveStatus::Approved {
            return Err(AppError::Conflict(format!(
                "Cannot cancel leave. Status: {}",
                request.status.label()
            )));
        }

        if request.start_date <= dates::today_utc() {
            return Err(AppError::Conflict(
                "Cannot cancel leave that has started or is in progress".to_string(),
            ));
        }

        let (leave_request, new_balance) = self
            .leaves
            .cancel(&request, claims.account_id(), self.annual_leave_limit)
            .await?;

        Ok(DecidedLeave {
            leave_request,
            new_balance,
        })
    }

    /// Balance report for one employee: stored balance, approved and
    /// pending totals, and the pending requests themselves. Pure read.
    pub async fn leave_balance(
        &self,
        claims: &Claims,
        employee_id: &str,
    ) -> Result<LeaveBalanceReport, AppError> {
        claims.require_self_or_admin(employee_id)?;

        let employee = self.owner_of(employee_id).await?;

        let total_taken = self
            .leaves
            .days_in_status(&employee.id, LeaveStatus::Approved)
            .await?;
        let pending_requests = self.leaves.pending_requests(&employee.id).await?;
        let total_pending = pending_requests.iter().map(|r| r.days_requested).sum();

        Ok(LeaveBalanceReport {
            employee: EmployeeRef {
                id: employee.id.clone(),
                name: employee.name.clone(),
                email: employee.email.clone(),
            },
            leave_balance: LeaveBalance {
                available: employee.leave_balance,
                total_taken,
                total_pending,
                pending_requests,
            },
        })
    }

    /// Reconcile the stored balance against approved history. Pending
    /// requests are deliberately ignored; running this twice without an
    /// intervening approval or cancellation is a no-op the second time.
    pub async fn verify_leave_balance(
        &self,
        claims: &Claims,
        employee_id: &str,
    ) -> Result<BalanceVerification, AppError> {
        claims.require_admin()?;

        let employee = self.owner_of(employee_id).await?;

        let total_days_taken = self
            .leaves
            .days_in_status(&employee.id, LeaveStatus::Approved)
            .await?;
        let total_approved = self
            .leaves
            .count_in_status(&employee.id, LeaveStatus::Approved)
            .await?;

        // Floored at zero so the stored value stays within the balance
        // range, and a second run compares against the same floored value.
        let expected_balance = (self.annual_leave_limit - total_days_taken).max(0);
        let corrected = expected_balance != employee.leave_balance;

        if corrected {
            self.accounts
                .set_leave_balance(&employee.id, expected_balance)
                .await?;
        }

        Ok(BalanceVerification {
            employee: VerifiedEmployee {
                name: employee.name.clone(),
                email: employee.email.clone(),
                old_balance: employee.leave_balance,
                new_balance: expected_balance,
                corrected,
            },
            leaves: VerifiedTotals {
                total_approved,
                total_days_taken,
                expected_balance,
            },
        })
    }

    async fn owner_of(&self, employee_id: &str) -> Result<EmployeeAccount, AppError> {
        let account = self
            .accounts
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;

        account
            .as_employee()
            .cloned()
            .ok_or_else(|| AppError::BadRequest("Account has no leave balance".to_string()))
    }
}
