use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveRequestView, LeaveStatus};
use crate::error::AppError;

const REQUEST_COLUMNS: &str = r#"
    id,
    employee_id,
    start_date,
    end_date,
    days_requested,
    reason,
    status,
    applied_at,
    decision_at,
    reviewer_id,
    cancelled_at,
    cancelled_by,
    created_at,
    updated_at
"#;

const VIEW_COLUMNS: &str = r#"
    l.id,
    l.employee_id,
    l.start_date,
    l.end_date,
    l.days_requested,
    l.reason,
    l.status,
    l.applied_at,
    l.decision_at,
    l.reviewer_id,
    l.cancelled_at,
    l.cancelled_by,
    l.created_at,
    l.updated_at,
    a.name AS employee_name,
    a.email AS employee_email
"#;

#[derive(Clone)]
pub struct LeaveRepository {
    pool: SqlitePool,
}

impl LeaveRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new pending request. The employee's balance is untouched;
    /// it is only debited on approval.
    pub async fn create(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days_requested: i64,
        reason: &str,
    ) -> Result<LeaveRequestView> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO
                leave_requests (
                    id,
                    employee_id,
                    start_date,
                    end_date,
                    days_requested,
                    reason,
                    status,
                    applied_at,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .bind(days_requested)
        .bind(reason)
        .bind(LeaveStatus::Pending)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_view_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("created leave request {} not found", id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_view_by_id(&self, id: &str) -> Result<Option<LeaveRequestView>> {
        let view = sqlx::query_as::<_, LeaveRequestView>(&format!(
            r#"
            SELECT {VIEW_COLUMNS}
            FROM leave_requests l
            JOIN accounts a ON a.id = l.employee_id
            WHERE l.id = ?
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(view)
    }

    /// Filtered, newest-first page of requests joined with employee
    /// display fields.
    pub async fn list(
        &self,
        employee_id: Option<&str>,
        status: Option<LeaveStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequestView>> {
        let mut query = format!(
            r#"
            SELECT {VIEW_COLUMNS}
            FROM leave_requests l
            JOIN accounts a ON a.id = l.employee_id
            "#
        );

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(eid) = employee_id {
            conditions.push("l.employee_id = ?");
            params.push(eid.to_string());
        }

        if let Some(s) = status {
            conditions.push("l.status = ?");
            params.push(s.to_string());
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY l.created_at DESC LIMIT ? OFFSET ?");

        let mut prepared = sqlx::query_as::<_, LeaveRequestView>(&query);
        for param in &params {
            prepared = prepared.bind(param);
        }

        let views = prepared
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    pub async fn count(
        &self,
        employee_id: Option<&str>,
        status: Option<LeaveStatus>,
    ) -> Result<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM leave_requests");

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(eid) = employee_id {
            conditions.push("employee_id = ?");
            params.push(eid.to_string());
        }

        if let Some(s) = status {
            conditions.push("status = ?");
            params.push(s.to_string());
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        let mut prepared = sqlx::query_scalar::<_, i64>(&query);
        for param in &params {
            prepared = prepared.bind(param);
        }

        Ok(prepared.fetch_one(&self.pool).await?)
    }

    /// Sum of `days_requested` over an employee's requests in a status.
    pub async fn days_in_status(&self, employee_id: &str, status: LeaveStatus) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COALESCE(SUM(days_requested), 0)
            FROM
                leave_requests
            WHERE
                employee_id = ?
                AND status = ?
            "#,
        )
        .bind(employee_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn count_in_status(&self, employee_id: &str, status: LeaveStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leave_requests WHERE employee_id = ? AND status = ?",
        )
        .bind(employee_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// An employee's pending requests, most recently applied first.
    pub async fn pending_requests(&self, employee_id: &str) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM leave_requests
            WHERE
                employee_id = ?
                AND status = ?
            ORDER BY applied_at DESC
            "#
        ))
        .bind(employee_id)
        .bind(LeaveStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Does any non-terminal (pending or approved) request for this
    /// employee share a calendar day with `[start_date, end_date]`?
    pub async fn has_overlap(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COUNT(*)
            FROM
                leave_requests
            WHERE
                employee_id = ?
                AND status IN ('pending', 'approved')
                AND start_date <= ?
                AND end_date >= ?
            "#,
        )
        .bind(employee_id)
        .bind(end_date)
        .bind(start_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Approve a pending request: debit the employee's balance and mark
    /// the request approved as one unit. Both updates are guarded against
    /// concurrent writers; if either guard fails nothing is persisted.
    pub async fn approve(
        &self,
        request: &LeaveRequest,
        reviewer_id: &str,
    ) -> Result<(LeaveRequestView, i64), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The debit re-checks the freshest stored balance, not the value
        // read earlier in the request.
        let debit = sqlx::query(
            r#"
            UPDATE accounts
            SET
                leave_balance = leave_balance - ?,
                updated_at = ?
            WHERE
                id = ?
                AND role = 'employee'
                AND leave_balance >= ?
            "#,
        )
        .bind(request.days_requested)
        .bind(now)
        .bind(&request.employee_id)
        .bind(request.days_requested)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            rollback(tx, "approve: balance no longer covers request").await;
            let available: i64 =
                sqlx::query_scalar("SELECT leave_balance FROM accounts WHERE id = ?")
                    .bind(&request.employee_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .unwrap_or(0);
            return Err(AppError::InsufficientBalance {
                available,
                requested: request.days_requested,
            });
        }

        let transition = sqlx::query(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                decision_at = ?,
                reviewer_id = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            "#,
        )
        .bind(LeaveStatus::Approved)
        .bind(now)
        .bind(reviewer_id)
        .bind(now)
        .bind(&request.id)
        .bind(LeaveStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if transition.rows_affected() == 0 {
            rollback(tx, "approve: request no longer pending").await;
            return Err(self.lifecycle_conflict(&request.id).await);
        }

        let new_balance: i64 = sqlx::query_scalar("SELECT leave_balance FROM accounts WHERE id = ?")
            .bind(&request.employee_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let view = self
            .find_view_by_id(&request.id)
            .await?
            .ok_or_else(|| AppError::internal("approved leave request vanished"))?;

        Ok((view, new_balance))
    }

    /// Reject a pending request. No balance change; the update is guarded
    /// so a request decided by another reviewer is reported as a conflict.
    pub async fn reject(
        &self,
        request: &LeaveRequest,
        reviewer_id: &str,
    ) -> Result<LeaveRequestView, AppError> {
        let now = Utc::now();

        let transition = sqlx::query(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                decision_at = ?,
                reviewer_id = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            "#,
        )
        .bind(LeaveStatus::Rejected)
        .bind(now)
        .bind(reviewer_id)
        .bind(now)
        .bind(&request.id)
        .bind(LeaveStatus::Pending)
        .execute(&self.pool)
        .await?;

        if transition.rows_affected() == 0 {
            return Err(self.lifecycle_conflict(&request.id).await);
        }

        self.find_view_by_id(&request.id)
            .await?
            .ok_or_else(|| AppError::internal("rejected leave request vanished"))
    }

    /// Cancel an approved request: credit the balance back (clamped to
    /// the annual limit) and mark the request cancelled as one unit.
    pub async fn cancel(
        &self,
        request: &LeaveRequest,
        actor_id: &str,
        annual_leave_limit: i64,
    ) -> Result<(LeaveRequestView, i64), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let credit = sqlx::query(
            r#"
            UPDATE accounts
            SET
                leave_balance = MIN(leave_balance + ?, ?),
                updated_at = ?
            WHERE
                id = ?
                AND role = 'employee'
            "#,
        )
        .bind(request.days_requested)
        .bind(annual_leave_limit)
        .bind(now)
        .bind(&request.employee_id)
        .execute(&mut *tx)
        .await?;

        if credit.rows_affected() == 0 {
            rollback(tx, "cancel: employee account missing").await;
            return Err(AppError::not_found("Employee not found"));
        }

        let transition = sqlx::query(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                cancelled_at = ?,
                cancelled_by = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            "#,
        )
        .bind(LeaveStatus::Cancelled)
        .bind(now)
        .bind(actor_id)
        .bind(now)
        .bind(&request.id)
        .bind(LeaveStatus::Approved)
        .execute(&mut *tx)
        .await?;

        if transition.rows_affected() == 0 {
            rollback(tx, "cancel: request no longer approved").await;
            return Err(match self.find_by_id(&request.id).await {
                Ok(Some(current)) => AppError::Conflict(format!(
                    "Cannot cancel leave. Status: {}",
                    current.status.label()
                )),
                Ok(None) => AppError::not_found("Leave request not found"),
                Err(err) => err.into(),
            });
        }

        let new_balance: i64 = sqlx::query_scalar("SELECT leave_balance FROM accounts WHERE id = ?")
            .bind(&request.employee_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let view = self
            .find_view_by_id(&request.id)
            .await?
            .ok_or_else(|| AppError::internal("cancelled leave request vanished"))?;

        Ok((view, new_balance))
    }

    async fn lifecycle_conflict(&self, id: &str) -> AppError {
        match self.find_by_id(id).await {
            Ok(Some(current)) => {
                AppError::Conflict(format!("Leave already {}", current.status.label()))
            }
            Ok(None) => AppError::not_found("Leave request not found"),
            Err(err) => err.into(),
        }
    }
}

async fn rollback(tx: Transaction<'_, Sqlite>, context: &str) {
    log::warn!("{}, rolling back", context);
    if let Err(err) = tx.rollback().await {
        log::error!("Rollback failed ({}): {}", context, err);
    }
}
