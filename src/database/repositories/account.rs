use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    Account, AccountRow, AccountStatus, AdminAccount, EmployeeAccount, Role,
};

const ACCOUNT_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    name,
    role,
    status,
    joining_date,
    leave_balance,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an admin account. Admins carry no leave semantics.
    pub async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Account> {
        let now = Utc::now();
        let account = AdminAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO
                accounts (id, email, password_hash, name, role, status, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(Role::Admin)
        .bind(account.status)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Account::Admin(account))
    }

    /// Create an employee account with its opening leave balance.
    pub async fn create_employee(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        joining_date: NaiveDate,
        leave_balance: i64,
    ) -> Result<Account> {
        let now = Utc::now();
        let account = EmployeeAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            status: AccountStatus::Active,
            joining_date,
            leave_balance,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO
                accounts (
                    id,
                    email,
                    password_hash,
                    name,
                    role,
                    status,
                    joining_date,
                    leave_balance,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(Role::Employee)
        .bind(account.status)
        .bind(account.joining_date)
        .bind(account.leave_balance)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Account::Employee(account))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Employees only, newest first, with optional case-insensitive
    /// name/email search.
    pub async fn list_employees(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>> {
        let mut query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = 'employee'"
        );
        let mut params: Vec<String> = Vec::new();

        if let Some(term) = search {
            query.push_str(" AND (name LIKE ? OR email LIKE ?)");
            let pattern = format!("%{}%", term);
            params.push(pattern.clone());
            params.push(pattern);
        }

        query.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut prepared = sqlx::query_as::<_, AccountRow>(&query);
        for param in &params {
            prepared = prepared.bind(param);
        }

        let rows = prepared
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    pub async fn count_employees(&self, search: Option<&str>) -> Result<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM accounts WHERE role = 'employee'");
        let mut params: Vec<String> = Vec::new();

        if let Some(term) = search {
            query.push_str(" AND (name LIKE ? OR email LIKE ?)");
            let pattern = format!("%{}%", term);
            params.push(pattern.clone());
            params.push(pattern);
        }

        let mut prepared = sqlx::query_scalar::<_, i64>(&query);
        for param in &params {
            prepared = prepared.bind(param);
        }

        Ok(prepared.fetch_one(&self.pool).await?)
    }

    /// Overwrite an employee's stored balance (reconciliation path).
    /// The value must already be within the configured range.
    pub async fn set_leave_balance(&self, id: &str, balance: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET
                leave_balance = ?,
                updated_at = ?
            WHERE
                id = ?
                AND role = 'employee'
            "#,
        )
        .bind(balance)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
