use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum Role {
        Admin => "admin",
        Employee => "employee",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AccountStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

/// Persisted account row. `role` decides which domain variant it carries:
/// employee rows always have a joining date, admin rows never do.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub joining_date: Option<NaiveDate>,
    pub leave_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EmployeeAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: AccountStatus,
    pub joining_date: NaiveDate,
    pub leave_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An account is either an admin or an employee; only employees carry
/// leave semantics.
#[derive(Debug, Clone)]
pub enum Account {
    Admin(AdminAccount),
    Employee(EmployeeAccount),
}

impl Account {
    pub fn id(&self) -> &str {
        match self {
            Account::Admin(a) => &a.id,
            Account::Employee(e) => &e.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::Admin(a) => &a.email,
            Account::Employee(e) => &e.email,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Account::Admin(a) => &a.name,
            Account::Employee(e) => &e.name,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Account::Admin(a) => &a.password_hash,
            Account::Employee(e) => &e.password_hash,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::Admin(_) => Role::Admin,
            Account::Employee(_) => Role::Employee,
        }
    }

    pub fn status(&self) -> AccountStatus {
        match self {
            Account::Admin(a) => a.status,
            Account::Employee(e) => e.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == AccountStatus::Active
    }

    pub fn as_employee(&self) -> Option<&EmployeeAccount> {
        match self {
            Account::Employee(e) => Some(e),
            Account::Admin(_) => None,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        match row.role {
            Role::Admin => Ok(Account::Admin(AdminAccount {
                id: row.id,
                email: row.email,
                password_hash: row.password_hash,
                name: row.name,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })),
            Role::Employee => {
                let joining_date = row
                    .joining_date
                    .ok_or_else(|| anyhow!("employee account {} has no joining date", row.id))?;
                Ok(Account::Employee(EmployeeAccount {
                    id: row.id,
                    email: row.email,
                    password_hash: row.password_hash,
                    name: row.name,
                    status: row.status,
                    joining_date,
                    leave_balance: row.leave_balance,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }))
            }
        }
    }
}

/// Client-facing account view. The credential hash never leaves the
/// store layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_balance: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        match account {
            Account::Admin(a) => AccountInfo {
                id: a.id.clone(),
                name: a.name.clone(),
                email: a.email.clone(),
                role: Role::Admin,
                status: a.status,
                joining_date: None,
                leave_balance: None,
                created_at: a.created_at,
                updated_at: a.updated_at,
            },
            Account::Employee(e) => AccountInfo {
                id: e.id.clone(),
                name: e.name.clone(),
                email: e.email.clone(),
                role: Role::Employee,
                status: e.status,
                joining_date: Some(e.joining_date),
                leave_balance: Some(e.leave_balance),
                created_at: e.created_at,
                updated_at: e.updated_at,
            },
        }
    }
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        AccountInfo::from(&account)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Required when role is Employee.
    pub joining_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Admin-side employee provisioning. Any client-supplied balance is
/// ignored; new employees always start at the annual limit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEmployeeInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub joining_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}
