#![allow(dead_code)] // each test binary uses a different subset of helpers

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use std::env;
use tempfile::TempDir;

use leavedesk::database::init_database;
use leavedesk::database::models::{AccountInfo, AuthResponse, RegisterInput, Role};
use leavedesk::database::repositories::{AccountRepository, LeaveRepository};
use leavedesk::{AuthService, Claims, Config, LeaveService};

pub const TEST_ANNUAL_LEAVE_LIMIT: i64 = 20;

/// Everything a test needs: a throwaway SQLite database plus the
/// repositories and services wired the same way `main` wires them.
pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    pub accounts: AccountRepository,
    pub leaves: LeaveRepository,
    pub auth_service: AuthService,
    pub leave_service: LeaveService,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());

        let config = Config {
            database_url: database_url.clone(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            annual_leave_limit: TEST_ANNUAL_LEAVE_LIMIT,
        };

        let pool = init_database(&database_url).await?;
        let accounts = AccountRepository::new(pool.clone());
        let leaves = LeaveRepository::new(pool.clone());
        let auth_service = AuthService::new(accounts.clone(), config.clone());
        let leave_service = LeaveService::new(
            accounts.clone(),
            leaves.clone(),
            config.annual_leave_limit,
        );

        Ok(TestContext {
            pool,
            config,
            accounts,
            leaves,
            auth_service,
            leave_service,
            _temp_dir: temp_dir,
        })
    }
}

pub async fn register_admin(ctx: &TestContext, email: &str) -> AuthResponse {
    ctx.auth_service
        .register(RegisterInput {
            name: "Test Admin".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: Role::Admin,
            joining_date: None,
        })
        .await
        .expect("failed to register admin")
}

pub async fn register_employee(ctx: &TestContext, email: &str, joining_date: &str) -> AuthResponse {
    ctx.auth_service
        .register(RegisterInput {
            name: "Test Employee".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: Role::Employee,
            joining_date: Some(joining_date.to_string()),
        })
        .await
        .expect("failed to register employee")
}

/// Claims equivalent to what the extractor would decode for this account.
pub fn claims_for(user: &AccountInfo) -> Claims {
    Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now() + chrono::Duration::days(1)).timestamp() as usize,
    }
}

/// A calendar-date string `days` days from today (UTC).
pub fn days_from_now(days: i64) -> String {
    (Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Current stored balance for an employee account.
pub async fn balance_of(ctx: &TestContext, id: &str) -> i64 {
    ctx.accounts
        .find_by_id(id)
        .await
        .expect("failed to load account")
        .expect("account missing")
        .as_employee()
        .expect("account is not an employee")
        .leave_balance
}

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}
