use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::config::Config;
use crate::database::models::{
    Account, AccountInfo, AddEmployeeInput, AuthResponse, LoginInput, RegisterInput, Role,
};
use crate::database::repositories::AccountRepository;
use crate::dates;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn account_id(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate for Admin-only operations.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Gate for operations an account may run on itself, or an admin on
    /// anyone.
    pub fn require_self_or_admin(&self, account_id: &str) -> Result<(), AppError> {
        if self.is_admin() || self.sub == account_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    // Get the config from app data
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => {
                                return ready(Ok(token_data.claims));
                            }
                            Err(_) => {
                                return ready(Err(ErrorUnauthorized("Invalid token")));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Clone)]
pub struct AuthService {
    account_repository: AccountRepository,
    config: Config,
}

impl AuthService {
    pub fn new(account_repository: AccountRepository, config: Config) -> Self {
        Self {
            account_repository,
            config,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthResponse, AppError> {
        let name = input.name.trim();
        let email = input.email.trim();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide name, email and password".to_string(),
            ));
        }

        if self.account_repository.email_exists(email).await? {
            return Err(AppError::BadRequest(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))?;

        let account = match input.role {
            Role::Employee => {
                let joining_date = input.joining_date.as_deref().ok_or_else(|| {
                    AppError::BadRequest("Joining date is required for employees".to_string())
                })?;
                let joining_date = dates::parse_calendar_date(joining_date)?;
                self.account_repository
                    .create_employee(
                        email,
                        &password_hash,
                        name,
                        joining_date,
                        self.config.annual_leave_limit,
                    )
                    .await?
            }
            Role::Admin => {
                self.account_repository
                    .create_admin(email, &password_hash, name)
                    .await?
            }
        };

        let token = self.generate_token(&account)?;

        Ok(AuthResponse {
            token,
            user: account.into(),
        })
    }

    /// Admin-side employee provisioning. The opening balance is always
    /// the configured annual limit; clients never control it.
    pub async fn provision_employee(
        &self,
        input: AddEmployeeInput,
    ) -> Result<AccountInfo, AppError> {
        let name = input.name.trim();
        let email = input.email.trim();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide name, email, password, and joiningDate".to_string(),
            ));
        }

        if self.account_repository.email_exists(email).await? {
            return Err(AppError::BadRequest(
                "User with this email already exists".to_string(),
            ));
        }

        let joining_date = dates::parse_calendar_date(&input.joining_date)?;
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))?;

        let account = self
            .account_repository
            .create_employee(
                email,
                &password_hash,
                name,
                joining_date,
                self.config.annual_leave_limit,
            )
            .await?;

        Ok(account.into())
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, AppError> {
        let account = self
            .account_repository
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Inactive accounts cannot authenticate even with a valid password.
        if !account.is_active() {
            return Err(AppError::Forbidden("Account inactive".to_string()));
        }

        let password_ok = verify(&input.password, account.password_hash())
            .map_err(|e| AppError::internal(format!("password verification failed: {}", e)))?;
        if !password_ok {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.generate_token(&account)?;

        Ok(AuthResponse {
            token,
            user: account.into(),
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Unauthorized)?;

        Ok(token_data.claims)
    }

    pub async fn account_for(&self, claims: &Claims) -> Result<Account, AppError> {
        self.account_repository
            .find_by_id(claims.account_id())
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    fn generate_token(&self, account: &Account) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(self.config.jwt_expiration_days))
            .ok_or_else(|| AppError::internal("token expiry out of range"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: account.id().to_string(),
            email: account.email().to_string(),
            role: account.role(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::internal(format!("token generation failed: {}", e)))
    }
}
