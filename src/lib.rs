pub mod config;
pub mod database;
pub mod dates;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

pub use config::Config;
pub use database::repositories::{AccountRepository, LeaveRepository};
pub use services::{AuthService, Claims, LeaveService};

pub struct AppState {
    pub auth_service: AuthService,
    pub leave_service: LeaveService,
}
