use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use leavedesk::database::{
    init_database,
    repositories::{AccountRepository, LeaveRepository},
};
use leavedesk::handlers::{auth, employees, leaves};
use leavedesk::middleware::RequestId;
use leavedesk::{AppState, AuthService, Config, LeaveService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Leavedesk API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories and services
    let account_repository = AccountRepository::new(pool.clone());
    let leave_repository = LeaveRepository::new(pool.clone());
    let auth_service = AuthService::new(account_repository.clone(), config.clone());
    let leave_service = LeaveService::new(
        account_repository.clone(),
        leave_repository.clone(),
        config.annual_leave_limit,
    );

    let app_state = web::Data::new(AppState {
        auth_service,
        leave_service,
    });
    let account_repo_data = web::Data::new(account_repository);
    let leave_repo_data = web::Data::new(leave_repository);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(account_repo_data.clone())
            .app_data(leave_repo_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/employees")
                            .route("", web::post().to(employees::add_employee))
                            .route("", web::get().to(employees::list_employees))
                            .route("/{id}", web::get().to(employees::get_employee)),
                    )
                    .service(
                        web::scope("/leaves")
                            .route("", web::post().to(leaves::apply_leave))
                            .route("", web::get().to(leaves::list_leaves))
                            .route("/{id}/approve", web::patch().to(leaves::approve_leave))
                            .route("/{id}/reject", web::patch().to(leaves::reject_leave))
                            .route("/{id}/cancel", web::patch().to(leaves::cancel_leave))
                            .route(
                                "/balance/{employee_id}",
                                web::get().to(leaves::leave_balance),
                            )
                            .route(
                                "/verify-balance/{employee_id}",
                                web::get().to(leaves::verify_leave_balance),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
