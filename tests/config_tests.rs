use leavedesk::config::Config;
use serial_test::serial;
use std::env;

mod common;

const CONFIG_VARS: [&str; 8] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CORS_ORIGIN",
    "ANNUAL_LEAVE_LIMIT",
];

fn snapshot_env() -> Vec<(&'static str, Option<String>)> {
    CONFIG_VARS
        .iter()
        .map(|key| (*key, env::var(key).ok()))
        .collect()
}

fn restore_env(snapshot: Vec<(&'static str, Option<String>)>) {
    unsafe {
        for (key, value) in snapshot {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn config_defaults_apply_without_env() {
    common::setup_test_env();
    let snapshot = snapshot_env();

    unsafe {
        for key in CONFIG_VARS {
            env::remove_var(key);
        }
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "sqlite:leavedesk.db");
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.cors_origin, "http://localhost:3000");
    assert_eq!(config.annual_leave_limit, 20);

    restore_env(snapshot);
}

#[test]
#[serial]
fn config_reads_custom_values() {
    common::setup_test_env();
    let snapshot = snapshot_env();

    unsafe {
        env::set_var("DATABASE_URL", "sqlite:./custom.db");
        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("JWT_EXPIRATION_DAYS", "7");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("CORS_ORIGIN", "https://app.example.com");
        env::set_var("ANNUAL_LEAVE_LIMIT", "25");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "sqlite:./custom.db");
    assert_eq!(config.jwt_secret, "test-secret");
    assert_eq!(config.jwt_expiration_days, 7);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.environment, "production");
    assert_eq!(config.cors_origin, "https://app.example.com");
    assert_eq!(config.annual_leave_limit, 25);

    restore_env(snapshot);
}

#[test]
#[serial]
fn invalid_numeric_values_fall_back_to_defaults() {
    common::setup_test_env();
    let snapshot = snapshot_env();

    unsafe {
        env::set_var("PORT", "not-a-port");
        env::set_var("JWT_EXPIRATION_DAYS", "soon");
        env::set_var("ANNUAL_LEAVE_LIMIT", "-5");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.jwt_expiration_days, 30);
    // A non-positive limit would make every application fail; fall back.
    assert_eq!(config.annual_leave_limit, 20);

    restore_env(snapshot);
}

#[test]
fn environment_detection_and_address() {
    let config = Config {
        database_url: "test".to_string(),
        jwt_secret: "test".to_string(),
        jwt_expiration_days: 1,
        host: "192.168.1.1".to_string(),
        port: 9000,
        environment: "production".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
        annual_leave_limit: 20,
    };

    assert!(config.is_production());
    assert!(!config.is_development());
    assert_eq!(config.server_address(), "192.168.1.1:9000");
}
