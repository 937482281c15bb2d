// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf};
use dotenvy::dotenv;

/// Largest upload category (video) plus multipart overhead.
const DEFAULT_BODY_LIMIT: usize = 110 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub log_dir: String,
    /// JSON file overriding the built-in HTML allow-lists.
    pub html_policy_path: Option<PathBuf>,
    pub body_limit: usize,
    /// Extra field names treated as secret by the sanitizer.
    pub secret_fields: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR")
            .map(|v| v.parse().expect("BIND_ADDR must be a socket address"))
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let html_policy_path = env::var("HTML_POLICY_PATH").ok().map(PathBuf::from);

        let body_limit = env::var("BODY_LIMIT_BYTES")
            .map(|v| v.parse().expect("BODY_LIMIT_BYTES must be a number"))
            .unwrap_or(DEFAULT_BODY_LIMIT);

        let secret_fields = list_var("SECRET_FIELDS");

        let mut allowed_origins = list_var("ALLOWED_ORIGINS");
        if allowed_origins.is_empty() {
            allowed_origins = vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ];
        }

        Self {
            bind_addr,
            rust_log,
            log_dir,
            html_policy_path,
            body_limit,
            secret_fields,
            allowed_origins,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            html_policy_path: None,
            body_limit: DEFAULT_BODY_LIMIT,
            secret_fields: Vec::new(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Comma-separated list, blanks dropped.
fn list_var(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
