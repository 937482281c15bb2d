// src/main.rs

use content_guard::config::Config;
use content_guard::routes;
use content_guard::rules::HtmlPolicy;
use content_guard::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load the HTML allow-lists once; every rule shares them read-only.
    let policy = match &config.html_policy_path {
        Some(path) => {
            tracing::info!("Loading HTML policy from {}", path.display());
            HtmlPolicy::from_file(path).expect("Failed to load HTML policy")
        }
        None => HtmlPolicy::default(),
    };
    tracing::info!(
        "HTML policy {} active ({} tags)",
        policy.version(),
        policy.allowed_tags().len()
    );

    let addr = config.bind_addr;
    let state = AppState::new(config, policy);

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
