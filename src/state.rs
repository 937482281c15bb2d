use std::sync::Arc;

use crate::{
    config::Config,
    rules::{HtmlPolicy, MessageCatalog},
    utils::sanitize::SecretFields,
};
use axum::extract::FromRef;

/// Shared, read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub policy: Arc<HtmlPolicy>,
    pub secrets: Arc<SecretFields>,
    pub messages: Arc<MessageCatalog>,
}

impl AppState {
    pub fn new(config: Config, policy: HtmlPolicy) -> Self {
        let secrets = SecretFields::default().with_declared(config.secret_fields.iter().cloned());
        Self {
            config,
            policy: Arc::new(policy),
            secrets: Arc::new(secrets),
            messages: Arc::new(MessageCatalog::default()),
        }
    }
}

impl FromRef<AppState> for Arc<HtmlPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
