use log::*;
use oauth_state::{OAuthState, StateOptions};
use secrecy::ExposeSecret;
use service::config::Config;
use tokio::net::TcpListener;

mod controller;
mod error;
mod params;
pub mod router;

pub use error::{Error, WebErrorKind};

// Web-level state shared by every handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub oauth_state: OAuthState,
}

impl AppState {
    /// Build the OAuth state issuer/verifier from the configured options.
    pub fn new(config: Config) -> Result<Self, oauth_state::Error> {
        let secret = config
            .oauth_state_secret()
            .map(|secret| secret.expose_secret().clone())
            .unwrap_or_default();

        let options = StateOptions::builder(secret)
            .cookie_name(config.cookie_name.clone())
            .max_age_seconds(config.max_age_seconds)
            .build()?;

        Ok(Self {
            config,
            oauth_state: OAuthState::new(options),
        })
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let server_url = format!(
        "{}:{}",
        app_state.config.interface.as_deref().unwrap_or("127.0.0.1"),
        app_state.config.port
    );

    info!(
        "Server starting... listening for connections on http://{} ({} mode)",
        server_url,
        app_state.config.runtime_env()
    );

    let listener = TcpListener::bind(&server_url).await?;
    axum::serve(listener, router::define_routes(app_state)).await
}
