use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Default name of the OAuth state session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "slack_oauth";

/// Default lifetime in seconds of the OAuth state cookie and token (3 minutes).
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 180;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::new(value.to_string()))
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The secret used to sign OAuth state session tokens. Must be at least
    /// 256 bits (32 or more utf8 chars).
    #[arg(long, env, value_parser = parse_secret)]
    oauth_state_secret: Option<SecretString>,

    /// The name of the cookie that synchronizes the user agent with the OAuth state.
    #[arg(long, env, default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// The time to live in seconds for the OAuth state cookie and its signed token.
    #[arg(long, env, default_value_t = DEFAULT_MAX_AGE_SECONDS)]
    pub max_age_seconds: u64,

    /// The authorization server endpoint the user agent is redirected to.
    #[arg(long, env)]
    authorize_url: Option<String>,

    /// The OAuth client ID registered with the authorization server.
    #[arg(long, env)]
    client_id: Option<String>,

    /// The callback URL the authorization server redirects back to.
    #[arg(long, env)]
    redirect_uri: Option<String>,

    /// Space separated OAuth scopes to request.
    #[arg(long, env)]
    scope: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_oauth_state_secret(mut self, secret: String) -> Self {
        self.oauth_state_secret = Some(SecretString::new(secret));
        self
    }

    pub fn oauth_state_secret(&self) -> Option<&SecretString> {
        self.oauth_state_secret.as_ref()
    }

    pub fn set_authorize_url(mut self, authorize_url: String) -> Self {
        self.authorize_url = Some(authorize_url);
        self
    }

    pub fn authorize_url(&self) -> Option<&str> {
        self.authorize_url.as_deref()
    }

    pub fn set_client_id(mut self, client_id: String) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn set_redirect_uri(mut self, redirect_uri: String) -> Self {
        self.redirect_uri = Some(redirect_uri);
        self
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}
