use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use secrecy::Secret;

use crate::enquiry::FormProfile;

pub const DEFAULT_SENDER: &str = "ABB Tutoring <noreply@abbtutoring.org>";
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mail: MailConfig,
    pub profiles: Vec<FormProfile>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mail = MailConfig {
            api_key: non_blank_var("RESEND_API_KEY").map(Secret::new),
            admin_inbox: non_blank_var("ABB_ENQUIRY_EMAIL"),
            sender: non_blank_var("ENQUIRY_SENDER").unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            api_url: non_blank_var("RESEND_API_URL")
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
        };

        let profiles = match non_blank_var("ENQUIRY_PROFILES") {
            Some(raw) => parse_profiles(&raw)?,
            None => FormProfile::builtins(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            mail,
            profiles,
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_profiles(raw: &str) -> Result<Vec<FormProfile>, ConfigError> {
    let mut profiles: Vec<FormProfile> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let profile = FormProfile::builtin(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        if !profiles.iter().any(|existing| existing.name == profile.name) {
            profiles.push(profile);
        }
    }
    Ok(profiles)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Email provider credentials and addressing.
///
/// The API key and admin inbox stay optional here: a missing value is reported
/// per submission rather than refusing to boot.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: Option<Secret<String>>,
    pub admin_inbox: Option<String>,
    pub sender: String,
    pub api_url: String,
}

impl MailConfig {
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("RESEND_API_KEY");
        }
        if self.admin_inbox.is_none() {
            missing.push("ABB_ENQUIRY_EMAIL");
        }
        missing
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownProfile(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownProfile(name) => {
                write!(f, "ENQUIRY_PROFILES names unknown form profile '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::UnknownProfile(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "RESEND_API_KEY",
            "ABB_ENQUIRY_EMAIL",
            "ENQUIRY_SENDER",
            "RESEND_API_URL",
            "ENQUIRY_PROFILES",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.mail.sender, DEFAULT_SENDER);
        assert_eq!(config.mail.api_url, DEFAULT_RESEND_API_URL);
        assert_eq!(config.profiles.len(), 3);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn blank_mail_settings_count_as_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RESEND_API_KEY", "   ");
        env::set_var("ABB_ENQUIRY_EMAIL", "tutors@example.com");
        let config = AppConfig::load().expect("config loads");
        assert!(config.mail.api_key.is_none());
        assert_eq!(config.mail.missing_settings(), vec!["RESEND_API_KEY"]);

        env::set_var("RESEND_API_KEY", "re_test_key");
        let config = AppConfig::load().expect("config loads");
        let key = config.mail.api_key.as_ref().expect("key present");
        assert_eq!(key.expose_secret(), "re_test_key");
        assert!(config.mail.missing_settings().is_empty());
        reset_env();
    }

    #[test]
    fn profile_selection_rejects_unknown_names() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENQUIRY_PROFILES", "waitlist, consultation,waitlist");
        let config = AppConfig::load().expect("config loads");
        let names: Vec<&str> = config.profiles.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["waitlist", "consultation"]);

        env::set_var("ENQUIRY_PROFILES", "consultation,newsletter");
        let err = AppConfig::load().expect_err("unknown profile rejected");
        assert!(matches!(err, ConfigError::UnknownProfile(name) if name == "newsletter"));
        reset_env();
    }
}
