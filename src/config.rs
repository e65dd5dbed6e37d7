use std::net::IpAddr;

use crate::reset::token::TokenFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub registration: RegistrationMode,
    pub max_body_size: usize,
    pub cors_origins: Vec<String>,
    pub access_token_minutes: i64,
    pub reset: ResetConfig,
    pub admin: Option<AdminBootstrap>,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

/// One week.
pub const MAX_RESET_TOKEN_MINUTES: i64 = 7 * 24 * 60;
/// Thirty days.
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 30 * 24 * 60;

/// Password reset token lifetime and shape.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub ttl_minutes: i64,
    pub format: TokenFormat,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            format: TokenFormat::Numeric { digits: 5 },
        }
    }
}

/// Account created at startup if it does not exist yet.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("MULTITASKER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid MULTITASKER_HOST: {e}"))?;

        let port: u16 = env_or("MULTITASKER_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid MULTITASKER_PORT: {e}"))?;

        let base_url = env_or("MULTITASKER_BASE_URL", &format!("http://{host}:{port}"));

        let registration = match env_or("MULTITASKER_REGISTRATION", "open").as_str() {
            "closed" => RegistrationMode::Closed,
            _ => RegistrationMode::Open,
        };

        let max_body_size: usize = env_or("MULTITASKER_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid MULTITASKER_MAX_BODY_SIZE: {e}"))?;

        let cors_origins: Vec<String> =
            env_or("MULTITASKER_CORS_ORIGINS", "http://localhost,http://localhost:3000")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

        let access_token_minutes = parse_minutes(
            "MULTITASKER_ACCESS_TOKEN_MINUTES",
            &env_or("MULTITASKER_ACCESS_TOKEN_MINUTES", "30"),
            MAX_ACCESS_TOKEN_MINUTES,
        )?;

        let reset = reset_from_env()?;

        let admin = match (
            std::env::var("MULTITASKER_ADMIN_EMAIL").ok(),
            std::env::var("MULTITASKER_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        let log_level = env_or("MULTITASKER_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("MULTITASKER_SMTP_HOST").ok(),
            std::env::var("MULTITASKER_SMTP_PORT").ok(),
            std::env::var("MULTITASKER_SMTP_USER").ok(),
            std::env::var("MULTITASKER_SMTP_PASS").ok(),
            std::env::var("MULTITASKER_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid MULTITASKER_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            registration,
            max_body_size,
            cors_origins,
            access_token_minutes,
            reset,
            admin,
            log_level,
            smtp,
        })
    }
}

fn reset_from_env() -> Result<ResetConfig, String> {
    let ttl_minutes = parse_minutes(
        "MULTITASKER_RESET_TOKEN_MINUTES",
        &env_or("MULTITASKER_RESET_TOKEN_MINUTES", "30"),
        MAX_RESET_TOKEN_MINUTES,
    )?;

    let length = std::env::var("MULTITASKER_RESET_TOKEN_LENGTH")
        .ok()
        .map(|v| {
            v.parse::<usize>()
                .map_err(|e| format!("Invalid MULTITASKER_RESET_TOKEN_LENGTH: {e}"))
        })
        .transpose()?;

    let format = match env_or("MULTITASKER_RESET_TOKEN_FORMAT", "numeric").as_str() {
        "numeric" => TokenFormat::numeric(length.unwrap_or(TokenFormat::MIN_DIGITS))?,
        "alphanumeric" => TokenFormat::alphanumeric(length.unwrap_or(TokenFormat::MIN_CHARS))?,
        other => return Err(format!("Invalid MULTITASKER_RESET_TOKEN_FORMAT: {other}")),
    };

    Ok(ResetConfig {
        ttl_minutes,
        format,
    })
}

/// Parses a lifetime in minutes, bounded to `1..=max`.
fn parse_minutes(key: &str, raw: &str, max: i64) -> Result<i64, String> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid {key}: {e}"))?;
    if !(1..=max).contains(&minutes) {
        return Err(format!("{key} must be between 1 and {max}, got {minutes}"));
    }
    Ok(minutes)
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_within_bounds_parse() {
        assert_eq!(parse_minutes("TTL", "30", MAX_RESET_TOKEN_MINUTES), Ok(30));
        assert_eq!(
            parse_minutes("TTL", " 10080 ", MAX_RESET_TOKEN_MINUTES),
            Ok(MAX_RESET_TOKEN_MINUTES)
        );
    }

    #[test]
    fn minutes_out_of_bounds_are_errors() {
        assert!(parse_minutes("TTL", "0", MAX_RESET_TOKEN_MINUTES).is_err());
        assert!(parse_minutes("TTL", "-5", MAX_RESET_TOKEN_MINUTES).is_err());
        assert!(parse_minutes("TTL", "10081", MAX_RESET_TOKEN_MINUTES).is_err());
        let err = parse_minutes("TTL", "9223372036854775807", MAX_RESET_TOKEN_MINUTES)
            .unwrap_err();
        assert!(err.contains("between 1 and"));
        assert!(parse_minutes("TTL", "soon", MAX_RESET_TOKEN_MINUTES).is_err());
    }
}
