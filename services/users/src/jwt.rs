//! JWT issuance and verification for user records
//!
//! Access and refresh tokens are signed with HS256 using two separate
//! secrets. Secrets and lifetimes come from a [`TokenConfig`] handed in by
//! the caller, so a missing setting surfaces as a [`ConfigError`] on the
//! call that needs it.

use common::ConfigError;
use common::config::optional_env;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use crate::error::TokenError;
use crate::models::User;

const ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";
const ACCESS_TOKEN_EXPIRY: &str = "ACCESS_TOKEN_EXPIRY";
const REFRESH_TOKEN_SECRET: &str = "REFRESH_TOKEN_SECRET";
const REFRESH_TOKEN_EXPIRY: &str = "REFRESH_TOKEN_EXPIRY";

/// Token signing configuration
///
/// Every field is optional here; the generating function that needs a
/// value reports it as missing.
#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    pub access_token_secret: Option<String>,
    /// Lifetime such as `"900"` (seconds), `"15m"`, `"1.5h"` or `"1d"`
    pub access_token_expiry: Option<String>,
    pub refresh_token_secret: Option<String>,
    pub refresh_token_expiry: Option<String>,
}

impl TokenConfig {
    /// Read token settings from environment variables
    ///
    /// # Environment Variables
    /// - `ACCESS_TOKEN_SECRET`: HMAC secret for access tokens
    /// - `ACCESS_TOKEN_EXPIRY`: access token lifetime
    /// - `REFRESH_TOKEN_SECRET`: HMAC secret for refresh tokens
    /// - `REFRESH_TOKEN_EXPIRY`: refresh token lifetime
    pub fn from_env() -> Self {
        Self {
            access_token_secret: optional_env(ACCESS_TOKEN_SECRET),
            access_token_expiry: optional_env(ACCESS_TOKEN_EXPIRY),
            refresh_token_secret: optional_env(REFRESH_TOKEN_SECRET),
            refresh_token_expiry: optional_env(REFRESH_TOKEN_EXPIRY),
        }
    }

    fn access(&self) -> Result<SigningSettings<'_>, ConfigError> {
        SigningSettings::resolve(
            (ACCESS_TOKEN_SECRET, self.access_token_secret.as_deref()),
            (ACCESS_TOKEN_EXPIRY, self.access_token_expiry.as_deref()),
        )
    }

    fn refresh(&self) -> Result<SigningSettings<'_>, ConfigError> {
        SigningSettings::resolve(
            (REFRESH_TOKEN_SECRET, self.refresh_token_secret.as_deref()),
            (REFRESH_TOKEN_EXPIRY, self.refresh_token_expiry.as_deref()),
        )
    }
}

struct SigningSettings<'a> {
    secret: &'a str,
    expiry_name: &'static str,
    expiry: &'a str,
    expiry_seconds: u64,
}

impl<'a> SigningSettings<'a> {
    fn resolve(
        (secret_name, secret): (&'static str, Option<&'a str>),
        (expiry_name, expiry): (&'static str, Option<&'a str>),
    ) -> Result<Self, ConfigError> {
        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(secret_name))?;
        let expiry = expiry
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing(expiry_name))?;
        let expiry_seconds = parse_expiry(expiry).ok_or_else(|| ConfigError::Invalid {
            name: expiry_name,
            value: expiry.to_string(),
        })?;

        Ok(Self {
            secret,
            expiry_name,
            expiry,
            expiry_seconds,
        })
    }

    /// `exp` claim for a token issued at `iat`
    fn expires_at(&self, iat: u64) -> Result<u64, ConfigError> {
        iat.checked_add(self.expiry_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                name: self.expiry_name,
                value: self.expiry.to_string(),
            })
    }
}

/// Parse a token lifetime into whole seconds
///
/// Takes a number, optionally fractional, followed by a unit: `ms`, `s`,
/// `m`, `h`, `d`, `w`, `y` (long forms such as `days` or `milliseconds`
/// work too, a year is 365.25 days). The result is rounded down, so
/// `"500ms"` is zero seconds.
///
/// A bare number is read as seconds, unlike the `ms` package convention
/// where it means milliseconds.
pub fn parse_expiry(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);

    // Digits with at most one dot, and at least one digit after it
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if (whole.is_empty() && fraction.is_empty())
        || amount.ends_with('.')
        || fraction.contains('.')
    {
        return None;
    }

    let unit_millis: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1,
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
        "d" | "day" | "days" => 86_400_000,
        "w" | "week" | "weeks" => 604_800_000,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000,
        _ => return None,
    };

    if fraction.is_empty() {
        let amount: u128 = whole.parse().ok()?;
        let seconds = amount.checked_mul(u128::from(unit_millis))? / 1_000;
        return u64::try_from(seconds).ok();
    }

    let amount: f64 = amount.parse().ok()?;
    let seconds = (amount * unit_millis as f64 / 1_000.0).floor();
    if !seconds.is_finite() || seconds >= u64::MAX as f64 {
        return None;
    }
    Some(seconds as u64)
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub iat: u64,
    pub exp: u64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub iat: u64,
    pub exp: u64,
}

/// Tokens handed out on login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn now() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Generate an access token for a user
pub fn generate_access_token(user: &User, config: &TokenConfig) -> Result<String, TokenError> {
    let settings = config.access()?;
    let iat = now()?;

    let claims = AccessClaims {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        iat,
        exp: settings.expires_at(iat)?,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Generate a refresh token for a user
pub fn generate_refresh_token(user: &User, config: &TokenConfig) -> Result<String, TokenError> {
    let settings = config.refresh()?;
    let iat = now()?;

    let claims = RefreshClaims {
        id: user.id,
        iat,
        exp: settings.expires_at(iat)?,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Issue both tokens and remember the refresh token on the record
///
/// The record still has to be saved for the refresh token to persist.
pub fn issue_token_pair(user: &mut User, config: &TokenConfig) -> Result<TokenPair, TokenError> {
    let access_token = generate_access_token(user, config)?;
    let refresh_token = generate_refresh_token(user, config)?;
    user.refresh_token = Some(refresh_token.clone());

    info!("Issued token pair for user: {}", user.id);
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify an access token and return its claims
pub fn decode_access_token(token: &str, config: &TokenConfig) -> Result<AccessClaims, TokenError> {
    let settings = config.access()?;
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Verify a refresh token and return its claims
pub fn decode_refresh_token(token: &str, config: &TokenConfig) -> Result<RefreshClaims, TokenError> {
    let settings = config.refresh()?;
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::validation::validate;
    use serial_test::serial;

    fn config() -> TokenConfig {
        TokenConfig {
            access_token_secret: Some("access-secret".to_string()),
            access_token_expiry: Some("1d".to_string()),
            refresh_token_secret: Some("refresh-secret".to_string()),
            refresh_token_expiry: Some("10d".to_string()),
        }
    }

    fn user() -> User {
        User::new(
            validate(NewUser {
                username: "creator".to_string(),
                email: "creator@example.com".to_string(),
                full_name: "Channel Creator".to_string(),
                avatar: "https://cdn.example.com/c.png".to_string(),
                cover_image: None,
                password: "password123".to_string(),
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("900"), Some(900));
        assert_eq!(parse_expiry("15m"), Some(900));
        assert_eq!(parse_expiry("1d"), Some(86_400));
        assert_eq!(parse_expiry("10d"), Some(864_000));
        assert_eq!(parse_expiry("2 hours"), Some(7_200));
        assert_eq!(parse_expiry("1W"), Some(604_800));
        assert_eq!(parse_expiry("1y"), Some(31_557_600));
        assert_eq!(parse_expiry("d"), None);
        assert_eq!(parse_expiry("5 fortnights"), None);
        assert_eq!(parse_expiry("-1d"), None);
    }

    #[test]
    fn test_parse_expiry_milliseconds_and_fractions() {
        assert_eq!(parse_expiry("1.5h"), Some(5_400));
        assert_eq!(parse_expiry(".5m"), Some(30));
        assert_eq!(parse_expiry("2.5 days"), Some(216_000));
        assert_eq!(parse_expiry("500ms"), Some(0));
        assert_eq!(parse_expiry("2500ms"), Some(2));
        assert_eq!(parse_expiry("1500 milliseconds"), Some(1));
        assert_eq!(parse_expiry("1."), None);
        assert_eq!(parse_expiry("1.2.3s"), None);
        assert_eq!(parse_expiry("."), None);
    }

    #[test]
    fn test_parse_expiry_bounds() {
        assert_eq!(parse_expiry("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_expiry("18446744073709551616"), None);
        assert_eq!(parse_expiry("18446744073709551615d"), None);
        assert_eq!(parse_expiry("1e300y"), None);
    }

    #[test]
    fn test_access_token_round_trip() {
        let user = user();
        let config = config();

        let token = generate_access_token(&user, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "creator@example.com");
        assert_eq!(claims.username, "creator");
        assert_eq!(claims.full_name, "Channel Creator");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let user = user();
        let config = config();

        let token = generate_refresh_token(&user, &config).unwrap();
        let claims = decode_refresh_token(&token, &config).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.exp - claims.iat, 864_000);
    }

    #[test]
    fn test_tokens_use_separate_secrets() {
        let user = user();
        let config = config();

        let refresh = generate_refresh_token(&user, &config).unwrap();
        assert!(matches!(
            decode_access_token(&refresh, &config),
            Err(TokenError::Jwt(_))
        ));
    }

    #[test]
    fn test_access_claim_names() {
        let claims = AccessClaims {
            id: Uuid::nil(),
            email: "a@b.co".to_string(),
            username: "a".to_string(),
            full_name: "A".to_string(),
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("_id").is_some());
        assert!(json.get("fullName").is_some());
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let user = user();
        let mut config = config();
        config.access_token_secret = None;

        match generate_access_token(&user, &config) {
            Err(TokenError::Config(ConfigError::Missing(name))) => {
                assert_eq!(name, "ACCESS_TOKEN_SECRET")
            }
            other => panic!("expected missing secret, got {:?}", other),
        }

        // The refresh side is configured independently
        assert!(generate_refresh_token(&user, &config).is_ok());
    }

    #[test]
    fn test_missing_or_invalid_expiry_is_config_error() {
        let user = user();
        let mut config = config();
        config.refresh_token_expiry = None;
        assert!(matches!(
            generate_refresh_token(&user, &config),
            Err(TokenError::Config(ConfigError::Missing("REFRESH_TOKEN_EXPIRY")))
        ));

        config.refresh_token_expiry = Some("soon".to_string());
        assert!(matches!(
            generate_refresh_token(&user, &config),
            Err(TokenError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_expiry_past_the_clock_range_is_config_error() {
        let user = user();
        let mut config = config();
        config.access_token_expiry = Some("18446744073709551615".to_string());
        config.refresh_token_expiry = Some("18446744073709551615".to_string());

        for result in [
            generate_access_token(&user, &config),
            generate_refresh_token(&user, &config),
        ] {
            match result {
                Err(TokenError::Config(ConfigError::Invalid { value, .. })) => {
                    assert_eq!(value, "18446744073709551615")
                }
                other => panic!("expected invalid expiry, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_issue_token_pair_stores_refresh_token() {
        let mut user = user();
        let pair = issue_token_pair(&mut user, &config()).unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
    }

    #[test]
    #[serial]
    fn test_token_config_from_env() {
        unsafe {
            std::env::set_var("ACCESS_TOKEN_SECRET", "from-env");
            std::env::set_var("ACCESS_TOKEN_EXPIRY", "15m");
            std::env::remove_var("REFRESH_TOKEN_SECRET");
            std::env::set_var("REFRESH_TOKEN_EXPIRY", "");
        }

        let config = TokenConfig::from_env();
        assert_eq!(config.access_token_secret.as_deref(), Some("from-env"));
        assert_eq!(config.access_token_expiry.as_deref(), Some("15m"));
        assert_eq!(config.refresh_token_secret, None);
        assert_eq!(config.refresh_token_expiry, None);

        unsafe {
            std::env::remove_var("ACCESS_TOKEN_SECRET");
            std::env::remove_var("ACCESS_TOKEN_EXPIRY");
            std::env::remove_var("REFRESH_TOKEN_EXPIRY");
        }
    }
}
