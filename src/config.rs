use anyhow::{ensure, Context};
use serde::Deserialize;

/// Opaque access token settings. TTL is short on purpose: expiry is enforced
/// lazily at the moment a token is presented, there is no background sweeper.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub ttl_minutes: i64,
    pub length: usize,
}

impl TokenConfig {
    /// A non-positive TTL would issue already-expired tokens and a short
    /// value would weaken the token space, so both are startup errors rather
    /// than silent fallbacks.
    fn parse(ttl_minutes: Option<&str>, length: Option<&str>) -> anyhow::Result<Self> {
        let ttl_minutes = match ttl_minutes {
            Some(v) => v
                .parse::<i64>()
                .context("TOKEN_TTL_MINUTES must be an integer")?,
            None => 5,
        };
        ensure!(ttl_minutes > 0, "TOKEN_TTL_MINUTES must be positive");

        let length = match length {
            Some(v) => v.parse::<usize>().context("TOKEN_LENGTH must be an integer")?,
            None => 32,
        };
        ensure!(length >= 32, "TOKEN_LENGTH must be at least 32");

        Ok(Self {
            ttl_minutes,
            length,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub token: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let token = TokenConfig::parse(
            std::env::var("TOKEN_TTL_MINUTES").ok().as_deref(),
            std::env::var("TOKEN_LENGTH").ok().as_deref(),
        )?;
        Ok(Self {
            database_url,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let token = TokenConfig::parse(None, None).unwrap();
        assert_eq!(token.ttl_minutes, 5);
        assert_eq!(token.length, 32);
    }

    #[test]
    fn overrides_are_accepted() {
        let token = TokenConfig::parse(Some("15"), Some("48")).unwrap();
        assert_eq!(token.ttl_minutes, 15);
        assert_eq!(token.length, 48);
    }

    #[test]
    fn zero_or_negative_ttl_is_rejected() {
        assert!(TokenConfig::parse(Some("0"), None).is_err());
        assert!(TokenConfig::parse(Some("-5"), None).is_err());
    }

    #[test]
    fn unparseable_ttl_is_rejected() {
        assert!(TokenConfig::parse(Some("soon"), None).is_err());
    }

    #[test]
    fn short_token_length_is_rejected() {
        assert!(TokenConfig::parse(None, Some("16")).is_err());
    }
}
