//! Engine configuration.
//!
//! All knobs are explicit and passed at construction; nothing is read from
//! the environment inside the engine.

const DEFAULT_CODE_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_LOCK_THRESHOLD: i32 = 5;
const DEFAULT_LOCK_DURATION_SECONDS: i64 = 30 * 60;
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_HASH_COST: u32 = 12;

/// Configuration for the account lifecycle engine.
///
/// Verification and reset codes share one TTL (15 minutes). The legacy
/// 24-hour verification window is superseded and intentionally not
/// representable as a separate knob.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    code_ttl_seconds: i64,
    lock_threshold: i32,
    lock_duration_seconds: i64,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    hash_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            lock_threshold: DEFAULT_LOCK_THRESHOLD,
            lock_duration_seconds: DEFAULT_LOCK_DURATION_SECONDS,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_lock_threshold(mut self, threshold: i32) -> Self {
        self.lock_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_lock_duration_seconds(mut self, seconds: i64) -> Self {
        self.lock_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    #[must_use]
    pub fn code_ttl_seconds(&self) -> i64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub fn lock_threshold(&self) -> i32 {
        self.lock_threshold
    }

    #[must_use]
    pub fn lock_duration_seconds(&self) -> i64 {
        self.lock_duration_seconds
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthConfig;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(config.code_ttl_seconds(), super::DEFAULT_CODE_TTL_SECONDS);
        assert_eq!(config.lock_threshold(), super::DEFAULT_LOCK_THRESHOLD);
        assert_eq!(
            config.lock_duration_seconds(),
            super::DEFAULT_LOCK_DURATION_SECONDS
        );
        assert_eq!(
            config.access_token_ttl_seconds(),
            super::DEFAULT_ACCESS_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.refresh_token_ttl_seconds(),
            super::DEFAULT_REFRESH_TOKEN_TTL_SECONDS
        );
        assert_eq!(config.hash_cost(), super::DEFAULT_HASH_COST);

        let config = config
            .with_code_ttl_seconds(60)
            .with_lock_threshold(3)
            .with_lock_duration_seconds(120)
            .with_access_token_ttl_seconds(30)
            .with_refresh_token_ttl_seconds(3600)
            .with_hash_cost(4);

        assert_eq!(config.code_ttl_seconds(), 60);
        assert_eq!(config.lock_threshold(), 3);
        assert_eq!(config.lock_duration_seconds(), 120);
        assert_eq!(config.access_token_ttl_seconds(), 30);
        assert_eq!(config.refresh_token_ttl_seconds(), 3600);
        assert_eq!(config.hash_cost(), 4);
    }
}
