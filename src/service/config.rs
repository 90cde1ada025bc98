//! Task service configuration.
//!
//! # Environment Variables
//!
//! - `TASK_CACHE_ENABLED`: `true` (default) | `false` (also `1` / `0`, `yes` / `no`)
//! - `TASK_CACHE_CAPACITY`: Maximum cached results per cache (default: `1000`)
//! - `TASK_CACHE_TTL_SECS`: Lifetime of a cached result in seconds (default: `60`, minimum: `1`)
//! - `TASK_DEFAULT_PAGE_SIZE`: Page size used when a search omits it (default: `10`)
//!
//! # Example
//!
//! ```
//! use todo_backend::service::ServiceConfig;
//!
//! let config = ServiceConfig::builder()
//!     .cache_capacity(500)
//!     .cache_ttl_seconds(30)
//!     .default_page_size(20)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.cache.enabled);
//! assert_eq!(config.default_page_size, 20);
//! ```

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_CACHE_CAPACITY: usize = 1000;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;
const DEFAULT_PAGE_SIZE: u32 = 10;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A variable holds a value that cannot be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
    },

    /// The cache capacity is zero while caching is enabled.
    #[error("TASK_CACHE_CAPACITY must be greater than 0 when caching is enabled")]
    ZeroCacheCapacity,

    /// The default page size is zero.
    #[error("TASK_DEFAULT_PAGE_SIZE must be greater than 0")]
    ZeroPageSize,
}

// =============================================================================
// Cache Configuration
// =============================================================================

/// Configuration for the service's result caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether results are cached at all.
    pub enabled: bool,
    /// Maximum number of entries per cache.
    pub capacity: usize,
    /// Time-to-live for cached entries in seconds.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Returns a configuration with caching turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns the entry lifetime, never shorter than one second.
    #[must_use]
    pub const fn time_to_live(&self) -> Duration {
        if self.ttl_seconds == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(self.ttl_seconds)
        }
    }
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Configuration for [`TaskService`](super::TaskService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Result cache settings.
    pub cache: CacheConfig,
    /// Page size used when search values omit it.
    pub default_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a variable cannot be parsed or the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a variable cannot be parsed or the
    /// resulting configuration is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();

        let enabled = match read("TASK_CACHE_ENABLED") {
            Some(value) => parse_flag("TASK_CACHE_ENABLED", &value)?,
            None => defaults.cache.enabled,
        };
        let capacity = match read("TASK_CACHE_CAPACITY") {
            Some(value) => parse_number("TASK_CACHE_CAPACITY", &value)?,
            None => defaults.cache.capacity,
        };
        let ttl_seconds = match read("TASK_CACHE_TTL_SECS") {
            Some(value) => parse_number("TASK_CACHE_TTL_SECS", &value)?,
            None => defaults.cache.ttl_seconds,
        };
        let default_page_size = match read("TASK_DEFAULT_PAGE_SIZE") {
            Some(value) => parse_number("TASK_DEFAULT_PAGE_SIZE", &value)?,
            None => defaults.default_page_size,
        };

        let config = Self {
            cache: CacheConfig {
                enabled,
                capacity,
                ttl_seconds,
            },
            default_page_size,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the page size is zero, or the cache
    /// capacity is zero while caching is enabled.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.default_page_size == 0 {
            return Err(ConfigurationError::ZeroPageSize);
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigurationError::ZeroCacheCapacity);
        }
        Ok(())
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigurationError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: &str,
) -> Result<T, ConfigurationError> {
    value
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue {
            name,
            value: value.to_string(),
        })
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for `ServiceConfig`.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Enables or disables result caching.
    #[must_use]
    pub const fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    /// Sets the maximum number of entries per cache.
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache.capacity = capacity;
        self
    }

    /// Sets the cache entry lifetime in seconds.
    #[must_use]
    pub const fn cache_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.config.cache.ttl_seconds = ttl_seconds;
        self
    }

    /// Sets the page size used when search values omit it.
    #[must_use]
    pub const fn default_page_size(mut self, page_size: u32) -> Self {
        self.config.default_page_size = page_size;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<ServiceConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name| variables.get(name).cloned()
    }

    #[rstest]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.default_page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn test_from_lookup_empty_uses_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[rstest]
    fn test_from_lookup_reads_all_variables() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("TASK_CACHE_ENABLED", "no"),
            ("TASK_CACHE_CAPACITY", "25"),
            ("TASK_CACHE_TTL_SECS", " 5 "),
            ("TASK_DEFAULT_PAGE_SIZE", "50"),
        ]))
        .unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.cache.capacity, 25);
        assert_eq!(config.cache.ttl_seconds, 5);
        assert_eq!(config.default_page_size, 50);
    }

    #[rstest]
    fn test_from_lookup_blank_is_default() {
        let config =
            ServiceConfig::from_lookup(lookup_from(&[("TASK_CACHE_CAPACITY", "   ")])).unwrap();
        assert_eq!(config.cache.capacity, 1000);
    }

    #[rstest]
    #[case("TASK_CACHE_ENABLED", "maybe")]
    #[case("TASK_CACHE_CAPACITY", "-1")]
    #[case("TASK_CACHE_TTL_SECS", "soon")]
    #[case("TASK_DEFAULT_PAGE_SIZE", "ten")]
    fn test_from_lookup_invalid_value(#[case] name: &str, #[case] value: &str) {
        let result = ServiceConfig::from_lookup(lookup_from(&[(name, value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name: found, .. }) if found == name
        ));
    }

    #[rstest]
    fn test_zero_page_size_is_rejected() {
        let result = ServiceConfig::from_lookup(lookup_from(&[("TASK_DEFAULT_PAGE_SIZE", "0")]));
        assert_eq!(result, Err(ConfigurationError::ZeroPageSize));
    }

    #[rstest]
    fn test_zero_capacity_only_rejected_when_enabled() {
        let result = ServiceConfig::builder().cache_capacity(0).build();
        assert_eq!(result, Err(ConfigurationError::ZeroCacheCapacity));

        let result = ServiceConfig::builder()
            .cache_enabled(false)
            .cache_capacity(0)
            .build();
        assert!(result.is_ok());
    }

    #[rstest]
    fn test_time_to_live_never_zero() {
        let config = CacheConfig {
            ttl_seconds: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.time_to_live(), Duration::from_secs(1));
        assert_eq!(
            CacheConfig::default().time_to_live(),
            Duration::from_secs(60)
        );
    }

    #[rstest]
    fn test_disabled_cache_config() {
        assert!(!CacheConfig::disabled().enabled);
    }
}
