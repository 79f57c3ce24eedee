//! Operator configuration
//!
//! Loaded from an optional `.env` file, then the process environment.

use aetheria::registry::{ARBITRUM_SEPOLIA, BASE_SEPOLIA, OPTIMISM_SEPOLIA};
use aetheria::Registry;
use eyre::{eyre, Result};
use std::time::Duration;

/// RPC override variables, one per deployed chain
const RPC_URL_VARS: [(u64, &str); 3] = [
    (BASE_SEPOLIA, "BASE_SEPOLIA_RPC_URL"),
    (ARBITRUM_SEPOLIA, "ARBITRUM_SEPOLIA_RPC_URL"),
    (OPTIMISM_SEPOLIA, "OPTIMISM_SEPOLIA_RPC_URL"),
];

#[derive(Clone)]
pub struct Config {
    /// Signing key; without it only reads are possible
    pub private_key: Option<String>,
    /// Active chain the wallet submits on
    pub chain_id: u64,
    /// Per-chain RPC overrides of the registry defaults
    pub rpc_urls: Vec<(u64, String)>,
    pub poll_interval_ms: u64,
    /// Unset means wait for confirmations indefinitely
    pub confirmation_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("chain_id", &self.chain_id)
            .field("rpc_urls", &self.rpc_urls)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .finish()
    }
}

fn default_chain_id() -> u64 {
    ARBITRUM_SEPOLIA
}

fn default_poll_interval() -> u64 {
    1000
}

impl Config {
    /// Load configuration from `.env` if present, otherwise the environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load variables from `path` into the environment, then read them
    pub fn load_from_file(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            return Err(eyre!("Config file not found: {}", path));
        }
        dotenvy::from_filename(path).map_err(|e| eyre!("Failed to read {}: {}", path, e))?;
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let private_key = std::env::var("AETHERIA_PRIVATE_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let chain_id = match std::env::var("AETHERIA_CHAIN_ID") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| eyre!("AETHERIA_CHAIN_ID must be a valid u64, got '{}'", v))?,
            Err(_) => default_chain_id(),
        };

        let rpc_urls = RPC_URL_VARS
            .iter()
            .filter_map(|(chain_id, var)| {
                std::env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|url| (*chain_id, url))
            })
            .collect();

        let poll_interval_ms = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_poll_interval());

        let confirmation_timeout_secs = match std::env::var("CONFIRMATION_TIMEOUT_SECS") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v.trim().parse().map_err(|_| {
                eyre!(
                    "CONFIRMATION_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    v
                )
            })?),
            Err(_) => None,
        };

        let config = Self {
            private_key,
            chain_id,
            rpc_urls,
            poll_interval_ms,
            confirmation_timeout_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.private_key {
            let hex = key
                .strip_prefix("0x")
                .ok_or_else(|| eyre!("AETHERIA_PRIVATE_KEY must start with 0x"))?;
            if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(eyre!(
                    "AETHERIA_PRIVATE_KEY must be 0x followed by 64 hex characters"
                ));
            }
        }

        let registry = Registry::aetheria_testnet();
        if registry.chain(self.chain_id).is_none() {
            return Err(eyre!(
                "AETHERIA_CHAIN_ID {} is not a supported chain",
                self.chain_id
            ));
        }

        for (chain_id, url) in &self.rpc_urls {
            let var = RPC_URL_VARS
                .iter()
                .find(|(id, _)| id == chain_id)
                .map(|(_, var)| *var)
                .unwrap_or("RPC URL");
            validate_rpc_url(url, var)?;
        }

        if self.poll_interval_ms == 0 {
            return Err(eyre!("POLL_INTERVAL_MS must be greater than 0"));
        }
        if self.confirmation_timeout_secs == Some(0) {
            return Err(eyre!("CONFIRMATION_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(())
    }

    /// The testnet registry with RPC overrides applied
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::aetheria_testnet();
        for (chain_id, url) in &self.rpc_urls {
            registry.set_rpc_url(*chain_id, url);
        }
        registry
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}

/// Accept only http(s) endpoints that name a host; `var` labels the error
pub fn validate_rpc_url(url: &str, var: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url).map_err(|e| eyre!("{} is not a URL ({}): {}", var, e, url))?;

    match parsed.scheme() {
        "https" => {}
        "http" => tracing::debug!(var, "RPC override is plain http"),
        other => return Err(eyre!("{} needs an http or https endpoint, not {}://", var, other)),
    }

    if !parsed.has_host() {
        return Err(eyre!("{} has no host: {}", var, url));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    const ALL_VARS: [&str; 7] = [
        "AETHERIA_PRIVATE_KEY",
        "AETHERIA_CHAIN_ID",
        "BASE_SEPOLIA_RPC_URL",
        "ARBITRUM_SEPOLIA_RPC_URL",
        "OPTIMISM_SEPOLIA_RPC_URL",
        "POLL_INTERVAL_MS",
        "CONFIRMATION_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn base_config() -> Config {
        Config {
            private_key: Some(TEST_KEY.to_string()),
            chain_id: ARBITRUM_SEPOLIA,
            rpc_urls: vec![],
            poll_interval_ms: 1000,
            confirmation_timeout_secs: None,
        }
    }

    #[test]
    fn test_default_poll_interval() {
        assert_eq!(default_poll_interval(), 1000);
    }

    #[test]
    fn test_default_chain_is_arena() {
        let registry = Registry::aetheria_testnet();
        assert!(registry.chain(default_chain_id()).unwrap().is_arena());
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_env();
        let config = Config::load_from_env().unwrap();
        assert!(config.private_key.is_none());
        assert_eq!(config.chain_id, ARBITRUM_SEPOLIA);
        assert!(config.rpc_urls.is_empty());
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.confirmation_timeout(), None);
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_env();
        std::env::set_var("AETHERIA_PRIVATE_KEY", TEST_KEY);
        std::env::set_var("AETHERIA_CHAIN_ID", "11155420");
        std::env::set_var("OPTIMISM_SEPOLIA_RPC_URL", "https://op.example.org/rpc");
        std::env::set_var("POLL_INTERVAL_MS", "250");
        std::env::set_var("CONFIRMATION_TIMEOUT_SECS", "90");

        let config = Config::load_from_env().unwrap();
        clear_env();

        assert_eq!(config.private_key.as_deref(), Some(TEST_KEY));
        assert_eq!(config.chain_id, OPTIMISM_SEPOLIA);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.confirmation_timeout(), Some(Duration::from_secs(90)));

        let registry = config.registry();
        assert_eq!(
            registry.chain(OPTIMISM_SEPOLIA).unwrap().rpc_url,
            "https://op.example.org/rpc"
        );
        assert_eq!(
            registry.chain(BASE_SEPOLIA).unwrap().rpc_url,
            "https://sepolia.base.org"
        );
    }

    #[test]
    #[serial]
    fn test_load_from_env_rejects_bad_chain_id() {
        clear_env();
        std::env::set_var("AETHERIA_CHAIN_ID", "arbitrum");
        let result = Config::load_from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_env_rejects_bad_confirmation_timeout() {
        clear_env();
        std::env::set_var("CONFIRMATION_TIMEOUT_SECS", "30s");
        let result = Config::load_from_env();
        clear_env();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("CONFIRMATION_TIMEOUT_SECS"));
    }

    #[test]
    #[serial]
    fn test_load_from_env_blank_confirmation_timeout_waits_forever() {
        clear_env();
        std::env::set_var("CONFIRMATION_TIMEOUT_SECS", "  ");
        let config = Config::load_from_env().unwrap();
        clear_env();
        assert_eq!(config.confirmation_timeout(), None);
    }

    #[test]
    fn test_private_key_validation() {
        let mut config = base_config();
        assert!(config.validate().is_ok());

        config.private_key = Some("0x123".to_string());
        assert!(config.validate().is_err());

        config.private_key = Some(TEST_KEY.trim_start_matches("0x").to_string());
        assert!(config.validate().is_err());

        config.private_key = Some(format!("0x{}", "zz".repeat(32)));
        assert!(config.validate().is_err());

        config.private_key = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_chain_rejected() {
        let mut config = base_config();
        config.chain_id = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not a supported chain"));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut config = base_config();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.confirmation_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rpc_url() {
        let url = validate_rpc_url("https://sepolia.base.org", "RPC").unwrap();
        assert_eq!(url.host_str(), Some("sepolia.base.org"));
        assert!(validate_rpc_url("http://localhost:8545", "RPC").is_ok());

        let err = validate_rpc_url("ws://localhost:8546", "BASE_SEPOLIA_RPC_URL").unwrap_err();
        assert!(err.to_string().contains("BASE_SEPOLIA_RPC_URL"));
        assert!(validate_rpc_url("not a url", "RPC").is_err());
        assert!(validate_rpc_url("unix:/var/run/geth.ipc", "RPC").is_err());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = base_config();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(TEST_KEY));
        assert!(debug.contains("<redacted>"));
    }
}
