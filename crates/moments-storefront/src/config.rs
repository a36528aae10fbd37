//! Storefront configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use moments_auth::DemoOtpProvider;
use moments_commerce::catalog::Catalog;
use moments_commerce::checkout::SimulatedPaymentProcessor;
use moments_commerce::Currency;
use moments_store::Store;
use serde::{Deserialize, Serialize};

use crate::StorefrontError;

/// Storefront configuration file (`moments.toml` or `moments.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// ISO code prices are quoted in.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// JSON product list to load instead of the built-in catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            catalog_path: None,
            auth: AuthConfig::default(),
            payment: PaymentConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorefrontError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| StorefrontError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded storefront config");
        Ok(config)
    }

    /// Save config to a file, in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StorefrontError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content).map_err(|source| StorefrontError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML config text.
    pub fn from_toml(content: &str) -> Result<Self, StorefrontError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), StorefrontError> {
        let currency = self.currency()?;
        if self.catalog_path.is_none() && currency != Currency::USD {
            return Err(StorefrontError::Config(format!(
                "the built-in catalog is priced in USD; set catalog_path for {}",
                currency.code()
            )));
        }
        if !moments_auth::is_well_formed_code(&self.auth.demo_code) {
            return Err(StorefrontError::Config(
                "auth.demo_code must be 6 digits".into(),
            ));
        }
        if self.payment.timeout_ms == 0 {
            return Err(StorefrontError::Config(
                "payment.timeout_ms must be positive".into(),
            ));
        }
        if self.payment.decline_enabled && self.payment.decline_suffix.trim().is_empty() {
            return Err(StorefrontError::Config(
                "payment.decline_suffix must not be empty".into(),
            ));
        }
        if self.store.backend == StoreKind::File && self.store.dir.as_os_str().is_empty() {
            return Err(StorefrontError::Config(
                "store.dir is required for the file backend".into(),
            ));
        }
        Ok(())
    }

    pub fn currency(&self) -> Result<Currency, StorefrontError> {
        Currency::from_code(&self.currency)
            .ok_or_else(|| StorefrontError::Config(format!("unknown currency: {}", self.currency)))
    }

    /// Upper bound on a single payment attempt.
    pub fn payment_timeout(&self) -> Duration {
        Duration::from_millis(self.payment.timeout_ms)
    }

    pub fn otp_provider(&self) -> DemoOtpProvider {
        DemoOtpProvider::new(
            self.auth.demo_code.clone(),
            Duration::from_millis(self.auth.otp_delay_ms),
        )
    }

    pub fn payment_processor(&self) -> SimulatedPaymentProcessor {
        SimulatedPaymentProcessor::new(Duration::from_millis(self.payment.latency_ms))
            .with_decline_suffix(
                self.payment
                    .decline_enabled
                    .then(|| self.payment.decline_suffix.clone()),
            )
    }

    /// Open the configured store backend.
    pub fn open_store(&self) -> Result<Store, StorefrontError> {
        Ok(match self.store.backend {
            StoreKind::Memory => Store::in_memory(),
            StoreKind::File => Store::open_dir(&self.store.dir)?,
        })
    }

    /// The configured product list, or the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog, StorefrontError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::demo());
        };
        let content =
            std::fs::read_to_string(path).map_err(|source| StorefrontError::ConfigRead {
                path: path.clone(),
                source,
            })?;
        Ok(Catalog::from_json(&content, self.currency()?)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Simulated sign-in code delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The code the demo provider accepts.
    #[serde(default = "default_demo_code")]
    pub demo_code: String,

    /// Simulated send delay.
    #[serde(default = "default_otp_delay_ms")]
    pub otp_delay_ms: u64,
}

fn default_demo_code() -> String {
    DemoOtpProvider::DEMO_CODE.to_string()
}

fn default_otp_delay_ms() -> u64 {
    1_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            demo_code: default_demo_code(),
            otp_delay_ms: default_otp_delay_ms(),
        }
    }
}

/// Simulated payment processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// How long the simulated processor takes to answer.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Give up on a charge after this long.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether card numbers ending in `decline_suffix` are declined.
    #[serde(default = "default_true")]
    pub decline_enabled: bool,

    /// Card-number suffix the simulated processor declines.
    #[serde(default = "default_decline_suffix")]
    pub decline_suffix: String,
}

fn default_latency_ms() -> u64 {
    2_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_decline_suffix() -> String {
    SimulatedPaymentProcessor::DEFAULT_DECLINE_SUFFIX.to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            timeout_ms: default_timeout_ms(),
            decline_enabled: default_true(),
            decline_suffix: default_decline_suffix(),
        }
    }
}

/// Where cart, orders and user are kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreKind,

    /// Directory for the file backend.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".moments")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::default(),
            dir: default_store_dir(),
        }
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
}

#[cfg(test)]
mod tests {
    use super::*;
    use moments_commerce::checkout::{CardDetails, PaymentProcessor};
    use moments_commerce::{Money, ProductId};

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_toml("").unwrap();
        assert_eq!(config.currency().unwrap(), Currency::USD);
        assert_eq!(config.auth.demo_code, "123456");
        assert_eq!(config.payment.latency_ms, 2_000);
        assert!(config.payment.decline_enabled);
        assert_eq!(config.payment.decline_suffix, "0002");
        assert_eq!(config.store.backend, StoreKind::File);
        assert_eq!(config.payment_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml() {
        let config = StorefrontConfig::from_toml(
            r#"
[payment]
latency_ms = 0

[store]
backend = "memory"
"#,
        )
        .unwrap();
        assert_eq!(config.payment.latency_ms, 0);
        assert_eq!(config.payment.timeout_ms, 10_000);
        assert_eq!(config.store.backend, StoreKind::Memory);
        assert!(config.open_store().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(StorefrontConfig::from_toml("currency = \"XYZ\"").is_err());
        assert!(StorefrontConfig::from_toml("[auth]\ndemo_code = \"12\"").is_err());
        assert!(StorefrontConfig::from_toml("[payment]\ntimeout_ms = 0").is_err());
        assert!(StorefrontConfig::from_toml("currency = 5").is_err());
        assert!(StorefrontConfig::from_toml("[payment]\ndecline_suffix = \"\"").is_err());
        assert!(StorefrontConfig::from_toml("[payment]\ndecline_suffix = \" \"").is_err());
        assert!(StorefrontConfig::from_toml(
            "[payment]\ndecline_enabled = false\ndecline_suffix = \"\""
        )
        .is_ok());
    }

    #[test]
    fn test_non_usd_requires_catalog() {
        let err = StorefrontConfig::from_toml("currency = \"EUR\"").unwrap_err();
        assert!(matches!(err, StorefrontError::Config(ref msg) if msg.contains("EUR")));

        let config = StorefrontConfig {
            currency: "GBP".into(),
            ..StorefrontConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_decline_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.payment.latency_ms = 0;
        config.payment.decline_enabled = false;

        for name in ["moments.toml", "moments.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            let loaded = StorefrontConfig::load(&path).unwrap();
            assert!(!loaded.payment.decline_enabled);

            let card = CardDetails::new("4000 0000 0000 0002", "Ada", "12/28", "123");
            let charged = loaded
                .payment_processor()
                .charge(&card, Money::usd(100))
                .await;
            assert!(charged.is_ok());
        }
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.auth.otp_delay_ms = 5;

        for name in ["moments.toml", "moments.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            let loaded = StorefrontConfig::load(&path).unwrap();
            assert_eq!(loaded.auth.otp_delay_ms, 5);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = StorefrontConfig::load("/nonexistent/moments.toml").unwrap_err();
        assert!(matches!(err, StorefrontError::ConfigRead { .. }));
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": 42, "name": "Clay Kit", "price": 12.5, "image": "", "category": "Clay"}]"#,
        )
        .unwrap();

        let config = StorefrontConfig {
            catalog_path: Some(path.clone()),
            ..StorefrontConfig::default()
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.categories(), vec!["Clay"]);

        let config = StorefrontConfig::from_toml(&format!(
            "currency = \"EUR\"\ncatalog_path = {:?}",
            path.display().to_string()
        ))
        .unwrap();
        let catalog = config.load_catalog().unwrap();
        let clay = catalog.get(ProductId::new(42)).unwrap();
        assert_eq!(clay.price, Money::new(1250, Currency::EUR));
    }
}
