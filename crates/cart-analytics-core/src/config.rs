use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub output_dir: String,
    pub analysis: AnalysisConfig,
    pub mining: MiningConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Width of the trailing moving-average window, in calendar days.
    pub moving_average_days: u32,
    /// Number of association rules shown on the console.
    pub top_rules: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    pub enabled: bool,
    pub min_support: f64,
    pub min_lift: f64,
    pub max_itemset_len: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub users: usize,
    pub carts: usize,
    pub items_per_cart: usize,
    pub days: u32,
    pub rng_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "cart_analytics.db".to_string(),
            output_dir: ".".to_string(),
            analysis: AnalysisConfig::default(),
            mining: MiningConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            moving_average_days: 7,
            top_rules: 10,
        }
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_support: 0.05,
            min_lift: 1.0,
            max_itemset_len: None,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: 10,
            carts: 100,
            items_per_cart: 5,
            days: 180,
            rng_seed: None,
        }
    }
}

/// Resolve configuration from `Config.toml` (optional), `CART_ANALYTICS__*`
/// environment variables, and finally `DATABASE_URL`.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("CART_ANALYTICS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database_url", env::var("DATABASE_URL").ok())?
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.database_url, "cart_analytics.db");
        assert_eq!(config.output_dir, ".");
        assert_eq!(config.analysis.moving_average_days, 7);
        assert_eq!(config.analysis.top_rules, 10);
        assert!(config.mining.enabled);
        assert_eq!(config.mining.min_support, 0.05);
        assert_eq!(config.mining.min_lift, 1.0);
        assert_eq!(config.seed.items_per_cart, 5);
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(ConfigFile::from_str(
                "output_dir = \"out\"\n[mining]\nmin_support = 0.2\n",
                ::config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.mining.min_support, 0.2);
        assert_eq!(config.mining.min_lift, 1.0);
        assert_eq!(config.database_url, "cart_analytics.db");
    }
}
