use dorsal_pricing::DiscountPolicy;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Which of the coupon-discount interpretations this deployment runs.
    /// The settings table can override it at runtime; see
    /// `DbClient::fetch_discount_policy`.
    #[serde(default)]
    pub discount_policy: DiscountPolicy,
    /// Slots left at which the back office gets a capacity warning
    #[serde(default = "default_capacity_warning")]
    pub capacity_warning_slots: i32,
}

fn default_capacity_warning() -> i32 {
    25
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Then the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Then a local file that shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Finally the environment, e.g. DORSAL__DATABASE__URL
            .add_source(config::Environment::with_prefix("DORSAL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
