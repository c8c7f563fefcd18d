//! Runtime configuration.

use std::path::PathBuf;

use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::{domain::withdrawal::PayoutMethod, error::Result};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// CSV file holding the ledger.
    pub ledger_path: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Payout method used when a withdrawal does not name one.
    pub payout_method: PayoutMethod,
}

impl AppConfig {
    /// Defaults, then `config/default.*` if present, then `CASHBACK__*`
    /// environment variables (e.g. `CASHBACK__LEDGER_PATH`).
    pub fn load() -> Result<Self> {
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("CASHBACK").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("ledger_path", "ledger.csv")?
            .set_default("log_filter", "cashback_ledger=info")?
            .set_default("payout_method", "pix")?)
    }
}
