use std::path::PathBuf;

use crate::error::{TbError, TbResult};
use crate::sim_if;

/// Run configuration. Defaults match the tile's bring-up bench: 10 us clock at ns precision.
#[derive(Debug, Clone, PartialEq)]
pub struct TbConfig {
    pub clock_period: u64,
    pub clock_unit: String,
    /// Simulator precision as a power of ten, e.g. -9 for ns.
    pub precision: i8,
    /// JUnit report destination, `None` disables the report.
    pub results: Option<PathBuf>,
    pub suite: String,
}

impl Default for TbConfig {
    fn default() -> Self {
        TbConfig {
            clock_period: 10,
            clock_unit: "us".to_string(),
            precision: -9,
            results: Some(PathBuf::from("results.xml")),
            suite: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl TbConfig {
    /// Defaults overridden by `TB_CLOCK_PERIOD`, `TB_CLOCK_UNIT`, `TB_PRECISION`,
    /// `TB_RESULTS` (empty disables the report) and `TB_SUITE`.
    pub fn from_env() -> TbResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> TbResult<Self> {
        let mut config = TbConfig::default();
        if let Some(p) = var("TB_CLOCK_PERIOD") {
            config.clock_period = p
                .trim()
                .parse()
                .map_err(|_| TbError::Config(format!("TB_CLOCK_PERIOD '{}' is not an integer", p)))?;
        }
        if let Some(u) = var("TB_CLOCK_UNIT") {
            config.clock_unit = u.trim().to_string();
        }
        if let Some(p) = var("TB_PRECISION") {
            config.precision = p
                .trim()
                .parse()
                .map_err(|_| TbError::Config(format!("TB_PRECISION '{}' is not an integer", p)))?;
        }
        if let Some(r) = var("TB_RESULTS") {
            config.results = match r.trim() {
                "" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(s) = var("TB_SUITE") {
            config.suite = s;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TbResult<()> {
        sim_if::time_scale(&self.clock_unit)?;
        if !(-15..=0).contains(&self.precision) {
            return Err(TbError::Config(format!(
                "precision 1e{} outside of fs..sec",
                self.precision
            )));
        }
        if self.clock_period == 0 {
            return Err(TbError::Config("clock period must not be 0".to_string()));
        }
        Ok(())
    }
}
