//! Run configuration, loaded from an optional JSON file.

use crate::payout::RakeRule;
use crate::profile::{Catalog, ProfileError};
use crate::proration::Seat;
use crate::reconcile::bull::BullOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog: {0}")]
    Catalog(#[from] ProfileError),
    #[error("bull-bull seat count must be at least 2, got {0}")]
    SeatCount(Seat),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Replacement for the built-in tables.
    pub catalog: Option<PathBuf>,
    /// Log progress every this many rounds; 0 disables it.
    pub progress_every: usize,
    pub bull_seat_count: Seat,
    /// Bull-bull rake in basis points; `None` keeps the catalog's.
    pub bull_rake_bps: Option<i64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { catalog: None, progress_every: 1000, bull_seat_count: 5, bull_rake_bps: None }
    }
}

impl AuditConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AuditConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bull_seat_count < 2 {
            return Err(ConfigError::SeatCount(self.bull_seat_count));
        }
        Ok(())
    }

    pub fn bull_options(&self) -> BullOptions {
        BullOptions {
            seat_count: self.bull_seat_count,
            rake: self.bull_rake_bps.map(|rate_bps| RakeRule { applies: rate_bps > 0, rate_bps }),
        }
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog {
            None => Ok(Catalog::builtin()),
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
                Ok(Catalog::from_json(&text)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let c = AuditConfig::from_json(r#"{"progress_every": 50}"#).unwrap();
        assert_eq!(c.progress_every, 50);
        assert_eq!(c.bull_seat_count, 5);
        assert_eq!(c.bull_options(), BullOptions::default());
    }

    #[test]
    fn rake_override() {
        let c = AuditConfig::from_json(r#"{"bull_rake_bps": 300}"#).unwrap();
        assert_eq!(c.bull_options().rake, Some(RakeRule { applies: true, rate_bps: 300 }));
        let c = AuditConfig::from_json(r#"{"bull_rake_bps": 0}"#).unwrap();
        assert_eq!(c.bull_options().rake, Some(RakeRule { applies: false, rate_bps: 0 }));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AuditConfig::from_json(r#"{"bull_seat_count": 1}"#),
            Err(ConfigError::SeatCount(1))
        ));
        assert!(matches!(AuditConfig::from_json(r#"{"seats": 5}"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        let c = AuditConfig { catalog: Some("/nonexistent/catalog.json".into()), ..AuditConfig::default() };
        assert!(matches!(c.catalog(), Err(ConfigError::Io { .. })));
    }
}
