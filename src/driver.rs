//! Batch driver: walks a log export round by round and collects every
//! discrepancy into one report.

use crate::config::AuditConfig;
use crate::profile::{Catalog, GameTitle};
use crate::reconcile::{reconcile_round, reconciler_for, Reconciler};
use crate::record::{round_id_hint, RoundRecord};
use crate::report::{AuditReport, DiscrepancyKind, ReconciliationContext, RoundAudit};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug_span, info, warn};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DriverError {
    #[error("catalog has no {0} profile")]
    MissingProfile(GameTitle),
    #[error("input is not a JSON array of rounds")]
    NotABatch,
    #[error("input json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which title's rules apply to each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameSelection {
    /// Pick by the round's ServerID, then GameID, falling back to bull-bull.
    #[default]
    Auto,
    Fixed(GameTitle),
}

impl fmt::Display for GameSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSelection::Auto => f.write_str("auto"),
            GameSelection::Fixed(t) => write!(f, "{t}"),
        }
    }
}

impl FromStr for GameSelection {
    type Err = crate::profile::ProfileError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(GameSelection::Auto)
        } else {
            s.parse().map(GameSelection::Fixed)
        }
    }
}

/// Split an export into per-round values. A single object is one round.
pub fn parse_batch(text: &str) -> Result<Vec<Value>, DriverError> {
    match serde_json::from_str(text)? {
        Value::Array(rounds) => Ok(rounds),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(DriverError::NotABatch),
    }
}

pub struct BatchDriver<'a> {
    catalog: &'a Catalog,
    reconcilers: BTreeMap<GameTitle, Box<dyn Reconciler + 'a>>,
    selection: GameSelection,
    progress_every: usize,
}

impl<'a> BatchDriver<'a> {
    pub fn new(catalog: &'a Catalog, selection: GameSelection, config: &AuditConfig) -> Result<Self, DriverError> {
        let required = match selection {
            GameSelection::Auto => GameTitle::BullBull,
            GameSelection::Fixed(title) => title,
        };
        if catalog.profile(required).is_none() {
            return Err(DriverError::MissingProfile(required));
        }
        let reconcilers = catalog
            .profiles
            .iter()
            .map(|p| (p.title, reconciler_for(p, config.bull_options())))
            .collect();
        Ok(Self { catalog, reconcilers, selection, progress_every: config.progress_every })
    }

    fn select(&self, round: &RoundRecord) -> GameTitle {
        match self.selection {
            GameSelection::Fixed(title) => title,
            GameSelection::Auto => {
                let room = round.room();
                room.server_id
                    .and_then(|id| self.catalog.profile_for_server(id))
                    .or_else(|| room.game_id.and_then(|id| self.catalog.profile_for_game_id(id)))
                    .map_or(GameTitle::BullBull, |p| p.title)
            }
        }
    }

    pub fn run(&self, records: &[Value]) -> AuditReport {
        let mut ctx = ReconciliationContext::new();
        self.run_into(records, &mut ctx);
        ctx.into_report()
    }

    /// Audit `records`, appending to an existing context.
    pub fn run_into(&self, records: &[Value], ctx: &mut ReconciliationContext) {
        info!(rounds = records.len(), selection = %self.selection, "audit started");
        for (index, value) in records.iter().enumerate() {
            self.audit_one(index, value, ctx);
            let done = index + 1;
            if self.progress_every > 0 && done % self.progress_every == 0 {
                info!(done, total = records.len(), discrepancies = ctx.discrepancies().len(), "progress");
            }
        }
        info!(
            rounds = ctx.rounds_processed(),
            discrepancies = ctx.discrepancies().len(),
            "audit finished"
        );
    }

    fn audit_one(&self, index: usize, value: &Value, ctx: &mut ReconciliationContext) {
        let round = match RoundRecord::from_value(value) {
            Ok(round) => round,
            Err(err) => {
                let id = round_id_hint(value, index);
                warn!(round = %id, "unparseable record: {err}");
                RoundAudit::new(ctx, &id).note(
                    DiscrepancyKind::Structural,
                    None,
                    format!("unparseable record: {err}"),
                );
                ctx.mark_failed();
                ctx.mark_processed();
                return;
            }
        };
        let title = self.select(&round);
        let span = debug_span!("round", round = %round.game_no, game = %title);
        let _guard = span.enter();
        // every selectable title has a reconciler: Fixed was checked in new(),
        // Auto only yields titles found in the catalog or bull-bull
        if let Some(reconciler) = self.reconcilers.get(&title) {
            reconcile_round(reconciler.as_ref(), &round, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_batch_shapes() {
        assert_eq!(parse_batch("[1, 2]").unwrap().len(), 2);
        assert_eq!(parse_batch(r#"{"gameNo": 1}"#).unwrap().len(), 1);
        assert!(matches!(parse_batch("3"), Err(DriverError::NotABatch)));
        assert!(matches!(parse_batch("[1,"), Err(DriverError::Json(_))));
    }

    #[test]
    fn selection_parsing() {
        assert_eq!("auto".parse::<GameSelection>().unwrap(), GameSelection::Auto);
        assert_eq!("shark".parse::<GameSelection>().unwrap(), GameSelection::Fixed(GameTitle::Shark));
        assert!("mahjong".parse::<GameSelection>().is_err());
    }

    #[test]
    fn auto_selection_by_server_then_game_id() {
        let catalog = Catalog::builtin();
        let driver = BatchDriver::new(&catalog, GameSelection::Auto, &AuditConfig::default()).unwrap();
        let round = |room: Value| -> RoundRecord {
            serde_json::from_value(json!({"gameNo": "x", "log": {"data": {"roomData": room}}})).unwrap()
        };
        assert_eq!(driver.select(&round(json!({"ServerID": 86302}))), GameTitle::Shark);
        assert_eq!(driver.select(&round(json!({"GameID": 830}))), GameTitle::BullBull);
        assert_eq!(driver.select(&round(json!({"ServerID": 1}))), GameTitle::BullBull);
    }

    #[test]
    fn missing_profile_is_rejected() {
        let catalog = Catalog { profiles: vec![] };
        assert!(matches!(
            BatchDriver::new(&catalog, GameSelection::Fixed(GameTitle::SicBo), &AuditConfig::default()),
            Err(DriverError::MissingProfile(GameTitle::SicBo))
        ));
    }

    #[test]
    fn unparseable_rounds_do_not_stop_the_batch() {
        let catalog = Catalog::builtin();
        let driver = BatchDriver::new(&catalog, GameSelection::Auto, &AuditConfig::default()).unwrap();
        let report = driver.run(&[json!({"gameNo": 5}), json!("junk")]);
        assert_eq!(report.rounds_processed, 2);
        assert_eq!(report.rounds_failed, 2);
        assert_eq!(report.discrepancies[0].round_id, "5");
        assert_eq!(report.discrepancies[1].round_id, "#1");
        assert!(report.discrepancies.iter().all(|d| d.kind == DiscrepancyKind::Structural));
    }
}
