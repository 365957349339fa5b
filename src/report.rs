//! Discrepancy log and the final audit report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Round could not be reconciled at all.
    Structural,
    /// A recomputed value differs from the recorded one.
    Mismatch,
    /// A static table has no entry for something the round references.
    LookupMiss,
    DuplicateCard,
    ChipDenomination,
    StakeLimit,
    /// Recorded winning positions disagree with the recorded draw.
    Outcome,
}

impl DiscrepancyKind {
    pub const ALL: [DiscrepancyKind; 7] = [
        DiscrepancyKind::Structural,
        DiscrepancyKind::Mismatch,
        DiscrepancyKind::LookupMiss,
        DiscrepancyKind::DuplicateCard,
        DiscrepancyKind::ChipDenomination,
        DiscrepancyKind::StakeLimit,
        DiscrepancyKind::Outcome,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DiscrepancyKind::Structural => "structural",
            DiscrepancyKind::Mismatch => "mismatch",
            DiscrepancyKind::LookupMiss => "lookup-miss",
            DiscrepancyKind::DuplicateCard => "duplicate-card",
            DiscrepancyKind::ChipDenomination => "chip-denomination",
            DiscrepancyKind::StakeLimit => "stake-limit",
            DiscrepancyKind::Outcome => "outcome",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recomputed settlement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ValidBet,
    Payout,
    Rake,
    HandType,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Field::ValidBet => "validBet",
            Field::Payout => "changes",
            Field::Rake => "deduct",
            Field::HandType => "cardType",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub round_id: String,
    pub kind: DiscrepancyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<i64>,
    pub description: String,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] round {}", self.kind, self.round_id)?;
        if let Some(seat) = self.seat {
            write!(f, " seat {seat}")?;
        }
        if let Some(field) = self.field {
            write!(f, " {}", field.label())?;
        }
        if let (Some(c), Some(r)) = (self.computed, self.recorded) {
            write!(f, ": computed {c}, recorded {r}")?;
        }
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

/// Mutable audit state threaded through every reconciler call.
#[derive(Debug, Default)]
pub struct ReconciliationContext {
    discrepancies: Vec<Discrepancy>,
    rounds_processed: usize,
    rounds_failed: usize,
}

impl ReconciliationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, discrepancy: Discrepancy) {
        tracing::debug!(
            round = %discrepancy.round_id,
            kind = %discrepancy.kind,
            seat = ?discrepancy.seat,
            "{}",
            discrepancy.description
        );
        self.discrepancies.push(discrepancy);
    }

    pub fn mark_processed(&mut self) {
        self.rounds_processed += 1;
    }

    pub fn mark_failed(&mut self) {
        self.rounds_failed += 1;
    }

    pub fn rounds_processed(&self) -> usize {
        self.rounds_processed
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    pub fn into_report(self) -> AuditReport {
        AuditReport {
            rounds_processed: self.rounds_processed,
            rounds_failed: self.rounds_failed,
            discrepancies: self.discrepancies,
        }
    }
}

/// Per-round handle for logging discrepancies against one round id.
pub struct RoundAudit<'a> {
    ctx: &'a mut ReconciliationContext,
    round_id: &'a str,
    count: usize,
}

impl<'a> RoundAudit<'a> {
    pub fn new(ctx: &'a mut ReconciliationContext, round_id: &'a str) -> Self {
        Self { ctx, round_id, count: 0 }
    }

    pub fn round_id(&self) -> &str {
        self.round_id
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn note(&mut self, kind: DiscrepancyKind, seat: Option<u8>, description: impl Into<String>) {
        self.count += 1;
        self.ctx.log(Discrepancy {
            round_id: self.round_id.to_owned(),
            kind,
            seat,
            field: None,
            computed: None,
            recorded: None,
            description: description.into(),
        });
    }

    /// Compare one field; logs a mismatch and returns `false` when they differ.
    /// An absent recorded value counts as a mismatch.
    pub fn diff(&mut self, seat: u8, field: Field, computed: i64, recorded: Option<i64>) -> bool {
        if recorded == Some(computed) {
            return true;
        }
        self.count += 1;
        let description = match recorded {
            Some(_) => format!("{} differs", field.label()),
            None => format!("{} not recorded", field.label()),
        };
        self.ctx.log(Discrepancy {
            round_id: self.round_id.to_owned(),
            kind: DiscrepancyKind::Mismatch,
            seat: Some(seat),
            field: Some(field),
            computed: Some(computed),
            recorded,
            description,
        });
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub rounds_processed: usize,
    pub rounds_failed: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Rounds that produced at least one discrepancy.
    pub fn flagged_rounds(&self) -> usize {
        let mut ids: Vec<&str> = self.discrepancies.iter().map(|d| d.round_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<DiscrepancyKind, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.discrepancies {
            *counts.entry(d.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Fraction of processed rounds with no discrepancy.
    pub fn pass_ratio(&self) -> f64 {
        if self.rounds_processed == 0 {
            return 1.0;
        }
        let flagged = self.flagged_rounds().min(self.rounds_processed);
        (self.rounds_processed - flagged) as f64 / self.rounds_processed as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rounds processed: {}, failed: {}, discrepancies: {}",
            self.rounds_processed,
            self.rounds_failed,
            self.discrepancies.len()
        )?;
        for (kind, n) in self.counts_by_kind() {
            writeln!(f, "  {kind}: {n}")?;
        }
        for d in &self.discrepancies {
            writeln!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_logs_only_mismatches() {
        let mut ctx = ReconciliationContext::new();
        {
            let mut round = RoundAudit::new(&mut ctx, "r1");
            assert!(round.diff(1, Field::Payout, 100, Some(100)));
            assert!(!round.diff(1, Field::ValidBet, 200, Some(150)));
            assert!(!round.diff(2, Field::Rake, 5, None));
            assert_eq!(round.count(), 2);
        }
        ctx.mark_processed();
        let report = ctx.into_report();
        assert_eq!(report.discrepancies.len(), 2);
        assert_eq!(report.discrepancies[0].computed, Some(200));
        assert_eq!(report.discrepancies[0].recorded, Some(150));
        assert_eq!(report.discrepancies[1].recorded, None);
        assert!(!report.is_clean());
    }

    #[test]
    fn summary_counts() {
        let mut ctx = ReconciliationContext::new();
        for _ in 0..4 {
            ctx.mark_processed();
        }
        RoundAudit::new(&mut ctx, "a").note(DiscrepancyKind::Structural, None, "bad");
        RoundAudit::new(&mut ctx, "a").note(DiscrepancyKind::StakeLimit, Some(3), "over");
        ctx.mark_failed();
        let report = ctx.into_report();
        assert_eq!(report.flagged_rounds(), 1);
        assert_eq!(report.pass_ratio(), 0.75);
        assert_eq!(report.counts_by_kind()[&DiscrepancyKind::StakeLimit], 1);
        let text = report.to_string();
        assert!(text.contains("rounds processed: 4, failed: 1, discrepancies: 2"));
        assert!(text.contains("[stake-limit] round a seat 3 (over)"));
    }

    #[test]
    fn json_omits_empty_fields() {
        let d = Discrepancy {
            round_id: "x".into(),
            kind: DiscrepancyKind::Outcome,
            seat: None,
            field: None,
            computed: None,
            recorded: None,
            description: "d".into(),
        };
        let text = serde_json::to_string(&d).unwrap();
        assert_eq!(text, r#"{"round_id":"x","kind":"outcome","description":"d"}"#);
    }
}
