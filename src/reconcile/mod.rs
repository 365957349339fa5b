// Reconciler boundary. Each title recomputes what every seat should have
// been settled and the shared diff stage compares that against the log, so
// the batch driver can audit any title without knowing its rules.

pub mod bull;
pub mod car_drift;
pub mod dragon_tiger;
pub mod shark;
pub mod sic_bo;
pub mod suits;
pub mod wagers;

use crate::evaluator::HandType;
use crate::hand::HandError;
use crate::outcome::OutcomeError;
use crate::profile::{GameProfile, GameTitle};
use crate::proration::{ProrationError, Seat};
use crate::record::RoundRecord;
use crate::report::{DiscrepancyKind, Field, ReconciliationContext, RoundAudit};
use std::collections::BTreeMap;

/// Why a round could not be reconciled at all.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("seat {seat} missing {field}")]
    MissingSeatField { seat: Seat, field: &'static str },
    #[error("no seat records")]
    NoSeats,
    #[error("banker seat {0} has no record")]
    MissingBanker(Seat),
    #[error("cannot identify banker, candidates {0:?}")]
    AmbiguousBanker(Vec<Seat>),
    #[error("seat {seat} hand: {source}")]
    Hand {
        seat: Seat,
        #[source]
        source: HandError,
    },
    #[error("seat {0} ties the banker")]
    Tie(Seat),
    #[error("outcome code: {0}")]
    Outcome(#[from] OutcomeError),
    #[error("proration: {0}")]
    Proration(#[from] ProrationError),
    #[error("{0} overflows a chip amount")]
    Overflow(&'static str),
}

/// Checked chip arithmetic result; `None` means the logged amounts are too
/// large to settle.
pub(crate) fn fits(value: Option<i64>, what: &'static str) -> Result<i64, RoundError> {
    value.ok_or(RoundError::Overflow(what))
}

pub(crate) fn sum_fits(values: impl IntoIterator<Item = i64>, what: &'static str) -> Result<i64, RoundError> {
    fits(values.into_iter().try_fold(0i64, i64::checked_add), what)
}

/// What one seat should have been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSettlement {
    pub valid_bet: i64,
    pub payout: i64,
    pub deduct: i64,
    /// Only bull-bull records a hand type per seat.
    pub hand_type: Option<HandType>,
}

impl SeatSettlement {
    pub const fn wager(valid_bet: i64, payout: i64, deduct: i64) -> Self {
        Self { valid_bet, payout, deduct, hand_type: None }
    }
}

pub type Settlements = BTreeMap<Seat, SeatSettlement>;

pub trait Reconciler {
    fn title(&self) -> GameTitle;

    /// Recompute every seat's settlement. Non-fatal findings (duplicate
    /// cards, chip or limit violations, lookup misses) are noted on `audit`;
    /// anything that makes the round unreconcilable is returned as an error.
    fn settle(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Settlements, RoundError>;
}

/// Build the reconciler for a title from its profile.
pub fn reconciler_for<'a>(profile: &'a GameProfile, bull: bull::BullOptions) -> Box<dyn Reconciler + 'a> {
    use wagers::WagerReconciler;
    match profile.title {
        GameTitle::BullBull => Box::new(bull::BullReconciler::new(profile, bull)),
        GameTitle::SicBo => Box::new(WagerReconciler::new(profile, sic_bo::SicBo)),
        GameTitle::FourSuits => Box::new(WagerReconciler::new(profile, suits::FourSuits)),
        GameTitle::Shark => Box::new(WagerReconciler::new(profile, shark::Shark)),
        GameTitle::CarDrift => Box::new(WagerReconciler::new(profile, car_drift::CarDrift)),
        GameTitle::DragonTiger => Box::new(WagerReconciler::new(profile, dragon_tiger::DragonTiger)),
    }
}

/// Reconcile one parsed round: settle, then diff every seat. Returns the
/// number of discrepancies the round produced.
pub fn reconcile_round(
    reconciler: &dyn Reconciler,
    round: &RoundRecord,
    ctx: &mut ReconciliationContext,
) -> usize {
    let mut audit = RoundAudit::new(ctx, &round.game_no);
    let failed = match reconciler.settle(round, &mut audit) {
        Ok(settlements) => {
            diff_settlements(round, &settlements, &mut audit);
            false
        }
        Err(err) => {
            tracing::warn!(round = %round.game_no, game = %reconciler.title(), "unreconcilable: {err}");
            audit.note(DiscrepancyKind::Structural, None, err.to_string());
            true
        }
    };
    let count = audit.count();
    if failed {
        ctx.mark_failed();
    }
    ctx.mark_processed();
    count
}

/// Compare recomputed settlements against the recorded seat fields.
/// Every field is checked even after a mismatch.
pub fn diff_settlements(round: &RoundRecord, settlements: &Settlements, audit: &mut RoundAudit<'_>) {
    for (&seat, computed) in settlements {
        let Some(recorded) = round.seat(seat) else {
            audit.note(DiscrepancyKind::Structural, Some(seat), "settled seat has no record");
            continue;
        };
        audit.diff(seat, Field::ValidBet, computed.valid_bet, recorded.valid_bet);
        audit.diff(seat, Field::Payout, computed.payout, recorded.changes);
        if recorded.deduct.is_some() {
            audit.diff(seat, Field::Rake, computed.deduct, recorded.deduct);
        }
        if let Some(hand_type) = computed.hand_type {
            audit.diff(
                seat,
                Field::HandType,
                i64::from(hand_type.rank()),
                recorded.card_type.map(i64::from),
            );
        }
    }
}
