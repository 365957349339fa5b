use super::wagers::{SeatContext, SeatStakes, WagerRules};
use super::{fits, RoundError, SeatSettlement};
use crate::outcome::CarDriftOutcome;
use crate::profile::PositionId;
use crate::record::RoundRecord;
use crate::report::{DiscrepancyKind, RoundAudit};

/// Car drift: one or more cars win (the LUCK slot can light several); net
/// winnings are raked.
pub struct CarDrift;

impl WagerRules for CarDrift {
    type Outcome = Vec<PositionId>;

    fn decode(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Vec<PositionId>, RoundError> {
        let code = round.big_data().pub1.as_deref().unwrap_or_default();
        let outcome = CarDriftOutcome::decode(code)?;
        if usize::from(outcome.declared) != outcome.groups.len() {
            audit.note(
                DiscrepancyKind::Outcome,
                None,
                format!("{code} declares {} winners but lists {}", outcome.declared, outcome.groups.len()),
            );
        }
        Ok(outcome.positions())
    }

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        winning: &Vec<PositionId>,
    ) -> Result<SeatSettlement, RoundError> {
        let total = stakes.total();
        let net = fits(ctx.winnings(stakes, winning)?.checked_sub(total), "payout")?;
        let (payout, deduct) = ctx.profile.rake.settle(net);
        Ok(SeatSettlement::wager(total, payout, deduct))
    }
}
